use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, Mutex, MutexGuard};

use crate::{
    error::{AppError, AppResult},
    models::{MovieEntry, MovieId, Preferences},
    services::feed::FeedComposer,
};

/// Snapshot of the feed as the presentation layer renders it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedView {
    pub movies: Vec<MovieEntry>,
    pub next_page: u32,
    pub has_more: bool,
    pub has_fetched: bool,
    pub search: Option<String>,
}

/// The list the user is scrolling through, accumulated across pages
#[derive(Debug, Clone)]
pub struct FeedSession {
    movies: Vec<MovieEntry>,
    next_page: u32,
    has_more: bool,
    has_fetched: bool,
    search: Option<String>,
}

impl Default for FeedSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedSession {
    pub fn new() -> Self {
        Self {
            movies: Vec::new(),
            next_page: 1,
            has_more: true,
            has_fetched: false,
            search: None,
        }
    }

    pub fn view(&self) -> FeedView {
        FeedView {
            movies: self.movies.clone(),
            next_page: self.next_page,
            has_more: self.has_more,
            has_fetched: self.has_fetched,
            search: self.search.clone(),
        }
    }

    /// Replaces the list with page 1 (or search results for `search`).
    ///
    /// On failure the previous list and search mode stay as they were.
    pub async fn refresh(
        &mut self,
        composer: &FeedComposer,
        prefs: &Preferences,
        search: Option<String>,
    ) -> AppResult<FeedView> {
        let search = search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let result = composer.compose_feed(prefs, 1, search.as_deref()).await;
        self.has_fetched = true;
        let page = result?;

        self.search = search;
        self.movies = page.movies;
        self.next_page = 2;
        self.has_more = page.has_more;

        Ok(self.view())
    }

    /// Appends the next page, skipping ids already in the list
    pub async fn load_more(
        &mut self,
        composer: &FeedComposer,
        prefs: &Preferences,
    ) -> AppResult<FeedView> {
        if !self.has_more {
            return Ok(self.view());
        }

        let result = composer
            .compose_feed(prefs, self.next_page, self.search.as_deref())
            .await;
        self.has_fetched = true;
        let page = result?;

        let mut seen: HashSet<MovieId> = self.movies.iter().map(|m| m.id).collect();
        let before = self.movies.len();
        self.movies
            .extend(page.movies.into_iter().filter(|m| seen.insert(m.id)));

        tracing::debug!(
            page = self.next_page,
            appended = self.movies.len() - before,
            total = self.movies.len(),
            "Feed extended"
        );

        self.next_page += 1;
        self.has_more = page.has_more;

        Ok(self.view())
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

/// Shared session guarded so that only one fetch runs at a time.
///
/// Readers never touch the fetch lock: every change made through a
/// [`FeedFetch`] is published as a [`FeedView`] snapshot.
#[derive(Clone)]
pub struct FeedSessionHandle {
    inner: Arc<Mutex<FeedSession>>,
    published: Arc<watch::Sender<FeedView>>,
}

impl Default for FeedSessionHandle {
    fn default() -> Self {
        let session = FeedSession::new();
        let (published, _) = watch::channel(session.view());
        Self {
            inner: Arc::new(Mutex::new(session)),
            published: Arc::new(published),
        }
    }
}

impl FeedSessionHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the session for a fetch; a fetch already in flight wins and
    /// this trigger is rejected instead of queued
    pub fn begin_fetch(&self) -> AppResult<FeedFetch<'_>> {
        let session = self
            .inner
            .try_lock()
            .map_err(|_| AppError::Busy("A feed fetch is already in flight".to_string()))?;
        Ok(self.fetch_with(session))
    }

    /// Waits for the session; used by actions that must not be dropped
    pub async fn wait_fetch(&self) -> FeedFetch<'_> {
        let session = self.inner.lock().await;
        self.fetch_with(session)
    }

    fn fetch_with<'a>(&'a self, session: MutexGuard<'a, FeedSession>) -> FeedFetch<'a> {
        FeedFetch {
            session,
            published: &self.published,
        }
    }

    /// Last published feed, available while a fetch is running
    pub fn view(&self) -> FeedView {
        self.published.borrow().clone()
    }

    /// Entry currently shown with this id, if any
    pub fn find(&self, movie_id: MovieId) -> Option<MovieEntry> {
        self.published
            .borrow()
            .movies
            .iter()
            .find(|m| m.id == movie_id)
            .cloned()
    }
}

/// Exclusive claim on the session for one fetch
pub struct FeedFetch<'a> {
    session: MutexGuard<'a, FeedSession>,
    published: &'a watch::Sender<FeedView>,
}

impl FeedFetch<'_> {
    pub async fn refresh(
        &mut self,
        composer: &FeedComposer,
        prefs: &Preferences,
        search: Option<String>,
    ) -> AppResult<FeedView> {
        let result = self.session.refresh(composer, prefs, search).await;
        self.publish();
        result
    }

    pub async fn load_more(
        &mut self,
        composer: &FeedComposer,
        prefs: &Preferences,
    ) -> AppResult<FeedView> {
        let result = self.session.load_more(composer, prefs).await;
        self.publish();
        result
    }

    pub fn reset(&mut self) {
        self.session.reset();
        self.publish();
    }

    fn publish(&self) {
        self.published.send_replace(self.session.view());
    }
}
