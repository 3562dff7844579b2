use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{CorpusEntry, Genre, Industry, MovieEntry, MovieId, Preferences, INDUSTRIES},
    services::{FeedView, OpenedMovie},
};

use super::AppState;

/// Recommender default for legacy corpus lookups
const DEFAULT_CORPUS_K: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TitleHint {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CorpusQuery {
    pub k: Option<usize>,
}

async fn require_preferences(state: &AppState) -> AppResult<Preferences> {
    state
        .preferences
        .current()
        .await
        .ok_or_else(|| AppError::NotFound("No preferences saved; complete onboarding first".to_string()))
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

pub async fn list_industries() -> Json<&'static [Industry]> {
    Json(INDUSTRIES)
}

pub async fn list_genres(State(state): State<AppState>) -> AppResult<Json<Vec<Genre>>> {
    Ok(Json(state.metadata.genres().await?))
}

/// Free-text title search, used when picking seed movies
pub async fn search_titles(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<MovieEntry>>> {
    Ok(Json(state.metadata.search_by_text(&params.q).await?))
}

pub async fn trending(State(state): State<AppState>) -> AppResult<Json<Vec<MovieEntry>>> {
    Ok(Json(state.metadata.get_trending().await?))
}

pub async fn get_preferences(State(state): State<AppState>) -> AppResult<Json<Preferences>> {
    Ok(Json(require_preferences(&state).await?))
}

/// Onboarding finished: persist the preferences and build the first page
pub async fn save_preferences(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(prefs): Json<Preferences>,
) -> AppResult<(StatusCode, Json<FeedView>)> {
    let prefs = prefs.normalized();
    if let Some(code) = prefs.unknown_industry() {
        return Err(AppError::InvalidInput(format!("Unknown industry code: {}", code)));
    }
    state.preferences.save(&prefs).await?;

    tracing::info!(
        request_id = %request_id,
        seeds = prefs.seed_movies.len(),
        "Onboarding completed"
    );

    let view = match state.on_preferences_available(&prefs).await {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(request_id = %request_id, error = %e, "Initial feed fetch failed");
            state.session.view()
        }
    };

    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn clear_preferences(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.preferences.clear().await?;
    state.on_preferences_cleared().await;
    Ok(StatusCode::NO_CONTENT)
}

/// Last published view; never waits on a fetch in flight
pub async fn get_feed(State(state): State<AppState>) -> Json<FeedView> {
    Json(state.session.view())
}

/// Rebuilds the feed from page 1, optionally as a search
pub async fn refresh_feed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    payload: Option<Json<RefreshRequest>>,
) -> AppResult<Json<FeedView>> {
    let request = payload.map(|Json(r)| r).unwrap_or_default();
    let prefs = require_preferences(&state).await?;
    let mut fetch = state.session.begin_fetch()?;

    tracing::info!(
        request_id = %request_id,
        search = ?request.search,
        "Refreshing feed"
    );

    let view = fetch
        .refresh(&state.composer, &prefs, request.search)
        .await?;
    Ok(Json(view))
}

pub async fn load_more(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
) -> AppResult<Json<FeedView>> {
    let prefs = require_preferences(&state).await?;
    let mut fetch = state.session.begin_fetch()?;

    tracing::info!(request_id = %request_id, "Loading more feed entries");

    let view = fetch.load_more(&state.composer, &prefs).await?;
    Ok(Json(view))
}

/// Partial entry for a movie: the one in the feed, else one built from the
/// caller's title hint
fn partial_entry(
    state: &AppState,
    movie_id: MovieId,
    title: Option<String>,
) -> Option<MovieEntry> {
    if let Some(movie) = state.session.find(movie_id) {
        return Some(movie);
    }
    title
        .filter(|t| !t.trim().is_empty())
        .map(|t| MovieEntry::new(movie_id, t))
}

pub async fn open_movie(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
    Query(hint): Query<TitleHint>,
) -> AppResult<Json<OpenedMovie>> {
    let movie = match partial_entry(&state, movie_id, hint.title) {
        Some(movie) => movie,
        None => {
            let details = state
                .metadata
                .get_details(movie_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", movie_id)))?;
            details.movie
        }
    };

    Ok(Json(state.resolver.open_details(&movie).await))
}

pub async fn similar_movies(
    State(state): State<AppState>,
    Path(movie_id): Path<MovieId>,
    Query(hint): Query<TitleHint>,
) -> AppResult<Json<Vec<MovieEntry>>> {
    let movie = partial_entry(&state, movie_id, hint.title)
        .ok_or_else(|| {
            AppError::InvalidInput("A title is required for movies outside the feed".to_string())
        })?;

    Ok(Json(state.resolver.similar(&movie.title).await))
}

/// Legacy recommender lookup by corpus row
pub async fn corpus_similar(
    State(state): State<AppState>,
    Path(corpus_id): Path<i64>,
    Query(params): Query<CorpusQuery>,
) -> AppResult<Json<Vec<CorpusEntry>>> {
    let k = params.k.unwrap_or(DEFAULT_CORPUS_K);
    let movies = state.recommender.recommend_by_corpus_id(corpus_id, k).await?;
    Ok(Json(movies.into_iter().map(CorpusEntry::from).collect()))
}
