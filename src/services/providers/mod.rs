/// External data providers
///
/// This module provides the seams between feed composition and the two upstream
/// services: a movie metadata provider (TMDB) and the plot/title recommender.
/// Composition code only sees these traits, so either side can be swapped or
/// stubbed without touching the merge logic.
use crate::{
    error::{AppError, AppResult},
    models::{
        CastMember, CorpusMovie, Genre, GenreId, MovieDetails, MovieEntry, MovieId, PlotQuery,
    },
};

pub mod recommender;
pub mod tmdb;

pub use recommender::RecommenderClient;
pub use tmdb::TmdbProvider;

/// Trait for movie metadata providers
///
/// Every operation returns entries already normalized to [`MovieEntry`], with
/// defaults substituted for whatever optional fields the provider left out.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait MetadataProvider: Send + Sync {
    /// Free-text title search; the first result is treated as the best match
    async fn search_by_text(&self, query: &str) -> AppResult<Vec<MovieEntry>>;

    /// Popular movies in the given genres, restricted to the given
    /// original languages when the filter is non-empty
    async fn discover_by_genres(
        &self,
        genre_ids: &[GenreId],
        page: u32,
        industries: &[String],
    ) -> AppResult<Vec<MovieEntry>>;

    /// Popular movies featuring a person. No paging, no language filter.
    async fn discover_by_cast(&self, person_id: u64) -> AppResult<Vec<MovieEntry>>;

    /// Cast of a movie in billing order
    async fn movie_credits(&self, movie_id: MovieId) -> AppResult<Vec<CastMember>>;

    /// Full detail with top cast and genre names.
    ///
    /// `Ok(None)` means the provider does not know the movie.
    async fn get_details(&self, movie_id: MovieId) -> AppResult<Option<MovieDetails>>;

    async fn get_trending(&self) -> AppResult<Vec<MovieEntry>>;

    /// Provider genre catalog
    async fn genres(&self) -> AppResult<Vec<Genre>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for the similarity recommender
///
/// Both lookups return bare titles from the recommender's own corpus; callers
/// hydrate them through a [`MetadataProvider`].
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RecommendationProvider: Send + Sync {
    /// Titles similar to a title the recommender knows. A title missing from
    /// its corpus comes back as [`AppError::NotFound`].
    async fn recommend_by_title(&self, title: &str, k: usize) -> AppResult<Vec<String>>;

    /// Titles similar to an arbitrary plot, embedded on the fly
    async fn recommend_by_plot(&self, query: PlotQuery) -> AppResult<Vec<String>>;

    /// Corpus records similar to a corpus row
    async fn recommend_by_corpus_id(&self, corpus_id: i64, k: usize)
        -> AppResult<Vec<CorpusMovie>>;

    fn name(&self) -> &'static str;
}

/// Turns a non-2xx upstream response into an error carrying status and body
pub(crate) async fn ensure_success(
    response: reqwest::Response,
    provider: &str,
) -> AppResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    tracing::error!(
        provider = %provider,
        status = %status,
        body = %body,
        "External API request failed"
    );

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(AppError::NotFound(format!("{} returned 404: {}", provider, body)));
    }

    Err(AppError::ExternalApi(format!(
        "{} returned status {}: {}",
        provider, status, body
    )))
}
