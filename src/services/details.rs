use std::sync::Arc;

use serde::Serialize;

use crate::{
    models::{MovieDetails, MovieEntry},
    services::{
        hydration::hydrate_titles,
        providers::{MetadataProvider, RecommendationProvider},
    },
};

/// Similar titles requested for an opened movie
pub const SIMILAR_K: usize = 6;

/// What the detail view shows for an opened movie
#[derive(Debug, Clone, Serialize)]
pub struct OpenedMovie {
    pub details: MovieDetails,
    pub similar: Vec<MovieEntry>,
}

/// Resolves the detail view and its "similar movies" strip
pub struct DetailResolver {
    metadata: Arc<dyn MetadataProvider>,
    recommender: Arc<dyn RecommendationProvider>,
}

impl DetailResolver {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        recommender: Arc<dyn RecommendationProvider>,
    ) -> Self {
        Self {
            metadata,
            recommender,
        }
    }

    /// Fetches full details and similar movies concurrently.
    ///
    /// Neither half can fail: details fall back to the partial entry, similar
    /// movies fall back to an empty list.
    pub async fn open_details(&self, movie: &MovieEntry) -> OpenedMovie {
        let (details, similar) = tokio::join!(self.details(movie), self.similar(&movie.title));
        OpenedMovie { details, similar }
    }

    /// Full details, or the partial entry already in hand if the provider
    /// does not know the movie or cannot be reached
    pub async fn details(&self, movie: &MovieEntry) -> MovieDetails {
        match self.metadata.get_details(movie.id).await {
            Ok(Some(mut details)) => {
                // Keep the feed tag so the view can still say why it was shown
                details.movie.match_type = movie.match_type.clone();
                details.movie.is_ai_pick = movie.is_ai_pick;
                details
            }
            Ok(None) => {
                tracing::debug!(movie_id = movie.id, "No details found, using partial entry");
                MovieDetails::from(movie.clone())
            }
            Err(e) => {
                tracing::warn!(
                    movie_id = movie.id,
                    provider = self.metadata.name(),
                    error = %e,
                    "Details fetch failed, using partial entry"
                );
                MovieDetails::from(movie.clone())
            }
        }
    }

    /// Recommender titles similar to `title`, hydrated in order
    pub async fn similar(&self, title: &str) -> Vec<MovieEntry> {
        match self.recommender.recommend_by_title(title, SIMILAR_K).await {
            Ok(titles) => hydrate_titles(self.metadata.as_ref(), &titles).await,
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    provider = self.recommender.name(),
                    error = %e,
                    "Similar lookup failed"
                );
                Vec::new()
            }
        }
    }
}
