use std::sync::Arc;

use crate::{
    db::PreferenceStore,
    error::AppResult,
    models::Preferences,
    services::{
        providers::{MetadataProvider, RecommendationProvider},
        DetailResolver, FeedComposer, FeedSessionHandle, FeedView,
    },
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub metadata: Arc<dyn MetadataProvider>,
    pub recommender: Arc<dyn RecommendationProvider>,
    pub composer: Arc<FeedComposer>,
    pub resolver: Arc<DetailResolver>,
    pub preferences: Arc<PreferenceStore>,
    pub session: FeedSessionHandle,
}

impl AppState {
    /// Wires the services around the two upstream providers
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        recommender: Arc<dyn RecommendationProvider>,
        preferences: PreferenceStore,
    ) -> Self {
        Self {
            composer: Arc::new(FeedComposer::new(metadata.clone(), recommender.clone())),
            resolver: Arc::new(DetailResolver::new(metadata.clone(), recommender.clone())),
            metadata,
            recommender,
            preferences: Arc::new(preferences),
            session: FeedSessionHandle::new(),
        }
    }

    /// Preferences became available (loaded at startup or just saved):
    /// start the feed over from page 1
    pub async fn on_preferences_available(&self, prefs: &Preferences) -> AppResult<FeedView> {
        let mut fetch = self.session.wait_fetch().await;
        fetch.reset();
        fetch.refresh(&self.composer, prefs, None).await
    }

    /// Preferences were reset: forget the feed
    pub async fn on_preferences_cleared(&self) {
        self.session.wait_fetch().await.reset();
    }
}
