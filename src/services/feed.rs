use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{FeedPage, GenreId, MatchType, MovieEntry, MovieId, PlotQuery, Preferences},
    services::{
        hydration::hydrate_titles,
        providers::{MetadataProvider, RecommendationProvider},
    },
};

/// Candidate titles requested from the recommender per seed
pub const PLOT_MATCH_K: usize = 10;

/// Year sent to the plot embedder when a seed has no usable year
pub const DEFAULT_PLOT_YEAR: i32 = 2024;

/// Builds the personalised feed from three sources, in priority order:
///
/// 1. plot matches from the recommender (one lookup per seed movie)
/// 2. genre matches from metadata discovery
/// 3. actor matches sharing the lead of the first seed movie
pub struct FeedComposer {
    metadata: Arc<dyn MetadataProvider>,
    recommender: Arc<dyn RecommendationProvider>,
}

impl FeedComposer {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        recommender: Arc<dyn RecommendationProvider>,
    ) -> Self {
        Self {
            metadata,
            recommender,
        }
    }

    /// Composes one page of the feed.
    ///
    /// A non-empty search term bypasses preferences entirely and never pages.
    /// Page 1 merges all three sources; later pages only continue genre
    /// discovery and are not deduplicated against earlier pages.
    pub async fn compose_feed(
        &self,
        prefs: &Preferences,
        page: u32,
        search_term: Option<&str>,
    ) -> AppResult<FeedPage> {
        if page == 0 {
            return Err(AppError::InvalidInput("Page must be at least 1".to_string()));
        }

        if let Some(term) = search_term.map(str::trim).filter(|t| !t.is_empty()) {
            let movies = self.metadata.search_by_text(term).await?;
            tracing::info!(query = %term, results = movies.len(), "Search feed composed");
            return Ok(FeedPage {
                movies,
                page,
                has_more: false,
            });
        }

        if page > 1 {
            let movies = self
                .metadata
                .discover_by_genres(&prefs.genres, page, &prefs.industries)
                .await?
                .into_iter()
                .map(|m| m.with_match(MatchType::Genre))
                .collect::<Vec<_>>();

            tracing::info!(page, results = movies.len(), "Genre page composed");
            return Ok(FeedPage {
                movies,
                page,
                has_more: true,
            });
        }

        let plot = self.plot_matches(prefs).await;
        let genre = self.genre_matches(prefs).await;
        let actor = self.actor_matches(prefs).await;

        tracing::info!(
            plot = plot.len(),
            genre = genre.len(),
            actor = actor.len(),
            seeds = prefs.seed_movies.len(),
            "Sourced feed candidates"
        );

        let movies = merge_by_priority(&prefs.seed_ids(), [plot, genre, actor]);

        Ok(FeedPage {
            movies,
            page,
            has_more: true,
        })
    }

    /// Recommender picks for every seed, hydrated, language-filtered and
    /// ordered newest first
    async fn plot_matches(&self, prefs: &Preferences) -> Vec<MovieEntry> {
        if prefs.seed_movies.is_empty() {
            return Vec::new();
        }

        let titles = self.collect_plot_titles(&prefs.seed_movies).await;
        let hydrated = hydrate_titles(self.metadata.as_ref(), &titles).await;

        let mut matches: Vec<MovieEntry> = hydrated
            .into_iter()
            .filter(|m| m.matches_industries(&prefs.industries))
            .map(|m| MovieEntry {
                is_ai_pick: true,
                ..m.with_match(MatchType::Plot)
            })
            .collect();

        sort_by_year_desc(&mut matches);
        matches
    }

    /// Similar titles for each seed, resolved one seed at a time.
    ///
    /// A seed the recommender cannot match by title falls back to a plot
    /// lookup before the next seed starts. Titles repeated across seeds are
    /// kept once, at their first position.
    async fn collect_plot_titles(&self, seeds: &[MovieEntry]) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut titles = Vec::new();
        let mut genre_names: Option<HashMap<GenreId, String>> = None;

        for seed in seeds {
            let similar = match self
                .recommender
                .recommend_by_title(&seed.title, PLOT_MATCH_K)
                .await
            {
                Ok(similar) => similar,
                Err(e) => {
                    tracing::debug!(
                        seed = %seed.title,
                        error = %e,
                        "Title lookup missed, falling back to plot embedding"
                    );

                    let query = self.plot_query(seed, &mut genre_names).await;
                    match self.recommender.recommend_by_plot(query).await {
                        Ok(similar) => similar,
                        Err(e) => {
                            tracing::warn!(
                                seed = %seed.title,
                                provider = self.recommender.name(),
                                error = %e,
                                "Plot lookup failed, seed contributes no plot matches"
                            );
                            continue;
                        }
                    }
                }
            };

            for title in similar {
                if seen.insert(title.clone()) {
                    titles.push(title);
                }
            }
        }

        titles
    }

    /// Builds the embedding request for a seed, translating its genre ids to
    /// the names the recommender was trained on
    async fn plot_query(
        &self,
        seed: &MovieEntry,
        genre_names: &mut Option<HashMap<GenreId, String>>,
    ) -> PlotQuery {
        let year = match seed.year_number() {
            0 => DEFAULT_PLOT_YEAR,
            year => year,
        };

        let mut genres = Vec::new();
        if !seed.genre.is_empty() {
            if genre_names.is_none() {
                *genre_names = Some(self.genre_catalog().await);
            }
            if let Some(names) = genre_names.as_ref() {
                genres = seed
                    .genre
                    .iter()
                    .filter_map(|id| names.get(id).cloned())
                    .collect();
            }
        }

        PlotQuery {
            overview: seed.overview.clone(),
            year,
            genres,
            k: PLOT_MATCH_K,
        }
    }

    async fn genre_catalog(&self) -> HashMap<GenreId, String> {
        match self.metadata.genres().await {
            Ok(genres) => genres.into_iter().map(|g| (g.id, g.name)).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Genre catalog unavailable, sending plot lookups without genres");
                HashMap::new()
            }
        }
    }

    async fn genre_matches(&self, prefs: &Preferences) -> Vec<MovieEntry> {
        match self
            .metadata
            .discover_by_genres(&prefs.genres, 1, &prefs.industries)
            .await
        {
            Ok(movies) => movies
                .into_iter()
                .map(|m| m.with_match(MatchType::Genre))
                .collect(),
            Err(e) => {
                tracing::warn!(
                    provider = self.metadata.name(),
                    error = %e,
                    "Genre discovery failed, feed continues without genre matches"
                );
                Vec::new()
            }
        }
    }

    /// Other popular movies with the lead of the first seed.
    ///
    /// The industry filter is not applied here.
    async fn actor_matches(&self, prefs: &Preferences) -> Vec<MovieEntry> {
        let Some(seed) = prefs.seed_movies.first() else {
            return Vec::new();
        };

        match self.movies_with_lead_of(seed.id).await {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(
                    seed = %seed.title,
                    error = %e,
                    "Actor discovery failed, feed continues without actor matches"
                );
                Vec::new()
            }
        }
    }

    async fn movies_with_lead_of(&self, movie_id: MovieId) -> AppResult<Vec<MovieEntry>> {
        let cast = self.metadata.movie_credits(movie_id).await?;
        let Some(lead) = cast.into_iter().next() else {
            tracing::debug!(movie_id, "Seed has no cast, skipping actor matches");
            return Ok(Vec::new());
        };

        let match_type = MatchType::actor(Some(lead.name.as_str()));
        let movies = self.metadata.discover_by_cast(lead.id).await?;

        Ok(movies
            .into_iter()
            .map(|m| m.with_match(match_type.clone()))
            .collect())
    }
}

/// Orders entries newest first; unparsable years count as 0 and ties keep
/// their input order
pub fn sort_by_year_desc(movies: &mut [MovieEntry]) {
    movies.sort_by_key(|m| Reverse(m.year_number()));
}

/// Concatenates sources in priority order, keeping the first occurrence of
/// each id and dropping the seed movies themselves
pub fn merge_by_priority<I>(seed_ids: &HashSet<MovieId>, sources: I) -> Vec<MovieEntry>
where
    I: IntoIterator<Item = Vec<MovieEntry>>,
{
    let mut seen = HashSet::new();
    let mut combined = Vec::new();

    for source in sources {
        for movie in source {
            if !seed_ids.contains(&movie.id) && seen.insert(movie.id) {
                combined.push(movie);
            }
        }
    }

    combined
}
