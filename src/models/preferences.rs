use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{GenreId, Industry, MovieEntry, MovieId};

/// What the user told us during onboarding
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Original-language codes used as the industry filter
    #[serde(default)]
    pub industries: Vec<String>,
    /// Preferred provider genre ids
    #[serde(default)]
    pub genres: Vec<GenreId>,
    /// Movies the user marked as liked, in the order they were picked
    #[serde(default, alias = "movies")]
    pub seed_movies: Vec<MovieEntry>,
}

impl Preferences {
    /// Creates empty preferences
    pub fn new() -> Self {
        Self::default()
    }

    /// First industry code that is not in the onboarding catalog
    pub fn unknown_industry(&self) -> Option<&str> {
        self.industries
            .iter()
            .map(String::as_str)
            .find(|code| Industry::by_code(code).is_none())
    }

    pub fn seed_ids(&self) -> HashSet<MovieId> {
        self.seed_movies.iter().map(|m| m.id).collect()
    }

    /// Collapses duplicates while keeping first-seen order
    pub fn normalized(mut self) -> Self {
        let mut seen_codes = HashSet::new();
        self.industries.retain(|c| seen_codes.insert(c.clone()));
        let mut seen_genres = HashSet::new();
        self.genres.retain(|g| seen_genres.insert(*g));
        let mut seen_ids = HashSet::new();
        self.seed_movies.retain(|m| seen_ids.insert(m.id));
        self
    }
}
