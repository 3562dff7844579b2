use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod industry;
pub mod preferences;

pub use industry::{Industry, INDUSTRIES};
pub use preferences::Preferences;

/// Base URL prepended to provider poster/backdrop/profile paths
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Year label used when the provider has no release date
pub const UNKNOWN_YEAR: &str = "N/A";

/// Movie identifier in the metadata provider's namespace
pub type MovieId = u64;

/// Provider genre identifier
pub type GenreId = u32;

/// Why an entry was placed in the feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum MatchType {
    Plot,
    Genre,
    /// Shares the lead cast member of a seed movie
    Actor(String),
}

impl MatchType {
    pub const ACTOR_FALLBACK: &'static str = "Same Actor";

    pub fn actor(name: Option<&str>) -> Self {
        let name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(Self::ACTOR_FALLBACK);
        MatchType::Actor(name.to_string())
    }
}

impl Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchType::Plot => write!(f, "Plot Match"),
            MatchType::Genre => write!(f, "Genre Match"),
            MatchType::Actor(name) => write!(f, "Starring {}", name),
        }
    }
}

impl From<MatchType> for String {
    fn from(match_type: MatchType) -> Self {
        match_type.to_string()
    }
}

impl From<String> for MatchType {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Plot Match" => MatchType::Plot,
            "Genre Match" => MatchType::Genre,
            other => MatchType::actor(other.strip_prefix("Starring ")),
        }
    }
}

/// Normalized movie record shared by every source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieEntry {
    pub id: MovieId,
    pub title: String,
    #[serde(default = "unknown_year")]
    pub year: String,
    /// Provider genre ids
    #[serde(default)]
    pub genre: Vec<GenreId>,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backdrop_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_average: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_type: Option<MatchType>,
    #[serde(default)]
    pub is_ai_pick: bool,
}

fn unknown_year() -> String {
    UNKNOWN_YEAR.to_string()
}

impl MovieEntry {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            year: unknown_year(),
            genre: Vec::new(),
            overview: String::new(),
            poster_url: None,
            backdrop_url: None,
            vote_average: None,
            original_language: None,
            match_type: None,
            is_ai_pick: false,
        }
    }

    /// Numeric year for ordering; anything unparsable counts as 0
    pub fn year_number(&self) -> i32 {
        self.year.trim().parse().unwrap_or(0)
    }

    pub fn with_match(mut self, match_type: MatchType) -> Self {
        self.match_type = Some(match_type);
        self
    }

    /// True when the filter is empty or contains this entry's language
    pub fn matches_industries(&self, industries: &[String]) -> bool {
        if industries.is_empty() {
            return true;
        }
        self.original_language
            .as_ref()
            .is_some_and(|lang| industries.iter().any(|code| code == lang))
    }
}

/// Extracts the year label from a provider release date (`YYYY-MM-DD`)
pub fn year_from_release_date(release_date: Option<&str>) -> String {
    release_date
        .and_then(|date| date.split('-').next())
        .map(str::trim)
        .filter(|year| !year.is_empty())
        .map(str::to_string)
        .unwrap_or_else(unknown_year)
}

fn image_url(path: Option<String>) -> Option<String> {
    path.filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", IMAGE_BASE_URL, p))
}

/// Genre as listed in the provider catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Cast member of a movie, in billing order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

/// Full record shown when a movie is opened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieDetails {
    #[serde(flatten)]
    pub movie: MovieEntry,
    #[serde(default)]
    pub genre_names: Vec<String>,
    #[serde(default)]
    pub cast: Vec<CastMember>,
}

impl From<MovieEntry> for MovieDetails {
    fn from(movie: MovieEntry) -> Self {
        Self {
            movie,
            genre_names: Vec::new(),
            cast: Vec::new(),
        }
    }
}

/// One composed page of the feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub movies: Vec<MovieEntry>,
    pub page: u32,
    pub has_more: bool,
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// Movie as returned by search, discover and trending
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovie {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
}

impl From<ApiMovie> for MovieEntry {
    fn from(movie: ApiMovie) -> Self {
        MovieEntry {
            id: movie.id,
            title: movie.title,
            year: year_from_release_date(movie.release_date.as_deref()),
            genre: movie.genre_ids,
            overview: movie.overview.unwrap_or_default(),
            poster_url: image_url(movie.poster_path),
            backdrop_url: image_url(movie.backdrop_path),
            vote_average: movie.vote_average,
            original_language: movie.original_language,
            match_type: None,
            is_ai_pick: false,
        }
    }
}

/// Paged list wrapper used by search, discover and trending
#[derive(Debug, Clone, Deserialize)]
pub struct ApiPage<T> {
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiGenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiCastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: Option<String>,
    #[serde(default)]
    pub profile_path: Option<String>,
}

impl From<ApiCastMember> for CastMember {
    fn from(member: ApiCastMember) -> Self {
        CastMember {
            id: member.id,
            name: member.name,
            character: member.character.unwrap_or_default(),
            profile_url: image_url(member.profile_path),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCredits {
    #[serde(default)]
    pub cast: Vec<ApiCastMember>,
}

/// Response from `/movie/{id}?append_to_response=credits`
#[derive(Debug, Clone, Deserialize)]
pub struct ApiMovieDetails {
    pub id: MovieId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub credits: Option<ApiCredits>,
}

impl ApiMovieDetails {
    pub fn into_details(self, cast_limit: usize) -> MovieDetails {
        let genre_names = self.genres.iter().map(|g| g.name.clone()).collect();
        let cast = self
            .credits
            .unwrap_or_default()
            .cast
            .into_iter()
            .take(cast_limit)
            .map(CastMember::from)
            .collect();

        let movie = MovieEntry {
            id: self.id,
            title: self.title,
            year: year_from_release_date(self.release_date.as_deref()),
            genre: self.genres.iter().map(|g| g.id).collect(),
            overview: self.overview.unwrap_or_default(),
            poster_url: image_url(self.poster_path),
            backdrop_url: image_url(self.backdrop_path),
            vote_average: self.vote_average,
            original_language: self.original_language,
            match_type: None,
            is_ai_pick: false,
        };

        MovieDetails {
            movie,
            genre_names,
            cast,
        }
    }
}

// ============================================================================
// Recommendation Service Types
// ============================================================================

/// Body of `POST /recommend_by_plot`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotQuery {
    pub overview: String,
    pub year: i32,
    pub genres: Vec<String>,
    pub k: usize,
}

/// Year as stored in the recommender's corpus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorpusYear {
    Int(i64),
    Float(f64),
    Text(String),
}

impl Display for CorpusYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CorpusYear::Int(y) => write!(f, "{}", y),
            CorpusYear::Float(y) => write!(f, "{}", y.trunc() as i64),
            CorpusYear::Text(y) => write!(f, "{}", y),
        }
    }
}

/// Genre field in the recommender's corpus: a list or one comma-joined string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorpusGenre {
    List(Vec<String>),
    Text(String),
}

impl CorpusGenre {
    pub fn names(&self) -> Vec<String> {
        match self {
            CorpusGenre::List(names) => names.clone(),
            CorpusGenre::Text(text) => text
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Record from the recommender's own corpus (legacy `/recommend/{id}`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusMovie {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub year: Option<CorpusYear>,
    #[serde(default)]
    pub genre: Option<CorpusGenre>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl CorpusMovie {
    pub fn year_label(&self) -> String {
        self.year
            .as_ref()
            .map(|y| y.to_string())
            .unwrap_or_else(unknown_year)
    }
}

/// Corpus record with the loose fields settled, as served to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusEntry {
    pub id: i64,
    pub title: String,
    pub year: String,
    pub genres: Vec<String>,
    pub overview: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub industry: Option<String>,
}

impl From<CorpusMovie> for CorpusEntry {
    fn from(movie: CorpusMovie) -> Self {
        Self {
            year: movie.year_label(),
            genres: movie.genre.as_ref().map(CorpusGenre::names).unwrap_or_default(),
            id: movie.id,
            title: movie.title,
            overview: movie.overview.unwrap_or_default(),
            industry: movie.industry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_from_release_date() {
        assert_eq!(year_from_release_date(Some("2010-07-15")), "2010");
        assert_eq!(year_from_release_date(Some("")), "N/A");
        assert_eq!(year_from_release_date(None), "N/A");
    }

    #[test]
    fn test_year_number_unparsable_is_zero() {
        let mut entry = MovieEntry::new(1, "Unknown");
        assert_eq!(entry.year_number(), 0);
        entry.year = "1999".to_string();
        assert_eq!(entry.year_number(), 1999);
    }

    #[test]
    fn test_match_type_labels() {
        assert_eq!(MatchType::Plot.to_string(), "Plot Match");
        assert_eq!(MatchType::Genre.to_string(), "Genre Match");
        assert_eq!(
            MatchType::actor(Some("Leonardo DiCaprio")).to_string(),
            "Starring Leonardo DiCaprio"
        );
        assert_eq!(MatchType::actor(None).to_string(), "Starring Same Actor");
        assert_eq!(MatchType::actor(Some("  ")).to_string(), "Starring Same Actor");
    }

    #[test]
    fn test_match_type_serializes_as_label() {
        let json = serde_json::to_string(&MatchType::actor(Some("Tom Hardy"))).unwrap();
        assert_eq!(json, r#""Starring Tom Hardy""#);

        let parsed: MatchType = serde_json::from_str(r#""Plot Match""#).unwrap();
        assert_eq!(parsed, MatchType::Plot);
        let parsed: MatchType = serde_json::from_str(r#""Starring Tom Hardy""#).unwrap();
        assert_eq!(parsed, MatchType::Actor("Tom Hardy".to_string()));
    }

    #[test]
    fn test_api_movie_to_entry_full() {
        let json = r#"{
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "genre_ids": [28, 878],
            "overview": "Cobb steals secrets.",
            "poster_path": "/poster.jpg",
            "vote_average": 8.4,
            "original_language": "en"
        }"#;

        let api: ApiMovie = serde_json::from_str(json).unwrap();
        let entry: MovieEntry = api.into();

        assert_eq!(entry.id, 27205);
        assert_eq!(entry.year, "2010");
        assert_eq!(entry.genre, vec![28, 878]);
        assert_eq!(
            entry.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/poster.jpg")
        );
        assert_eq!(entry.vote_average, Some(8.4));
        assert_eq!(entry.original_language.as_deref(), Some("en"));
        assert!(!entry.is_ai_pick);
        assert_eq!(entry.match_type, None);
    }

    #[test]
    fn test_api_movie_to_entry_missing_optional_fields() {
        let json = r#"{ "id": 1, "title": "Obscure", "poster_path": null, "release_date": "" }"#;

        let api: ApiMovie = serde_json::from_str(json).unwrap();
        let entry: MovieEntry = api.into();

        assert_eq!(entry.year, "N/A");
        assert_eq!(entry.poster_url, None);
        assert_eq!(entry.vote_average, None);
        assert_eq!(entry.overview, "");
        assert!(entry.genre.is_empty());
    }

    #[test]
    fn test_details_keep_ids_and_names_and_top_cast() {
        let cast: Vec<serde_json::Value> = (0..8)
            .map(|i| serde_json::json!({ "id": i, "name": format!("Actor {}", i), "character": "Role" }))
            .collect();
        let json = serde_json::json!({
            "id": 27205,
            "title": "Inception",
            "release_date": "2010-07-15",
            "genres": [{ "id": 28, "name": "Action" }, { "id": 878, "name": "Science Fiction" }],
            "credits": { "cast": cast }
        });

        let api: ApiMovieDetails = serde_json::from_value(json).unwrap();
        let details = api.into_details(5);

        assert_eq!(details.movie.genre, vec![28, 878]);
        assert_eq!(details.genre_names, vec!["Action", "Science Fiction"]);
        assert_eq!(details.cast.len(), 5);
        assert_eq!(details.cast[0].name, "Actor 0");
        assert_eq!(details.cast[0].profile_url, None);
    }

    #[test]
    fn test_matches_industries() {
        let mut entry = MovieEntry::new(1, "Dangal");
        assert!(entry.matches_industries(&[]));
        assert!(!entry.matches_industries(&["hi".to_string()]));

        entry.original_language = Some("hi".to_string());
        assert!(entry.matches_industries(&["en".to_string(), "hi".to_string()]));
        assert!(!entry.matches_industries(&["en".to_string()]));
    }

    #[test]
    fn test_corpus_movie_loose_fields() {
        let json = r#"[
            { "id": 3, "title": "A", "year": 1999.0, "genre": "Drama, Crime" },
            { "id": 4, "title": "B", "year": "2004", "genre": ["Comedy"] },
            { "id": 5, "title": "C", "year": null }
        ]"#;

        let movies: Vec<CorpusMovie> = serde_json::from_str(json).unwrap();

        assert_eq!(movies[0].year_label(), "1999");
        assert_eq!(
            movies[0].genre.as_ref().unwrap().names(),
            vec!["Drama", "Crime"]
        );
        assert_eq!(movies[1].year_label(), "2004");
        assert_eq!(movies[1].genre.as_ref().unwrap().names(), vec!["Comedy"]);
        assert_eq!(movies[2].year_label(), "N/A");

        let entry = CorpusEntry::from(movies[0].clone());
        assert_eq!(entry.year, "1999");
        assert_eq!(entry.genres, vec!["Drama", "Crime"]);
        assert_eq!(entry.overview, "");
        assert!(CorpusEntry::from(movies[2].clone()).genres.is_empty());
    }
}
