/// TMDB metadata provider
///
/// Wraps the handful of TMDB v3 endpoints the feed needs and normalizes every
/// response into [`MovieEntry`] / [`MovieDetails`].
///
/// Endpoints:
/// - `/search/movie` for free text and title hydration
/// - `/discover/movie` for genre and cast discovery
/// - `/movie/{id}` (+ credits) and `/movie/{id}/credits`
/// - `/trending/movie/day`, `/genre/movie/list`
use crate::{
    error::{AppError, AppResult},
    models::{
        ApiCredits, ApiGenreList, ApiMovie, ApiMovieDetails, ApiPage, CastMember, Genre, GenreId,
        MovieDetails, MovieEntry, MovieId,
    },
    services::providers::{ensure_success, MetadataProvider},
};
use reqwest::Client as HttpClient;
use serde::de::DeserializeOwned;

/// Number of cast members kept on a detail record
pub const DETAIL_CAST_LIMIT: usize = 5;

const PROVIDER_NAME: &str = "tmdb";

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    /// Query parameters for genre discovery
    fn genre_discovery_params(
        genre_ids: &[GenreId],
        page: u32,
        industries: &[String],
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", page.to_string()),
            ("include_adult", "false".to_string()),
            ("sort_by", "popularity.desc".to_string()),
        ];

        if !industries.is_empty() {
            params.push(("with_original_language", industries.join("|")));
        }

        // Without genres this degrades to plain popularity discovery
        if !genre_ids.is_empty() {
            let genres: Vec<String> = genre_ids.iter().map(|g| g.to_string()).collect();
            params.push(("with_genres", genres.join(",")));
        }

        params
    }

    fn cast_discovery_params(person_id: u64) -> Vec<(&'static str, String)> {
        vec![
            ("with_cast", person_id.to_string()),
            ("sort_by", "popularity.desc".to_string()),
            ("include_adult", "false".to_string()),
        ]
    }

    /// Issues an authenticated GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        tracing::debug!(path = %path, "Fetching from TMDB");

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let response = ensure_success(response, PROVIDER_NAME).await?;
        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(error = %e, path = %path, "Failed to deserialize TMDB response");
            AppError::ExternalApi(format!("Failed to parse TMDB response: {}", e))
        })
    }

    async fn get_movies(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<Vec<MovieEntry>> {
        let page: ApiPage<ApiMovie> = self.get_json(path, params).await?;
        Ok(page.results.into_iter().map(MovieEntry::from).collect())
    }
}

#[async_trait::async_trait]
impl MetadataProvider for TmdbProvider {
    async fn search_by_text(&self, query: &str) -> AppResult<Vec<MovieEntry>> {
        if query.trim().is_empty() {
            return Ok(Vec::new());
        }

        let params = [
            ("query", query.to_string()),
            ("include_adult", "false".to_string()),
        ];
        let movies = self.get_movies("/search/movie", &params).await?;

        tracing::info!(
            query = %query,
            results = movies.len(),
            provider = PROVIDER_NAME,
            "Title search completed"
        );

        Ok(movies)
    }

    async fn discover_by_genres(
        &self,
        genre_ids: &[GenreId],
        page: u32,
        industries: &[String],
    ) -> AppResult<Vec<MovieEntry>> {
        let params = Self::genre_discovery_params(genre_ids, page, industries);
        let movies = self.get_movies("/discover/movie", &params).await?;

        tracing::info!(
            genres = ?genre_ids,
            industries = ?industries,
            page,
            results = movies.len(),
            "Genre discovery completed"
        );

        Ok(movies)
    }

    async fn discover_by_cast(&self, person_id: u64) -> AppResult<Vec<MovieEntry>> {
        let params = Self::cast_discovery_params(person_id);
        let movies = self.get_movies("/discover/movie", &params).await?;

        tracing::info!(person_id, results = movies.len(), "Cast discovery completed");

        Ok(movies)
    }

    async fn movie_credits(&self, movie_id: MovieId) -> AppResult<Vec<CastMember>> {
        let credits: ApiCredits = self
            .get_json(&format!("/movie/{}/credits", movie_id), &[])
            .await?;

        Ok(credits.cast.into_iter().map(CastMember::from).collect())
    }

    async fn get_details(&self, movie_id: MovieId) -> AppResult<Option<MovieDetails>> {
        let params = [("append_to_response", "credits".to_string())];
        match self
            .get_json::<ApiMovieDetails>(&format!("/movie/{}", movie_id), &params)
            .await
        {
            Ok(details) => Ok(Some(details.into_details(DETAIL_CAST_LIMIT))),
            Err(AppError::NotFound(_)) => {
                tracing::debug!(movie_id, "Movie not known to TMDB");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_trending(&self) -> AppResult<Vec<MovieEntry>> {
        self.get_movies("/trending/movie/day", &[]).await
    }

    async fn genres(&self) -> AppResult<Vec<Genre>> {
        let list: ApiGenreList = self.get_json("/genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let provider = TmdbProvider::new("key".to_string(), "http://test.local/3/".to_string());
        assert_eq!(provider.api_url, "http://test.local/3");
        assert_eq!(provider.name(), "tmdb");
    }

    #[test]
    fn test_genre_discovery_params_full() {
        let params = TmdbProvider::genre_discovery_params(
            &[28, 12],
            2,
            &["en".to_string(), "hi".to_string()],
        );

        assert_eq!(param(&params, "page"), Some("2"));
        assert_eq!(param(&params, "with_genres"), Some("28,12"));
        assert_eq!(param(&params, "with_original_language"), Some("en|hi"));
        assert_eq!(param(&params, "sort_by"), Some("popularity.desc"));
        assert_eq!(param(&params, "include_adult"), Some("false"));
    }

    #[test]
    fn test_genre_discovery_params_without_filters() {
        let params = TmdbProvider::genre_discovery_params(&[], 1, &[]);

        assert_eq!(param(&params, "with_genres"), None);
        assert_eq!(param(&params, "with_original_language"), None);
        assert_eq!(param(&params, "page"), Some("1"));
    }

    #[test]
    fn test_cast_discovery_params() {
        let params = TmdbProvider::cast_discovery_params(6193);

        assert_eq!(param(&params, "with_cast"), Some("6193"));
        assert_eq!(param(&params, "page"), None);
        assert_eq!(param(&params, "with_original_language"), None);
    }

    #[test]
    fn test_search_page_deserialization() {
        let json = r#"{
            "page": 1,
            "results": [
                { "id": 27205, "title": "Inception", "release_date": "2010-07-15", "genre_ids": [28] },
                { "id": 64956, "title": "Inception: The Cobol Job" }
            ],
            "total_pages": 1
        }"#;

        let page: ApiPage<ApiMovie> = serde_json::from_str(json).unwrap();
        let movies: Vec<MovieEntry> = page.results.into_iter().map(MovieEntry::from).collect();

        assert_eq!(movies.len(), 2);
        assert_eq!(movies[0].year, "2010");
        assert_eq!(movies[1].year, "N/A");
    }

    #[test]
    fn test_page_without_results_is_empty() {
        let page: ApiPage<ApiMovie> = serde_json::from_str(r#"{ "page": 1 }"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_credits_deserialization_keeps_order() {
        let json = r#"{
            "id": 27205,
            "cast": [
                { "id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb", "profile_path": "/leo.jpg" },
                { "id": 24045, "name": "Joseph Gordon-Levitt", "character": null }
            ]
        }"#;

        let credits: ApiCredits = serde_json::from_str(json).unwrap();
        let cast: Vec<CastMember> = credits.cast.into_iter().map(CastMember::from).collect();

        assert_eq!(cast[0].id, 6193);
        assert_eq!(
            cast[0].profile_url.as_deref(),
            Some("https://image.tmdb.org/t/p/w500/leo.jpg")
        );
        assert_eq!(cast[1].character, "");
    }
}
