/// Client for the neural recommendation service
///
/// The service keeps its own movie corpus with precomputed embeddings and
/// answers with titles from that corpus, never with metadata-provider ids.
///
/// API Flow:
/// 1. `GET /recommend_by_title?title=&k=` → fuzzy-matches the title in the
///    corpus, 404 when nothing matches
/// 2. `POST /recommend_by_plot` → embeds an arbitrary plot on the fly
/// 3. `GET /recommend/{id}?k=` → legacy lookup by corpus row
use crate::{
    error::AppResult,
    models::{CorpusMovie, PlotQuery},
    services::providers::{ensure_success, RecommendationProvider},
};
use reqwest::Client as HttpClient;

const PROVIDER_NAME: &str = "recommender";

#[derive(Clone)]
pub struct RecommenderClient {
    http_client: HttpClient,
    api_url: String,
}

impl RecommenderClient {
    pub fn new(api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait::async_trait]
impl RecommendationProvider for RecommenderClient {
    async fn recommend_by_title(&self, title: &str, k: usize) -> AppResult<Vec<String>> {
        let url = format!("{}/recommend_by_title", self.api_url);

        let response = self
            .http_client
            .get(&url)
            .query(&[("title", title.to_string()), ("k", k.to_string())])
            .send()
            .await?;

        let titles: Vec<String> = ensure_success(response, PROVIDER_NAME)
            .await?
            .json()
            .await?;

        tracing::debug!(title = %title, k, results = titles.len(), "Title recommendations fetched");

        Ok(titles)
    }

    async fn recommend_by_plot(&self, query: PlotQuery) -> AppResult<Vec<String>> {
        let url = format!("{}/recommend_by_plot", self.api_url);

        let response = self.http_client.post(&url).json(&query).send().await?;

        let titles: Vec<String> = ensure_success(response, PROVIDER_NAME)
            .await?
            .json()
            .await?;

        tracing::debug!(
            year = query.year,
            genres = ?query.genres,
            results = titles.len(),
            "Plot recommendations fetched"
        );

        Ok(titles)
    }

    async fn recommend_by_corpus_id(
        &self,
        corpus_id: i64,
        k: usize,
    ) -> AppResult<Vec<CorpusMovie>> {
        let url = format!("{}/recommend/{}", self.api_url, corpus_id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("k", k)])
            .send()
            .await?;

        let movies: Vec<CorpusMovie> = ensure_success(response, PROVIDER_NAME)
            .await?
            .json()
            .await?;

        Ok(movies)
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = RecommenderClient::new("http://localhost:8000/".to_string());
        assert_eq!(client.api_url, "http://localhost:8000");
        assert_eq!(client.name(), "recommender");
    }

    #[test]
    fn test_plot_query_body() {
        let query = PlotQuery {
            overview: String::new(),
            year: 2024,
            genres: vec!["Action".to_string()],
            k: 10,
        };

        let body = serde_json::to_value(&query).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "overview": "", "year": 2024, "genres": ["Action"], "k": 10 })
        );
    }

    #[tokio::test]
    async fn test_unreachable_service_is_an_error() {
        // Port 9 (discard) is never served locally
        let client = RecommenderClient::new("http://127.0.0.1:9".to_string());
        let result = client.recommend_by_title("Inception", 10).await;
        tokio_test::assert_err!(result);
    }
}
