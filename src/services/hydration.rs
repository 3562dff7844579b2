use crate::{
    error::AppResult,
    models::MovieEntry,
    services::providers::MetadataProvider,
};

/// Resolves a bare title to a full entry; the first search hit wins
pub async fn hydrate_title(
    metadata: &dyn MetadataProvider,
    title: &str,
) -> AppResult<Option<MovieEntry>> {
    let mut results = metadata.search_by_text(title).await?;
    if results.is_empty() {
        tracing::debug!(title = %title, "No metadata match for title");
        return Ok(None);
    }
    Ok(Some(results.swap_remove(0)))
}

/// Hydrates titles one at a time, in order.
///
/// A title that fails to resolve is logged and skipped.
pub async fn hydrate_titles(metadata: &dyn MetadataProvider, titles: &[String]) -> Vec<MovieEntry> {
    let mut hydrated = Vec::with_capacity(titles.len());

    for title in titles {
        match hydrate_title(metadata, title).await {
            Ok(Some(movie)) => hydrated.push(movie),
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    title = %title,
                    provider = metadata.name(),
                    error = %e,
                    "Hydration failed, skipping title"
                );
            }
        }
    }

    hydrated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::AppError, services::providers::MockMetadataProvider};

    #[tokio::test]
    async fn test_first_match_wins() {
        let mut metadata = MockMetadataProvider::new();
        metadata
            .expect_search_by_text()
            .withf(|q: &str| q == "Heat")
            .returning(|_| {
                Ok(vec![
                    MovieEntry::new(949, "Heat"),
                    MovieEntry::new(1, "Heat (1986)"),
                ])
            });

        let movie = hydrate_title(&metadata, "Heat").await.unwrap();
        assert_eq!(movie.map(|m| m.id), Some(949));
    }

    #[tokio::test]
    async fn test_failures_and_misses_are_skipped_in_order() {
        let mut metadata = MockMetadataProvider::new();
        metadata.expect_name().return_const("mock");
        metadata
            .expect_search_by_text()
            .returning(|q: &str| match q {
                "Broken" => Err(AppError::ExternalApi("boom".to_string())),
                "Missing" => Ok(vec![]),
                "Alien" => Ok(vec![MovieEntry::new(348, "Alien")]),
                _ => Ok(vec![MovieEntry::new(679, "Aliens")]),
            });

        let titles = vec![
            "Alien".to_string(),
            "Broken".to_string(),
            "Missing".to_string(),
            "Aliens".to_string(),
        ];
        let movies = hydrate_titles(&metadata, &titles).await;

        let ids: Vec<u64> = movies.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![348, 679]);
    }
}
