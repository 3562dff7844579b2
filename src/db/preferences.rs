use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;

use crate::{error::AppResult, models::Preferences};

/// Single-blob store for the user's onboarding preferences
///
/// The blob is read once when the store is opened; afterwards reads are served
/// from memory and only `save` / `clear` touch the file. Writes replace the
/// whole blob.
pub struct PreferenceStore {
    path: PathBuf,
    current: RwLock<Option<Preferences>>,
}

impl PreferenceStore {
    /// Opens the store, loading any preferences persisted by an earlier run
    pub async fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let current = Self::load(&path).await?;

        tracing::info!(
            path = %path.display(),
            has_preferences = current.is_some(),
            "Preference store opened"
        );

        Ok(Self {
            path,
            current: RwLock::new(current),
        })
    }

    async fn load(path: &Path) -> AppResult<Option<Preferences>> {
        match tokio::fs::read_to_string(path).await {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Snapshot of the stored preferences
    pub async fn current(&self) -> Option<Preferences> {
        self.current.read().await.clone()
    }

    /// Persists the whole blob, then replaces the in-memory copy
    pub async fn save(&self, prefs: &Preferences) -> AppResult<()> {
        let json = serde_json::to_string_pretty(prefs)?;

        let mut current = self.current.write().await;
        tokio::fs::write(&self.path, json).await?;
        *current = Some(prefs.clone());

        tracing::info!(
            industries = prefs.industries.len(),
            genres = prefs.genres.len(),
            seeds = prefs.seed_movies.len(),
            "Preferences saved"
        );

        Ok(())
    }

    /// Removes the blob; clearing an empty store is not an error
    pub async fn clear(&self) -> AppResult<()> {
        let mut current = self.current.write().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        *current = None;

        tracing::info!("Preferences cleared");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::MovieEntry;

    fn sample() -> Preferences {
        let mut seed = MovieEntry::new(27205, "Inception");
        seed.year = "2010".to_string();
        seed.genre = vec![28, 878];
        Preferences {
            industries: vec!["en".to_string(), "ko".to_string()],
            genres: vec![28, 53],
            seed_movies: vec![seed, MovieEntry::new(496243, "Parasite")],
        }
    }

    #[tokio::test]
    async fn test_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferenceStore::open(dir.path().join("prefs.json"))
            .await
            .unwrap();

        assert_eq!(store.current().await, None);
    }

    #[tokio::test]
    async fn test_save_then_reload_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = PreferenceStore::open(&path).await.unwrap();
        store.save(&sample()).await.unwrap();
        assert_eq!(store.current().await, Some(sample()));

        let reopened = PreferenceStore::open(&path).await.unwrap();
        assert_eq!(reopened.current().await, Some(sample()));
    }

    #[tokio::test]
    async fn test_clear_removes_blob() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let store = PreferenceStore::open(&path).await.unwrap();
        store.save(&sample()).await.unwrap();
        tokio_test::assert_ok!(store.clear().await);
        tokio_test::assert_ok!(store.clear().await);

        assert_eq!(store.current().await, None);
        assert!(!path.exists());
        assert_eq!(PreferenceStore::open(&path).await.unwrap().current().await, None);
    }

    #[tokio::test]
    async fn test_malformed_blob_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ not json").unwrap();

        let result = PreferenceStore::open(&path).await;
        assert!(matches!(result, Err(AppError::Serialization(_))));
    }
}
