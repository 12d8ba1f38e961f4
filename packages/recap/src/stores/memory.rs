//! In-memory artifact storage for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::error::PersistenceResult;
use crate::traits::store::ArtifactStore;
use crate::types::artifact::{ArtifactBundle, ArtifactMeta};

/// In-memory storage for artifact bundles.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
pub struct MemoryStore {
    metas: RwLock<HashMap<String, ArtifactMeta>>,
    contents: RwLock<HashMap<String, String>>,
    summaries: RwLock<HashMap<String, String>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            metas: RwLock::new(HashMap::new()),
            contents: RwLock::new(HashMap::new()),
            summaries: RwLock::new(HashMap::new()),
        }
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.metas.write().unwrap().clear();
        self.contents.write().unwrap().clear();
        self.summaries.write().unwrap().clear();
    }

    /// Get the number of stored artifacts.
    pub fn artifact_count(&self) -> usize {
        self.metas.read().unwrap().len()
    }

    /// Drop a summary, leaving content and metadata (an interrupted persist).
    pub fn remove_summary(&self, slug: &str) {
        self.summaries.write().unwrap().remove(slug);
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn list(&self) -> PersistenceResult<Vec<ArtifactMeta>> {
        Ok(self.metas.read().unwrap().values().cloned().collect())
    }

    async fn get_meta(&self, slug: &str) -> PersistenceResult<Option<ArtifactMeta>> {
        Ok(self.metas.read().unwrap().get(slug).cloned())
    }

    async fn get_summary(&self, slug: &str) -> PersistenceResult<Option<String>> {
        Ok(self.summaries.read().unwrap().get(slug).cloned())
    }

    async fn get_content(&self, slug: &str) -> PersistenceResult<Option<String>> {
        Ok(self.contents.read().unwrap().get(slug).cloned())
    }

    async fn save(&self, bundle: &ArtifactBundle) -> PersistenceResult<()> {
        let slug = bundle.meta.slug.clone();
        self.contents
            .write()
            .unwrap()
            .insert(slug.clone(), bundle.content.clone());
        self.summaries
            .write()
            .unwrap()
            .insert(slug.clone(), bundle.summary.clone());
        self.metas.write().unwrap().insert(slug, bundle.meta.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::content::ContentItem;

    fn bundle(slug: &str) -> ArtifactBundle {
        let item = ContentItem::web("https://a.com", "https://a.com", "A", "body text");
        ArtifactBundle {
            meta: ArtifactMeta::for_item(slug, &item),
            content: "body text".into(),
            summary: "summary".into(),
        }
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryStore::new();
        store.save(&bundle("s1")).await.unwrap();

        assert_eq!(store.artifact_count(), 1);
        assert_eq!(store.get_summary("s1").await.unwrap().as_deref(), Some("summary"));
        assert_eq!(store.get_content("s1").await.unwrap().as_deref(), Some("body text"));
        assert!(store.get_meta("missing").await.unwrap().is_none());

        store.clear();
        assert_eq!(store.artifact_count(), 0);
        assert!(store.get_summary("s1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_latest() {
        let store = MemoryStore::new();
        assert!(store.latest().await.unwrap().is_none());

        let mut older = bundle("older");
        older.meta.created_at -= chrono::Duration::days(1);
        store.save(&older).await.unwrap();
        store.save(&bundle("newer")).await.unwrap();

        assert_eq!(store.latest().await.unwrap().unwrap().slug, "newer");
    }
}
