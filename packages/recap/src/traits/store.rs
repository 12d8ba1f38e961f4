//! Storage trait for persisted artifacts.
//!
//! Each artifact is a bundle of raw content, summary and metadata sharing one
//! slug. Rendered output lives next to them but is written by the renderer,
//! not by recap.

use async_trait::async_trait;

use crate::error::PersistenceResult;
use crate::types::artifact::{ArtifactBundle, ArtifactMeta};

#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Metadata of every stored artifact, in no particular order.
    async fn list(&self) -> PersistenceResult<Vec<ArtifactMeta>>;

    /// Metadata for one slug.
    async fn get_meta(&self, slug: &str) -> PersistenceResult<Option<ArtifactMeta>>;

    /// Stored summary text. `None` when it was never written.
    async fn get_summary(&self, slug: &str) -> PersistenceResult<Option<String>>;

    /// Stored raw content.
    async fn get_content(&self, slug: &str) -> PersistenceResult<Option<String>>;

    /// Persist content, summary and metadata under the bundle's slug.
    async fn save(&self, bundle: &ArtifactBundle) -> PersistenceResult<()>;

    /// The most recently created artifact.
    async fn latest(&self) -> PersistenceResult<Option<ArtifactMeta>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .max_by_key(|meta| meta.created_at))
    }
}
