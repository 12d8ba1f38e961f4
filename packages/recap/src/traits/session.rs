//! Discussion session trait - hands a stored artifact to an interactive session.

use async_trait::async_trait;

use crate::error::SessionError;
use crate::types::artifact::ArtifactMeta;

#[async_trait]
pub trait DiscussionSession: Send + Sync {
    /// Resume or create a session seeded with the artifact's stored content.
    async fn start(&self, meta: &ArtifactMeta, content: &str) -> Result<(), SessionError>;
}
