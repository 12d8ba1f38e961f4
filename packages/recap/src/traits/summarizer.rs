//! Summarizer trait - the language model as an opaque oracle.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SummarizationResult;
use crate::types::content::ContentKind;

/// Which system prompt the oracle should use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptKind {
    Web,
    Video,
    /// A whole site, or one chunk of it
    Site,
    /// Merging per-chunk site summaries
    SiteMerge,
}

impl From<ContentKind> for PromptKind {
    fn from(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Web => PromptKind::Web,
            ContentKind::Video => PromptKind::Video,
            ContentKind::Site => PromptKind::Site,
        }
    }
}

/// What the oracle is told about the content it summarizes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryMeta {
    pub title: String,
    pub url: String,
    pub kind: PromptKind,
}

impl SummaryMeta {
    pub fn new(title: impl Into<String>, url: impl Into<String>, kind: PromptKind) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            kind,
        }
    }

    /// Same title and URL, different prompt.
    pub fn with_kind(&self, kind: PromptKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

/// Summarization oracle.
///
/// Implementations may enforce their own timeout; the pipeline also wraps
/// every call in one (see [`crate::pipeline::summarize`]).
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, content: &str, meta: &SummaryMeta) -> SummarizationResult<String>;
}
