//! Artifact types - what gets persisted and what a cache hit returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::content::{ContentItem, ContentKind};

/// Metadata persisted alongside each artifact's content and summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMeta {
    pub slug: String,

    /// Original URL the artifact was made from. Cache lookups normalize this.
    pub source_url: String,

    pub canonical_key: String,
    pub title: String,
    pub kind: ContentKind,
    pub word_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ArtifactMeta {
    /// Describe a freshly extracted item under the given slug.
    pub fn for_item(slug: impl Into<String>, item: &ContentItem) -> Self {
        Self {
            slug: slug.into(),
            source_url: item.source_url.clone(),
            canonical_key: item.canonical_key.clone(),
            title: item.title.clone(),
            kind: item.kind(),
            word_count: item.word_count,
            created_at: Utc::now(),
        }
    }

    /// Set the creation time.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

/// Raw content and summary written together under one slug.
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub meta: ArtifactMeta,
    pub content: String,
    pub summary: String,
}

/// A previously persisted summary found by the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedArtifact {
    pub slug: String,
    pub canonical_key: String,
    pub title: String,
    pub kind: ContentKind,
    pub source_url: String,
    pub summary_text: String,
    pub created_at: DateTime<Utc>,
}

impl CachedArtifact {
    pub fn from_meta(meta: ArtifactMeta, summary_text: String) -> Self {
        Self {
            slug: meta.slug,
            canonical_key: meta.canonical_key,
            title: meta.title,
            kind: meta.kind,
            source_url: meta.source_url,
            summary_text,
            created_at: meta.created_at,
        }
    }
}
