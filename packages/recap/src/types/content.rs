//! Content types - one extracted source, whatever its kind.

use serde::{Deserialize, Serialize};

use crate::types::site::SiteContent;

/// The three kinds of source recap knows how to acquire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    /// A single rendered page, read from the browser
    Web,
    /// A video, read from its captions
    Video,
    /// A whole site, crawled over HTTP
    Site,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Web => "web",
            ContentKind::Video => "video",
            ContentKind::Site => "site",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific payload of a [`ContentItem`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentBody {
    Web { text: String },
    Video { video_id: String, transcript: String, segment_count: usize },
    Site(SiteContent),
}

impl ContentBody {
    pub fn kind(&self) -> ContentKind {
        match self {
            ContentBody::Web { .. } => ContentKind::Web,
            ContentBody::Video { .. } => ContentKind::Video,
            ContentBody::Site(_) => ContentKind::Site,
        }
    }
}

/// One extracted source, produced once per extraction and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    /// Exact URL the user asked for
    pub source_url: String,

    /// Dedup identity, see [`crate::identity::canonical_key`]
    pub canonical_key: String,

    pub title: String,

    pub body: ContentBody,

    pub word_count: usize,
}

impl ContentItem {
    /// Build a web item from rendered page text.
    pub fn web(
        source_url: impl Into<String>,
        canonical_key: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            source_url: source_url.into(),
            canonical_key: canonical_key.into(),
            title: title.into(),
            word_count: count_words(&text),
            body: ContentBody::Web { text },
        }
    }

    /// Build a video item from a caption transcript.
    pub fn video(
        source_url: impl Into<String>,
        canonical_key: impl Into<String>,
        video_id: impl Into<String>,
        transcript: crate::types::caption::Transcript,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            canonical_key: canonical_key.into(),
            title: transcript.title,
            word_count: transcript.word_count,
            body: ContentBody::Video {
                video_id: video_id.into(),
                transcript: transcript.text,
                segment_count: transcript.segment_count,
            },
        }
    }

    /// Build a site item from crawled pages.
    pub fn site(
        source_url: impl Into<String>,
        canonical_key: impl Into<String>,
        site: SiteContent,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            canonical_key: canonical_key.into(),
            title: site.title.clone(),
            word_count: site.total_words,
            body: ContentBody::Site(site),
        }
    }

    pub fn kind(&self) -> ContentKind {
        self.body.kind()
    }

    /// Plain-text rendering of the raw content, as persisted next to the summary.
    pub fn raw_text(&self) -> String {
        match &self.body {
            ContentBody::Web { text } => text.clone(),
            ContentBody::Video { transcript, .. } => transcript.clone(),
            ContentBody::Site(site) => site.combined_text(),
        }
    }
}

/// Count whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}
