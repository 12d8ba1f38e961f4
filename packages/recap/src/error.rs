//! Typed errors for the recap library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell
//! an unplayable video from a summarization timeout without string matching.
//! A cache miss is never an error: lookups return `Ok(None)`.

use std::time::Duration;

use thiserror::Error;

/// The input could not be turned into a canonical identity.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// URL failed to parse
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// URL parsed but carries no host
    #[error("URL has no host: {url}")]
    NoHost { url: String },

    /// URL looks like a video link but no 11-character id was found
    #[error("no video id in URL: {url}")]
    NoVideoId { url: String },
}

/// HTTP transport failures, as seen by a [`Fetcher`](crate::traits::fetcher::Fetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the connection failed
    #[error("HTTP request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Response body could not be read or decoded
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },
}

/// Content could not be acquired from a page, video or site.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Browser reported no usable tabs
    #[error("no open browser tabs")]
    NoTabs,

    /// A newly opened tab never left its blank state
    #[error("timed out after {0:?} waiting for tab to load: {1}")]
    TabOpenTimeout(Duration, String),

    /// Evaluating the extraction expression exceeded its bound
    #[error("timed out after {0:?} evaluating page text")]
    EvalTimeout(Duration),

    /// Browser control channel failed
    #[error("browser control error: {0}")]
    Browser(String),

    /// The watch page carried no client API key
    #[error("could not find player API key on watch page for {video_id}")]
    MissingApiKey { video_id: String },

    /// Player endpoint reported a status other than OK
    #[error("video {video_id} is not playable: {status}{}", .reason.as_deref().map(|r| format!(" ({r})")).unwrap_or_default())]
    Unplayable {
        video_id: String,
        status: String,
        reason: Option<String>,
    },

    /// Player response listed no caption tracks
    #[error("no captions available for video {video_id}")]
    NoCaptions { video_id: String },

    /// The chosen caption track had no non-empty segments
    #[error("captions for video {video_id} are empty")]
    EmptyCaptions { video_id: String },

    /// Site discovery produced no URLs
    #[error("no pages found for {root_url}")]
    NoPagesFound { root_url: String },

    /// Every discovered page fell under the content threshold
    #[error("no page on {root_url} has more than {min_words} words")]
    NoContent { root_url: String, min_words: usize },

    /// Player response JSON had an unexpected shape
    #[error("unexpected player response for {video_id}: {reason}")]
    PlayerResponse { video_id: String, reason: String },

    /// Underlying HTTP fetch failed
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// URL classification failed mid-extraction
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// The summarization oracle failed.
#[derive(Debug, Error)]
pub enum SummarizationError {
    /// Oracle returned an error
    #[error("summarizer error: {0}")]
    Oracle(String),

    /// Oracle did not answer within the bound
    #[error("summarizer timed out after {0:?}")]
    Timeout(Duration),

    /// Oracle answered with nothing usable
    #[error("summarizer returned an empty result")]
    EmptyResult,
}

/// Reading or writing persisted artifacts failed.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Filesystem failure
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Stored metadata could not be (de)serialized
    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// The discussion session could not be started.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No session command is configured
    #[error("no discussion command configured")]
    NotConfigured,

    /// Session process failed to launch or exited badly
    #[error("discussion session failed: {0}")]
    Failed(String),
}

/// Top-level error for a recap invocation.
///
/// Every failure is terminal for the current run; nothing here is retried.
#[derive(Debug, Error)]
pub enum RecapError {
    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Session(#[from] SessionError),

    /// Discuss mode could not resolve any stored artifact
    #[error("no stored artifact found{}", .0.as_deref().map(|s| format!(" for {s}")).unwrap_or_default())]
    ArtifactNotFound(Option<String>),

    /// No URL was given and no browser is available to supply the active tab
    #[error("no URL given and no browser configured")]
    NoInput,
}

impl From<FetchError> for RecapError {
    fn from(err: FetchError) -> Self {
        RecapError::Extraction(ExtractionError::Fetch(err))
    }
}

/// Result type alias for recap operations.
pub type Result<T> = std::result::Result<T, RecapError>;

/// Result type alias for HTTP fetches.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction.
pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for summarization.
pub type SummarizationResult<T> = std::result::Result<T, SummarizationError>;

/// Result type alias for persistence.
pub type PersistenceResult<T> = std::result::Result<T, PersistenceError>;
