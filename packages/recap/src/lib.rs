//! Recap - cached, deduplicated summaries of pages, videos and whole sites.
//!
//! Give recap a URL and it works out what the URL is, checks whether it has
//! already been summarized, and if not acquires the text and asks a language
//! model for a summary:
//!
//! - **Videos** are read from their caption tracks.
//! - **Web pages** are read from the user's live browser, so logged-in
//!   content works.
//! - **Whole sites** are crawled over HTTP, with navigation and footers that
//!   repeat across pages stripped out. Sites too large for one model call are
//!   summarized map-reduce style.
//!
//! Every result is persisted under a date-prefixed slug, and the same source
//! is never summarized twice unless forced.
//!
//! # Usage
//!
//! ```rust,ignore
//! use recap::{Recap, RecapConfig, RecapRequest, MemoryStore};
//! use recap::testing::{MockBrowser, MockFetcher, MockSummarizer};
//!
//! let recap = Recap::new(RecapConfig::default(), MemoryStore::new(), MockSummarizer::new(), MockFetcher::new())
//!     .with_browser(MockBrowser::new());
//!
//! let outcome = recap.run(RecapRequest::url("https://youtu.be/dQw4w9WgXcQ")).await?;
//! println!("{}", outcome.summary);
//! ```
//!
//! # Modules
//!
//! - [`identity`] - URL classification, canonical keys and slugs
//! - [`extract`] - Caption, live page and site extractors
//! - [`pipeline`] - Cache lookup, summarization and the orchestrator
//! - [`traits`] - Collaborator seams (HTTP, browser, summarizer, storage, session)
//! - [`stores`] - Storage implementations (MemoryStore, FsStore)
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod fetchers;
pub mod identity;
pub mod pipeline;
pub mod session;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use config::{BoilerplateConfig, BrowserConfig, RecapConfig, VideoConfig};
pub use error::{
    ExtractionError, FetchError, IdentityError, PersistenceError, RecapError, Result,
    SessionError, SummarizationError,
};
pub use traits::{
    browser::{BrowserControl, Tab},
    fetcher::{Fetcher, HttpResponse},
    session::DiscussionSession,
    store::ArtifactStore,
    summarizer::{PromptKind, SummaryMeta, Summarizer},
};
pub use types::{
    artifact::{ArtifactBundle, ArtifactMeta, CachedArtifact},
    caption::{CaptionTrack, Transcript},
    content::{ContentBody, ContentItem, ContentKind},
    site::{SiteContent, SitePage, SummaryChunk},
};

// Re-export the orchestrator
pub use pipeline::{Recap, RecapOutcome, RecapRequest};

// Re-export implementations
pub use ai::OpenAiSummarizer;
pub use browser::CdpBrowser;
pub use fetchers::HttpFetcher;
pub use session::CommandSession;
pub use stores::{FsStore, MemoryStore};
