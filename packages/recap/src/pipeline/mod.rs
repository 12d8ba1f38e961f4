//! Recap pipeline - identity, cache, extraction, summarization, persistence.
//!
//! The pipeline orchestrates:
//! - Cache lookup by canonical key
//! - Dispatch to the video, page or site extractor
//! - Single-pass or map-reduce summarization
//! - Persisting content and summary under one slug

pub mod cache;
pub mod chunk;
pub mod orchestrator;
pub mod prompts;
pub mod summarize;

pub use cache::{find_by_url, find_cached};
pub use chunk::partition_pages;
pub use orchestrator::{Recap, RecapOutcome, RecapRequest};
pub use prompts::{
    format_merge_input, format_user_content, system_prompt, SITE_MERGE_PROMPT, SITE_PROMPT,
    VIDEO_PROMPT, WEB_PROMPT,
};
pub use summarize::{summarize_item, summarize_site, summarize_with_timeout};
