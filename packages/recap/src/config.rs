//! Configuration for the recap pipeline.
//!
//! Every component that touches storage, the network or the summarizer
//! receives its settings from a [`RecapConfig`] value. Nothing in the library
//! reads process environment or the home directory on its own.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecapConfig {
    /// Root directory for persisted artifacts.
    pub storage_root: PathBuf,

    /// Word budget for a single summarization call.
    ///
    /// Sites above this are summarized map-reduce style. Default: 60,000.
    pub context_budget_words: usize,

    /// Pages must have strictly more words than this to be summarized.
    ///
    /// Default: 20.
    pub min_page_words: usize,

    /// Maximum simultaneous page fetches or chunk summaries.
    ///
    /// Default: 8.
    pub max_concurrency: usize,

    /// Bound on each summarizer call, in milliseconds. Default: 5 minutes.
    pub summarize_timeout_ms: u64,

    /// Skip site pages that fail to fetch instead of failing the whole site.
    ///
    /// Default: true.
    pub skip_failed_pages: bool,

    /// Maximum length of the title part of a slug. Default: 60.
    pub slug_max_len: usize,

    /// Extra URL prefix under which rendered artifacts are served.
    ///
    /// `file://<storage_root>/html/` is always recognized.
    #[serde(default)]
    pub viewer_base_url: Option<String>,

    #[serde(default)]
    pub boilerplate: BoilerplateConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub video: VideoConfig,
}

impl Default for RecapConfig {
    fn default() -> Self {
        Self {
            storage_root: PathBuf::from(".recap"),
            context_budget_words: 60_000,
            min_page_words: 20,
            max_concurrency: 8,
            summarize_timeout_ms: 300_000,
            skip_failed_pages: true,
            slug_max_len: 60,
            viewer_base_url: None,
            boilerplate: BoilerplateConfig::default(),
            browser: BrowserConfig::default(),
            video: VideoConfig::default(),
        }
    }
}

impl RecapConfig {
    /// Create a config rooted at the given storage directory.
    pub fn new(storage_root: impl Into<PathBuf>) -> Self {
        Self {
            storage_root: storage_root.into(),
            ..Default::default()
        }
    }

    /// Set the context budget.
    pub fn with_budget(mut self, words: usize) -> Self {
        self.context_budget_words = words;
        self
    }

    /// Set the fan-out bound.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency.max(1);
        self
    }

    /// Set the summarizer timeout.
    pub fn with_summarize_timeout(mut self, timeout: Duration) -> Self {
        self.summarize_timeout_ms = (timeout.as_millis() as u64).max(1);
        self
    }

    /// Fail the whole site when any page fails to fetch.
    pub fn fail_on_page_error(mut self) -> Self {
        self.skip_failed_pages = false;
        self
    }

    /// Set the viewer base URL.
    pub fn with_viewer_base_url(mut self, url: impl Into<String>) -> Self {
        self.viewer_base_url = Some(url.into());
        self
    }

    /// Set the browser config.
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    pub fn summarize_timeout(&self) -> Duration {
        Duration::from_millis(self.summarize_timeout_ms)
    }
}

/// Cross-page boilerplate detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoilerplateConfig {
    /// Sliding window size in words. Default: 8.
    pub window_words: usize,

    /// Share of pages a window must appear in to count as boilerplate.
    ///
    /// Default: 0.8.
    pub min_share: f64,

    /// Below this many pages, nothing is stripped. Default: 3.
    pub min_pages: usize,
}

impl Default for BoilerplateConfig {
    fn default() -> Self {
        Self {
            window_words: 8,
            min_share: 0.8,
            min_pages: 3,
        }
    }
}

/// Browser control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// DevTools HTTP endpoint.
    pub endpoint: String,

    pub eval_timeout_ms: u64,

    /// Ceiling on waiting for a freshly opened tab to load.
    pub open_timeout_ms: u64,

    pub poll_interval_ms: u64,

    /// Extra wait after a new tab loads, before reading its text.
    pub settle_delay_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:9222".to_string(),
            eval_timeout_ms: 10_000,
            open_timeout_ms: 15_000,
            poll_interval_ms: 500,
            settle_delay_ms: 1_500,
        }
    }
}

impl BrowserConfig {
    /// Use a different DevTools endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Shrink every wait to the given number of milliseconds (tests).
    pub fn with_fast_timings(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self.settle_delay_ms = ms;
        self
    }

    pub fn eval_timeout(&self) -> Duration {
        Duration::from_millis(self.eval_timeout_ms)
    }

    pub fn open_timeout(&self) -> Duration {
        Duration::from_millis(self.open_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

/// Video caption endpoint settings and the mobile client identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoConfig {
    /// Watch page base, the video id is appended.
    pub watch_base: String,

    /// Player endpoint, `?key=<api key>` is appended.
    pub player_endpoint: String,

    pub client_name: String,
    pub client_version: String,
    pub android_sdk_version: u32,

    /// Interface language sent with the player request.
    pub language: String,
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            watch_base: "https://www.youtube.com/watch?v=".to_string(),
            player_endpoint: "https://www.youtube.com/youtubei/v1/player".to_string(),
            client_name: "ANDROID".to_string(),
            client_version: "19.09.37".to_string(),
            android_sdk_version: 30,
            language: "en".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RecapConfig::default();
        assert_eq!(config.context_budget_words, 60_000);
        assert_eq!(config.min_page_words, 20);
        assert_eq!(config.boilerplate.window_words, 8);
        assert_eq!(config.boilerplate.min_pages, 3);
        assert!(config.skip_failed_pages);
    }

    #[test]
    fn test_builder() {
        let config = RecapConfig::new("/tmp/recap")
            .with_budget(100)
            .with_concurrency(0)
            .with_summarize_timeout(Duration::from_secs(5))
            .fail_on_page_error();

        assert_eq!(config.storage_root, PathBuf::from("/tmp/recap"));
        assert_eq!(config.context_budget_words, 100);
        assert_eq!(config.max_concurrency, 1);
        assert_eq!(config.summarize_timeout(), Duration::from_secs(5));
        assert!(!config.skip_failed_pages);
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{
            "storage_root": "/data",
            "context_budget_words": 1000,
            "min_page_words": 5,
            "max_concurrency": 2,
            "summarize_timeout_ms": 10000,
            "skip_failed_pages": false,
            "slug_max_len": 40
        }"#;
        let config: RecapConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.context_budget_words, 1000);
        assert_eq!(config.browser.open_timeout_ms, 15_000);
        assert_eq!(config.video.client_name, "ANDROID");
    }
}
