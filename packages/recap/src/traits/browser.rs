//! Browser control trait - the live browser as an opaque RPC surface.
//!
//! Recap never speaks the wire protocol directly outside of
//! [`crate::browser`]; the page extractor only needs to list tabs, open a
//! tab and evaluate a read-only expression in one.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ExtractionResult;

/// An open browser tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: String,
    pub title: String,
    pub url: String,
}

impl Tab {
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            url: url.into(),
        }
    }

    /// Still on its initial blank page.
    pub fn is_blank(&self) -> bool {
        self.url.is_empty() || self.url == "about:blank"
    }

    /// Showing an ordinary web page.
    pub fn is_web_page(&self) -> bool {
        self.url.starts_with("http://") || self.url.starts_with("https://")
    }

    /// The tab shows `url`, or a prefix of it (trailing query/fragment variation).
    pub fn matches(&self, url: &str) -> bool {
        !self.is_blank() && (self.url == url || url.starts_with(&self.url))
    }
}

/// Remote browser control.
#[async_trait]
pub trait BrowserControl: Send + Sync {
    /// List open page tabs, most recently active first.
    async fn list_tabs(&self) -> ExtractionResult<Vec<Tab>>;

    /// Evaluate a read-only expression in a tab and return its string value.
    async fn evaluate(&self, tab_id: &str, expression: &str) -> ExtractionResult<String>;

    /// Open a URL in a new background tab. The tab may still be blank on return.
    async fn open_tab(&self, url: &str) -> ExtractionResult<Tab>;
}
