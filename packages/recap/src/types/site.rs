//! Site types - crawled pages and the chunks they are summarized in.

use serde::{Deserialize, Serialize};

use crate::types::content::count_words;

/// One page of a crawled site, after boilerplate removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitePage {
    pub page_url: String,
    pub title: String,
    pub text: String,
    pub word_count: usize,
}

impl SitePage {
    /// Create a page, counting its words.
    pub fn new(
        page_url: impl Into<String>,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        let text = text.into();
        Self {
            page_url: page_url.into(),
            title: title.into(),
            word_count: count_words(&text),
            text,
        }
    }

    /// Replace the text, recounting words.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self.word_count = count_words(&self.text);
        self
    }

    /// Render the page as a block for the summarizer.
    pub fn render(&self) -> String {
        format!("## {}\nURL: {}\n\n{}", self.title, self.page_url, self.text)
    }
}

/// A whole site: its origin, a title and the pages that survived filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteContent {
    /// `scheme://host` of the site
    pub root_url: String,
    pub title: String,
    pub pages: Vec<SitePage>,
    pub total_words: usize,
}

impl SiteContent {
    pub fn new(root_url: impl Into<String>, title: impl Into<String>, pages: Vec<SitePage>) -> Self {
        let total_words = pages.iter().map(|p| p.word_count).sum();
        Self {
            root_url: root_url.into(),
            title: title.into(),
            pages,
            total_words,
        }
    }

    /// All pages rendered in order, separated by rules.
    pub fn combined_text(&self) -> String {
        render_pages(&self.pages)
    }
}

/// Render a run of pages the way they are fed to the summarizer.
pub fn render_pages(pages: &[SitePage]) -> String {
    pages
        .iter()
        .map(SitePage::render)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

/// A contiguous run of a site's pages sized to fit the context budget.
///
/// Chunks borrow from the site; they live only for one summarization run.
#[derive(Debug, Clone, Copy)]
pub struct SummaryChunk<'a> {
    pub pages: &'a [SitePage],
    pub word_count: usize,
}

impl<'a> SummaryChunk<'a> {
    pub fn new(pages: &'a [SitePage]) -> Self {
        Self {
            pages,
            word_count: pages.iter().map(|p| p.word_count).sum(),
        }
    }

    pub fn render(&self) -> String {
        render_pages(self.pages)
    }
}
