//! Live page extractor - reads rendered text out of the user's browser.
//!
//! Reading from a real browser session means the text includes whatever the
//! user is logged in to see. An already open tab showing the URL is reused;
//! otherwise a background tab is opened and polled until it leaves
//! `about:blank`.

use std::sync::Arc;

use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, info};

use crate::config::BrowserConfig;
use crate::error::{ExtractionError, ExtractionResult};
use crate::extract::html::{collapse_whitespace, PageText};
use crate::traits::browser::{BrowserControl, Tab};

const TEXT_EXPRESSION: &str = "document.body ? document.body.innerText : ''";
const TITLE_EXPRESSION: &str = "document.title";

pub struct LivePageExtractor<B: BrowserControl> {
    browser: Arc<B>,
    config: BrowserConfig,
}

impl<B: BrowserControl> LivePageExtractor<B> {
    pub fn new(browser: Arc<B>, config: BrowserConfig) -> Self {
        Self { browser, config }
    }

    /// The tab the user is looking at: the first one showing a web page.
    pub async fn active_tab(&self) -> ExtractionResult<Tab> {
        self.active_tab_where(|_| false).await
    }

    /// Like [`active_tab`](Self::active_tab), also accepting non-web tabs
    /// that `also_accept` recognizes (local viewer pages).
    pub async fn active_tab_where(
        &self,
        also_accept: impl Fn(&Tab) -> bool,
    ) -> ExtractionResult<Tab> {
        self.browser
            .list_tabs()
            .await?
            .into_iter()
            .find(|tab| tab.is_web_page() || also_accept(tab))
            .ok_or(ExtractionError::NoTabs)
    }

    /// Title and visible text of `url`, reusing an open tab when one matches.
    pub async fn extract(&self, url: &str) -> ExtractionResult<PageText> {
        let tab = match self.find_tab(url).await? {
            Some(tab) => {
                debug!(tab_id = %tab.id, url = %url, "Reusing open tab");
                tab
            }
            None => self.open_and_wait(url).await?,
        };
        self.extract_from_tab(&tab).await
    }

    /// Title and visible text of an already loaded tab.
    pub async fn extract_from_tab(&self, tab: &Tab) -> ExtractionResult<PageText> {
        let text = self.evaluate(&tab.id, TEXT_EXPRESSION).await?;
        let title = self.evaluate(&tab.id, TITLE_EXPRESSION).await?;

        let title = [title.trim(), tab.title.trim(), tab.url.as_str()]
            .into_iter()
            .find(|t| !t.is_empty())
            .unwrap_or("Untitled")
            .to_string();
        let text = collapse_whitespace(&text);

        info!(tab_id = %tab.id, title = %title, chars = text.len(), "Read page text");
        Ok(PageText { title, text })
    }

    async fn find_tab(&self, url: &str) -> ExtractionResult<Option<Tab>> {
        Ok(self
            .browser
            .list_tabs()
            .await?
            .into_iter()
            .find(|tab| tab.matches(url)))
    }

    async fn open_and_wait(&self, url: &str) -> ExtractionResult<Tab> {
        let opened = self.browser.open_tab(url).await?;
        info!(tab_id = %opened.id, url = %url, "Opened background tab");

        let deadline = Instant::now() + self.config.open_timeout();
        loop {
            let loaded = self
                .browser
                .list_tabs()
                .await?
                .into_iter()
                .find(|tab| tab.id == opened.id && !tab.is_blank());
            if let Some(tab) = loaded {
                // let client-side rendering finish
                sleep(self.config.settle_delay()).await;
                return Ok(tab);
            }
            if Instant::now() >= deadline {
                return Err(ExtractionError::TabOpenTimeout(
                    self.config.open_timeout(),
                    url.to_string(),
                ));
            }
            sleep(self.config.poll_interval()).await;
        }
    }

    async fn evaluate(&self, tab_id: &str, expression: &str) -> ExtractionResult<String> {
        let bound = self.config.eval_timeout();
        timeout(bound, self.browser.evaluate(tab_id, expression))
            .await
            .map_err(|_| ExtractionError::EvalTimeout(bound))?
    }
}
