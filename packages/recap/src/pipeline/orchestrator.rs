//! The recap orchestrator.
//!
//! ```text
//! ResolveIdentity -> CheckCache [hit: Done] -> Extract -> Summarize -> Persist -> Done
//! ```
//!
//! Discuss mode skips extraction entirely: it resolves a stored artifact
//! (explicit slug, then by URL, then most recent) and hands it to a
//! [`DiscussionSession`].

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::RecapConfig;
use crate::error::{ExtractionError, IdentityError, RecapError, Result};
use crate::extract::{CaptionExtractor, LivePageExtractor, SiteCrawler};
use crate::identity::{make_slug, normalize, video_id, ViewerUrls};
use crate::pipeline::cache::{find_by_url, find_cached};
use crate::pipeline::summarize::summarize_item;
use crate::traits::browser::{BrowserControl, Tab};
use crate::traits::fetcher::Fetcher;
use crate::traits::session::DiscussionSession;
use crate::traits::store::ArtifactStore;
use crate::traits::summarizer::Summarizer;
use crate::types::artifact::{ArtifactBundle, ArtifactMeta, CachedArtifact};
use crate::types::content::{ContentItem, ContentKind};

/// One summarize invocation.
#[derive(Debug, Clone, Default)]
pub struct RecapRequest {
    /// Source URL; `None` means the browser's active tab
    pub url: Option<String>,
    pub whole_site: bool,
    /// Skip the cache check and summarize again
    pub force: bool,
}

impl RecapRequest {
    pub fn url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn active_tab() -> Self {
        Self::default()
    }

    pub fn whole_site(mut self) -> Self {
        self.whole_site = true;
        self
    }

    pub fn force(mut self) -> Self {
        self.force = true;
        self
    }
}

/// What a run produced, fresh or from the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecapOutcome {
    pub slug: String,
    pub title: String,
    pub summary: String,
    pub kind: ContentKind,
    pub cached: bool,
}

impl From<CachedArtifact> for RecapOutcome {
    fn from(hit: CachedArtifact) -> Self {
        Self {
            slug: hit.slug,
            title: hit.title,
            summary: hit.summary_text,
            kind: hit.kind,
            cached: true,
        }
    }
}

/// Wires the extractors, summarizer and store together.
pub struct Recap<S, A, F, B>
where
    S: ArtifactStore,
    A: Summarizer,
    F: Fetcher,
    B: BrowserControl,
{
    config: RecapConfig,
    store: Arc<S>,
    summarizer: Arc<A>,
    fetcher: Arc<F>,
    browser: Option<Arc<B>>,
    viewer: ViewerUrls,
}

impl<S, A, F, B> Recap<S, A, F, B>
where
    S: ArtifactStore,
    A: Summarizer,
    F: Fetcher,
    B: BrowserControl,
{
    pub fn new(config: RecapConfig, store: S, summarizer: A, fetcher: F) -> Self {
        let mut viewer = ViewerUrls::new().with_prefix(format!(
            "file://{}/html",
            config.storage_root.display()
        ));
        if let Some(base) = &config.viewer_base_url {
            viewer = viewer.with_prefix(base.clone());
        }

        Self {
            config,
            store: Arc::new(store),
            summarizer: Arc::new(summarizer),
            fetcher: Arc::new(fetcher),
            browser: None,
            viewer,
        }
    }

    /// Enable live page extraction and active-tab resolution.
    pub fn with_browser(mut self, browser: B) -> Self {
        self.browser = Some(Arc::new(browser));
        self
    }

    pub fn config(&self) -> &RecapConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Summarize a URL, or the active tab, returning a cached summary when one exists.
    pub async fn run(&self, request: RecapRequest) -> Result<RecapOutcome> {
        let (requested, tab) = match request.url {
            Some(url) => (url, None),
            None => {
                let extractor = self.page_extractor().ok_or(RecapError::NoInput)?;
                let tab = extractor
                    .active_tab_where(|tab| self.viewer.slug_for(&tab.url).is_some())
                    .await?;
                info!(url = %tab.url, title = %tab.title, "Using active tab");
                (tab.url.clone(), Some(tab))
            }
        };

        let source_url = self.resolve_source(&requested).await?;
        // a rewritten viewer URL no longer describes the tab's page
        let tab = tab.filter(|_| source_url == requested);

        let (kind, key) = normalize(&source_url, request.whole_site)?;
        info!(url = %source_url, kind = %kind, key = %key, "Resolved identity");

        if request.force {
            debug!(key = %key, "Forced run, skipping cache");
        } else if let Some(hit) = find_cached(self.store.as_ref(), &key, Some(kind)).await? {
            info!(slug = %hit.slug, key = %key, "Cache hit");
            return Ok(hit.into());
        } else {
            debug!(key = %key, "Cache miss");
        }

        let item = self.extract(&source_url, kind, key, tab.as_ref()).await?;
        info!(
            kind = %item.kind(),
            title = %item.title,
            words = item.word_count,
            "Extracted content"
        );

        let summary = summarize_item(self.summarizer.as_ref(), &item, &self.config).await?;

        let slug = make_slug(&item.title, Utc::now().date_naive(), self.config.slug_max_len);
        let bundle = ArtifactBundle {
            meta: ArtifactMeta::for_item(&slug, &item),
            content: item.raw_text(),
            summary,
        };
        self.store.save(&bundle).await?;
        info!(slug = %slug, "Persisted artifact");

        Ok(RecapOutcome {
            slug,
            title: bundle.meta.title,
            summary: bundle.summary,
            kind: bundle.meta.kind,
            cached: false,
        })
    }

    /// Hand a stored artifact to a discussion session.
    ///
    /// Resolution order: explicit slug, artifact made from `url`, most recent.
    pub async fn discuss<D: DiscussionSession + ?Sized>(
        &self,
        session: &D,
        slug: Option<&str>,
        url: Option<&str>,
    ) -> Result<ArtifactMeta> {
        let meta = match (slug, url) {
            (Some(slug), _) => self
                .store
                .get_meta(slug)
                .await?
                .ok_or_else(|| RecapError::ArtifactNotFound(Some(slug.to_string())))?,
            (None, Some(url)) => {
                let source_url = self.resolve_source(url).await?;
                find_by_url(self.store.as_ref(), &source_url)
                    .await?
                    .ok_or_else(|| RecapError::ArtifactNotFound(Some(url.to_string())))?
            }
            (None, None) => self
                .store
                .latest()
                .await?
                .ok_or(RecapError::ArtifactNotFound(None))?,
        };

        let content = self
            .store
            .get_content(&meta.slug)
            .await?
            .ok_or_else(|| RecapError::ArtifactNotFound(Some(meta.slug.clone())))?;

        info!(slug = %meta.slug, title = %meta.title, "Starting discussion");
        session.start(&meta, &content).await?;
        Ok(meta)
    }

    /// Map a URL into this tool's own rendered output back to its original source.
    async fn resolve_source(&self, url: &str) -> Result<String> {
        let Some(slug) = self.viewer.slug_for(url) else {
            return Ok(url.to_string());
        };
        match self.store.get_meta(&slug).await? {
            Some(meta) => {
                info!(slug = %slug, source = %meta.source_url, "Viewer URL resolved to original source");
                Ok(meta.source_url)
            }
            None => {
                debug!(slug = %slug, "Viewer URL has no stored artifact");
                Ok(url.to_string())
            }
        }
    }

    async fn extract(
        &self,
        url: &str,
        kind: ContentKind,
        key: String,
        tab: Option<&Tab>,
    ) -> Result<ContentItem> {
        match kind {
            ContentKind::Video => {
                let id = video_id(url).ok_or_else(|| IdentityError::NoVideoId {
                    url: url.to_string(),
                })?;
                let extractor = CaptionExtractor::new(self.fetcher.clone(), self.config.video.clone());
                let transcript = extractor.fetch_captions(&id).await?;
                Ok(ContentItem::video(url, key, id, transcript))
            }
            ContentKind::Web => {
                let extractor = self
                    .page_extractor()
                    .ok_or_else(|| ExtractionError::Browser("no browser configured".to_string()))?;
                let page = match tab {
                    Some(tab) => extractor.extract_from_tab(tab).await?,
                    None => extractor.extract(url).await?,
                };
                Ok(ContentItem::web(url, key, page.title, page.text))
            }
            ContentKind::Site => {
                let crawler = SiteCrawler::new(self.fetcher.clone(), &self.config);
                let site = crawler.crawl(url).await?;
                Ok(ContentItem::site(url, key, site))
            }
        }
    }

    fn page_extractor(&self) -> Option<LivePageExtractor<B>> {
        self.browser
            .clone()
            .map(|browser| LivePageExtractor::new(browser, self.config.browser.clone()))
    }
}
