//! Site crawler - every page of an origin, with shared boilerplate removed.
//!
//! Discovery is one level deep: the sitemap at `/sitemap.xml` when it answers
//! with entries, otherwise the same-origin links on the root page. Pages are
//! fetched in parallel under a concurrency bound and come back in discovery
//! order.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::RecapConfig;
use crate::error::{ExtractionError, ExtractionResult, FetchResult, IdentityError};
use crate::extract::boilerplate::{BoilerplateFilter, WindowFrequencyFilter};
use crate::extract::html::{extract_links, extract_page, parse_sitemap, strip_trailing_slash, PageText};
use crate::identity::site_root;
use crate::traits::fetcher::Fetcher;
use crate::types::site::{SiteContent, SitePage};

pub struct SiteCrawler<F: Fetcher> {
    fetcher: Arc<F>,
    filter: Box<dyn BoilerplateFilter>,
    max_concurrency: usize,
    min_page_words: usize,
    skip_failed_pages: bool,
}

impl<F: Fetcher> SiteCrawler<F> {
    pub fn new(fetcher: Arc<F>, config: &RecapConfig) -> Self {
        Self {
            fetcher,
            filter: Box::new(WindowFrequencyFilter::from_config(&config.boilerplate)),
            max_concurrency: config.max_concurrency.max(1),
            min_page_words: config.min_page_words,
            skip_failed_pages: config.skip_failed_pages,
        }
    }

    /// Replace the boilerplate policy.
    pub fn with_filter(mut self, filter: impl BoilerplateFilter + 'static) -> Self {
        self.filter = Box::new(filter);
        self
    }

    /// Crawl the site `url` belongs to.
    pub async fn crawl(&self, url: &str) -> ExtractionResult<SiteContent> {
        let root = site_root(url)?;
        let (urls, root_html) = self.discover(&root).await?;
        if urls.is_empty() {
            return Err(ExtractionError::NoPagesFound { root_url: root });
        }
        info!(root = %root, pages = urls.len(), "Discovered site pages");

        let prefetched = root_html.as_deref().map(|html| (root.as_str(), html));
        let fetched = self.fetch_pages(&urls, prefetched).await?;

        let texts: Vec<String> = fetched.iter().map(|(_, page)| page.text.clone()).collect();
        let cleaned = self.filter.strip(&texts);

        let pages: Vec<SitePage> = fetched
            .into_iter()
            .zip(cleaned)
            .map(|((page_url, page), text)| SitePage::new(page_url, page.title, text))
            .filter(|page| page.word_count > self.min_page_words)
            .collect();

        if pages.is_empty() {
            return Err(ExtractionError::NoContent {
                root_url: root,
                min_words: self.min_page_words,
            });
        }

        let title = pages
            .iter()
            .find(|page| strip_trailing_slash(&page.page_url) == root)
            .map(|page| page.title.clone())
            .unwrap_or_else(|| host_of(&root));

        let site = SiteContent::new(root, title, pages);
        info!(
            root = %site.root_url,
            pages = site.pages.len(),
            words = site.total_words,
            "Site crawled"
        );
        Ok(site)
    }

    /// Sitemap entries, else root plus the links found on it.
    ///
    /// When the root had to be fetched for its links, its HTML comes back too.
    async fn discover(&self, root: &str) -> ExtractionResult<(Vec<String>, Option<String>)> {
        let sitemap_url = format!("{root}/sitemap.xml");
        match self.fetcher.get(&sitemap_url).await {
            Ok(response) if response.is_success() => {
                let urls = same_origin(root, parse_sitemap(&response.body));
                if !urls.is_empty() {
                    debug!(root = %root, count = urls.len(), "Using sitemap");
                    return Ok((urls, None));
                }
                debug!(root = %root, "Sitemap has no usable entries, crawling root");
            }
            Ok(response) => {
                debug!(root = %root, status = response.status, "No sitemap, crawling root");
            }
            Err(e) => {
                debug!(root = %root, error = %e, "Sitemap fetch failed, crawling root");
            }
        }

        let base = Url::parse(root).map_err(|_| IdentityError::InvalidUrl {
            url: root.to_string(),
        })?;
        let html = self.fetcher.get_text(root).await?;

        let mut urls = vec![root.to_string()];
        urls.extend(
            extract_links(&html, &base)
                .into_iter()
                .filter(|link| link != root),
        );
        Ok((urls, Some(html)))
    }

    async fn fetch_pages(
        &self,
        urls: &[String],
        prefetched: Option<(&str, &str)>,
    ) -> ExtractionResult<Vec<(String, PageText)>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));

        let futures = urls.iter().map(|url| {
            let semaphore = semaphore.clone();
            async move {
                if let Some((_, html)) = prefetched.filter(|(known, _)| *known == url.as_str()) {
                    return (url.clone(), Ok(extract_page(html)));
                }
                let _permit = semaphore.acquire().await;
                (url.clone(), self.fetch_page(url).await)
            }
        });

        let mut pages = Vec::with_capacity(urls.len());
        for (url, result) in join_all(futures).await {
            match result {
                Ok(page) => pages.push((url, page)),
                Err(e) if self.skip_failed_pages => {
                    warn!(url = %url, error = %e, "Skipping page that failed to fetch");
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(pages)
    }

    async fn fetch_page(&self, url: &str) -> FetchResult<PageText> {
        let html = self.fetcher.get_text(url).await?;
        Ok(extract_page(&html))
    }
}

/// Keep sitemap entries on the crawled origin, normalized and deduplicated.
fn same_origin(root: &str, entries: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    entries
        .into_iter()
        .filter(|entry| site_root(entry).map(|r| r == root).unwrap_or(false))
        .map(|entry| {
            let entry = entry.split('#').next().unwrap_or(&entry).to_string();
            strip_trailing_slash(&entry).to_string()
        })
        .filter(|entry| seen.insert(entry.clone()))
        .collect()
}

fn host_of(root: &str) -> String {
    Url::parse(root)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| root.to_string())
}
