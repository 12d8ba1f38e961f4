//! Summarization - one bounded oracle call per item, map-reduce for large sites.
//!
//! Sites within the context budget are summarized in a single call. Larger
//! sites are partitioned into chunks, every chunk is summarized with the same
//! site prompt and site-level metadata, and the labelled part summaries are
//! merged by a final call with the merge prompt.

use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, info};

use crate::config::RecapConfig;
use crate::error::{SummarizationError, SummarizationResult};
use crate::pipeline::chunk::partition_pages;
use crate::pipeline::prompts::format_merge_input;
use crate::traits::summarizer::{PromptKind, SummaryMeta, Summarizer};
use crate::types::content::{ContentBody, ContentItem};
use crate::types::site::SiteContent;

/// Call the oracle once, bounded by `bound`.
///
/// On timeout the in-flight call is dropped and so cancelled. A blank answer
/// is an error.
pub async fn summarize_with_timeout<A: Summarizer + ?Sized>(
    summarizer: &A,
    content: &str,
    meta: &SummaryMeta,
    bound: Duration,
) -> SummarizationResult<String> {
    let started = Instant::now();
    let summary = tokio::time::timeout(bound, summarizer.summarize(content, meta))
        .await
        .map_err(|_| SummarizationError::Timeout(bound))??;

    debug!(
        kind = ?meta.kind,
        url = %meta.url,
        input_chars = content.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Summarizer call finished"
    );

    let summary = summary.trim();
    if summary.is_empty() {
        return Err(SummarizationError::EmptyResult);
    }
    Ok(summary.to_string())
}

/// Summarize any extracted item, dispatching on its kind.
pub async fn summarize_item<A: Summarizer + ?Sized>(
    summarizer: &A,
    item: &ContentItem,
    config: &RecapConfig,
) -> SummarizationResult<String> {
    let meta = SummaryMeta::new(&item.title, &item.source_url, PromptKind::from(item.kind()));
    match &item.body {
        ContentBody::Site(site) => summarize_site(summarizer, site, config).await,
        ContentBody::Web { text } => {
            summarize_with_timeout(summarizer, text, &meta, config.summarize_timeout()).await
        }
        ContentBody::Video { transcript, .. } => {
            summarize_with_timeout(summarizer, transcript, &meta, config.summarize_timeout()).await
        }
    }
}

/// Summarize a site in one pass or map-reduce style, depending on its size.
pub async fn summarize_site<A: Summarizer + ?Sized>(
    summarizer: &A,
    site: &SiteContent,
    config: &RecapConfig,
) -> SummarizationResult<String> {
    let meta = SummaryMeta::new(&site.title, &site.root_url, PromptKind::Site);
    let bound = config.summarize_timeout();
    let budget = config.context_budget_words;

    if site.total_words <= budget {
        info!(
            root = %site.root_url,
            words = site.total_words,
            budget,
            "Summarizing site in one pass"
        );
        return summarize_with_timeout(summarizer, &site.combined_text(), &meta, bound).await;
    }

    let chunks = partition_pages(&site.pages, budget);
    info!(
        root = %site.root_url,
        words = site.total_words,
        budget,
        chunks = chunks.len(),
        "Site exceeds budget, summarizing in chunks"
    );

    let semaphore = Semaphore::new(config.max_concurrency.max(1));
    let futures = chunks.iter().enumerate().map(|(i, chunk)| {
        let semaphore = &semaphore;
        let meta = &meta;
        async move {
            let _permit = semaphore.acquire().await;
            debug!(chunk = i + 1, pages = chunk.pages.len(), words = chunk.word_count, "Summarizing chunk");
            summarize_with_timeout(summarizer, &chunk.render(), meta, bound).await
        }
    });

    let parts = join_all(futures)
        .await
        .into_iter()
        .collect::<SummarizationResult<Vec<String>>>()?;

    info!(root = %site.root_url, parts = parts.len(), "Merging chunk summaries");
    let merge_meta = meta.with_kind(PromptKind::SiteMerge);
    summarize_with_timeout(summarizer, &format_merge_input(&parts), &merge_meta, bound).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockSummarizer;
    use crate::types::site::SitePage;

    fn site(word_counts: &[usize]) -> SiteContent {
        let pages = word_counts
            .iter()
            .enumerate()
            .map(|(i, &n)| {
                SitePage::new(format!("https://example.com/{i}"), format!("Page {i}"), vec!["word"; n].join(" "))
            })
            .collect();
        SiteContent::new("https://example.com", "Example", pages)
    }

    #[tokio::test]
    async fn test_site_within_budget_is_single_pass() {
        let summarizer = MockSummarizer::new();
        let config = RecapConfig::default().with_budget(100);

        let summary = summarize_site(&summarizer, &site(&[40, 60]), &config).await.unwrap();

        assert!(!summary.is_empty());
        let calls = summarizer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].meta.kind, PromptKind::Site);
        assert!(calls[0].content.contains("URL: https://example.com/1"));
    }

    #[tokio::test]
    async fn test_large_site_is_mapped_then_merged() {
        let summarizer = MockSummarizer::new();
        let config = RecapConfig::default().with_budget(100);

        summarize_site(&summarizer, &site(&[60, 60, 60]), &config).await.unwrap();

        let calls = summarizer.calls();
        let chunk_calls: Vec<_> = calls.iter().filter(|c| c.meta.kind == PromptKind::Site).collect();
        let merge_calls: Vec<_> = calls.iter().filter(|c| c.meta.kind == PromptKind::SiteMerge).collect();
        assert_eq!(chunk_calls.len(), 3);
        assert_eq!(merge_calls.len(), 1);

        // every chunk carries site-level metadata
        for call in &chunk_calls {
            assert_eq!(call.meta.title, "Example");
            assert_eq!(call.meta.url, "https://example.com");
        }
        assert!(merge_calls[0].content.contains("Part 3 of 3"));
        assert!(!merge_calls[0].content.contains("Part 4"));
    }

    #[tokio::test]
    async fn test_timeout() {
        let summarizer = MockSummarizer::new().with_delay(Duration::from_millis(200));
        let meta = SummaryMeta::new("T", "https://a.com", PromptKind::Web);

        let err = summarize_with_timeout(&summarizer, "text", &meta, Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_blank_answer_is_an_error() {
        let summarizer = MockSummarizer::new().with_response("   \n");
        let meta = SummaryMeta::new("T", "https://a.com", PromptKind::Web);

        let err = summarize_with_timeout(&summarizer, "text", &meta, Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizationError::EmptyResult));
    }

    #[tokio::test]
    async fn test_chunk_failure_fails_the_site() {
        let summarizer = MockSummarizer::new().with_failure("rate limited");
        let config = RecapConfig::default().with_budget(100);

        let err = summarize_site(&summarizer, &site(&[60, 60]), &config).await.unwrap_err();
        assert!(matches!(err, SummarizationError::Oracle(_)));
        assert!(summarizer
            .calls()
            .iter()
            .all(|c| c.meta.kind == PromptKind::Site));
    }

    #[tokio::test]
    async fn test_item_prompt_follows_kind() {
        let summarizer = MockSummarizer::new();
        let config = RecapConfig::default();
        let item = ContentItem::web("https://a.com/x", "https://a.com/x", "X", "some text");

        summarize_item(&summarizer, &item, &config).await.unwrap();
        assert_eq!(summarizer.calls()[0].meta.kind, PromptKind::Web);

        summarizer.clear_calls();
        let site_item = ContentItem::site("https://example.com/a", "https://example.com", site(&[30]));
        summarize_item(&summarizer, &site_item, &config).await.unwrap();
        let calls = summarizer.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].meta.kind, PromptKind::Site);
    }
}
