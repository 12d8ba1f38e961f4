//! Orchestrator integration tests.
//!
//! These verify the run and discuss flows over mock collaborators:
//! 1. Active-tab runs and the no-input error
//! 2. Viewer URLs mapping back to their original source
//! 3. Forced reruns bypassing the cache
//! 4. Discussion target resolution (slug, URL, latest)

use chrono::{Duration, Utc};
use recap::testing::{MockBrowser, MockFetcher, MockSession, MockSummarizer};
use recap::{
    ArtifactBundle, ArtifactMeta, ArtifactStore, ContentItem, ContentKind, MemoryStore, Recap,
    RecapConfig, RecapError, RecapRequest, Tab,
};

type TestRecap = Recap<MemoryStore, MockSummarizer, MockFetcher, MockBrowser>;

fn setup(browser: MockBrowser, summarizer: MockSummarizer) -> TestRecap {
    let config = RecapConfig::new("/tmp/recap-test").with_viewer_base_url("http://localhost:8484");
    Recap::new(config, MemoryStore::new(), summarizer, MockFetcher::new()).with_browser(browser)
}

fn blog_browser() -> MockBrowser {
    MockBrowser::new()
        .with_tab(Tab::new("t1", "Caching Notes", "https://blog.example/caching"))
        .with_page("t1", "Caching Notes", "Notes on read-through caches and their failure modes.")
}

/// Store a web artifact directly, dated `days_ago` days back.
async fn store_artifact(store: &MemoryStore, slug: &str, url: &str, days_ago: i64) {
    let item = ContentItem::web(url, url, slug, format!("content of {slug}"));
    let bundle = ArtifactBundle {
        meta: ArtifactMeta::for_item(slug, &item)
            .with_created_at(Utc::now() - Duration::days(days_ago)),
        content: item.raw_text(),
        summary: format!("summary of {slug}"),
    };
    store.save(&bundle).await.unwrap();
}

#[tokio::test]
async fn test_run_uses_active_tab_without_url() {
    let browser = blog_browser();
    let summarizer = MockSummarizer::new();
    let recap = setup(browser.clone(), summarizer.clone());

    let outcome = recap.run(RecapRequest::active_tab()).await.unwrap();

    assert_eq!(outcome.kind, ContentKind::Web);
    assert_eq!(outcome.title, "Caching Notes");
    assert!(outcome.slug.ends_with("-caching-notes"));
    assert!(browser.opened_urls().is_empty());

    let calls = summarizer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].meta.url, "https://blog.example/caching");

    let meta = recap.store().get_meta(&outcome.slug).await.unwrap().unwrap();
    assert_eq!(meta.canonical_key, "https://blog.example/caching");
}

#[tokio::test]
async fn test_run_without_url_or_browser_is_no_input() {
    let recap: TestRecap = Recap::new(
        RecapConfig::default(),
        MemoryStore::new(),
        MockSummarizer::new(),
        MockFetcher::new(),
    );

    let err = recap.run(RecapRequest::active_tab()).await.unwrap_err();
    assert!(matches!(err, RecapError::NoInput));
}

#[tokio::test]
async fn test_web_url_without_browser_fails_extraction() {
    let recap: TestRecap = Recap::new(
        RecapConfig::default(),
        MemoryStore::new(),
        MockSummarizer::new(),
        MockFetcher::new(),
    );

    let err = recap
        .run(RecapRequest::url("https://blog.example/caching"))
        .await
        .unwrap_err();
    assert!(matches!(err, RecapError::Extraction(_)), "{err:?}");
    assert_eq!(recap.store().artifact_count(), 0);
}

#[tokio::test]
async fn test_viewer_url_resolves_to_original_source() {
    let summarizer = MockSummarizer::new();
    let recap = setup(blog_browser(), summarizer.clone());
    store_artifact(recap.store(), "2024-05-01-caching-notes", "https://blog.example/caching", 1)
        .await;

    let outcome = recap
        .run(RecapRequest::url(
            "http://localhost:8484/2024-05-01-caching-notes.html#summary",
        ))
        .await
        .unwrap();

    assert!(outcome.cached);
    assert_eq!(outcome.slug, "2024-05-01-caching-notes");
    assert!(summarizer.calls().is_empty());
}

#[tokio::test]
async fn test_viewer_tab_is_not_extracted() {
    // the active tab shows a stored summary; the run must key on its source
    let browser = MockBrowser::new()
        .with_tab(Tab::new(
            "viewer",
            "Caching Notes - recap",
            "http://localhost:8484/2024-05-01-caching-notes.html",
        ))
        .with_page("viewer", "Caching Notes - recap", "the rendered summary");
    let summarizer = MockSummarizer::new();
    let recap = setup(browser.clone(), summarizer.clone());
    store_artifact(recap.store(), "2024-05-01-caching-notes", "https://blog.example/caching", 1)
        .await;

    let outcome = recap.run(RecapRequest::active_tab()).await.unwrap();

    assert!(outcome.cached);
    assert_eq!(outcome.summary, "summary of 2024-05-01-caching-notes");
    assert!(browser.evaluations().is_empty());
}

#[tokio::test]
async fn test_local_file_viewer_tab_resolves_to_source() {
    // rendered artifacts live under file://<storage root>/html/
    let browser = MockBrowser::new()
        .with_tab(Tab::new(
            "viewer",
            "Caching Notes - recap",
            "file:///tmp/recap-test/html/2024-05-01-caching-notes.html",
        ))
        .with_tab(Tab::new("other", "Other", "https://other.example/page"))
        .with_page("other", "Other", "An unrelated page open in the background.");
    let summarizer = MockSummarizer::new();
    let recap = setup(browser.clone(), summarizer.clone());
    store_artifact(recap.store(), "2024-05-01-caching-notes", "https://blog.example/caching", 1)
        .await;

    let outcome = recap.run(RecapRequest::active_tab()).await.unwrap();

    assert!(outcome.cached);
    assert_eq!(outcome.slug, "2024-05-01-caching-notes");
    assert!(summarizer.calls().is_empty());
    assert!(browser.evaluations().is_empty());
}

#[tokio::test]
async fn test_force_rerun_summarizes_again() {
    let summarizer = MockSummarizer::new();
    let recap = setup(blog_browser(), summarizer.clone());
    let request = RecapRequest::url("https://blog.example/caching");

    recap.run(request.clone()).await.unwrap();
    let cached = recap.run(request.clone()).await.unwrap();
    assert!(cached.cached);
    assert_eq!(summarizer.calls().len(), 1);

    let forced = recap.run(request.force()).await.unwrap();
    assert!(!forced.cached);
    assert_eq!(summarizer.calls().len(), 2);
}

#[tokio::test]
async fn test_site_and_page_of_same_url_cache_separately() {
    let fetcher = MockFetcher::new()
        .with_status("https://blog.example/sitemap.xml", 404)
        .with_page(
            "https://blog.example",
            "<html><head><title>Blog</title></head><body><p>A blog about storage engines, \
             caches, queues, consensus protocols and the many ways each of them can fail \
             when the network partitions at the worst possible moment.</p></body></html>",
        );
    let summarizer = MockSummarizer::new();
    let recap = Recap::new(
        RecapConfig::default(),
        MemoryStore::new(),
        summarizer.clone(),
        fetcher,
    )
    .with_browser(blog_browser());

    let page = recap
        .run(RecapRequest::url("https://blog.example/caching"))
        .await
        .unwrap();
    let site = recap
        .run(RecapRequest::url("https://blog.example/caching").whole_site())
        .await
        .unwrap();

    assert_eq!(page.kind, ContentKind::Web);
    assert_eq!(site.kind, ContentKind::Site);
    assert!(!site.cached);
    assert_eq!(recap.store().artifact_count(), 2);
}

#[tokio::test]
async fn test_discuss_by_slug() {
    let session = MockSession::new();
    let recap = setup(blog_browser(), MockSummarizer::new());
    store_artifact(recap.store(), "2024-05-01-first", "https://a.example/one", 2).await;
    store_artifact(recap.store(), "2024-05-02-second", "https://a.example/two", 1).await;

    let meta = recap
        .discuss(&session, Some("2024-05-01-first"), None)
        .await
        .unwrap();

    assert_eq!(meta.slug, "2024-05-01-first");
    assert_eq!(
        session.started(),
        vec![("2024-05-01-first".to_string(), "content of 2024-05-01-first".to_string())]
    );
}

#[tokio::test]
async fn test_discuss_by_url_normalizes() {
    let session = MockSession::new();
    let recap = setup(blog_browser(), MockSummarizer::new());
    store_artifact(recap.store(), "2024-05-01-first", "https://a.example/one", 2).await;
    store_artifact(recap.store(), "2024-05-02-second", "https://a.example/two", 1).await;

    let meta = recap
        .discuss(&session, None, Some("https://a.example/one/#intro"))
        .await
        .unwrap();
    assert_eq!(meta.slug, "2024-05-01-first");
}

#[tokio::test]
async fn test_discuss_defaults_to_latest() {
    let session = MockSession::new();
    let recap = setup(blog_browser(), MockSummarizer::new());
    store_artifact(recap.store(), "2024-05-02-second", "https://a.example/two", 1).await;
    store_artifact(recap.store(), "2024-05-01-first", "https://a.example/one", 2).await;

    let meta = recap.discuss(&session, None, None).await.unwrap();
    assert_eq!(meta.slug, "2024-05-02-second");
}

#[tokio::test]
async fn test_discuss_not_found() {
    let session = MockSession::new();
    let recap = setup(blog_browser(), MockSummarizer::new());

    let err = recap.discuss(&session, None, None).await.unwrap_err();
    assert!(matches!(err, RecapError::ArtifactNotFound(None)));

    let err = recap
        .discuss(&session, Some("2020-01-01-missing"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RecapError::ArtifactNotFound(Some(_))));

    let err = recap
        .discuss(&session, None, Some("https://nowhere.example/"))
        .await
        .unwrap_err();
    assert!(matches!(err, RecapError::ArtifactNotFound(Some(_))));
    assert!(session.started().is_empty());
}
