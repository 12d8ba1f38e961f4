//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the recap library
//! without making real network, browser or model calls. Every mock is
//! `Clone` and shares its state, so a test can keep a handle for assertions
//! after moving one into a [`Recap`](crate::pipeline::Recap).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{
    ExtractionError, ExtractionResult, FetchError, FetchResult, SessionError, SummarizationError,
    SummarizationResult,
};
use crate::traits::browser::{BrowserControl, Tab};
use crate::traits::fetcher::{Fetcher, HttpResponse};
use crate::traits::session::DiscussionSession;
use crate::traits::summarizer::{PromptKind, SummaryMeta, Summarizer};
use crate::types::artifact::ArtifactMeta;

// ============================================================================
// Fetcher
// ============================================================================

#[derive(Debug, Clone)]
enum CannedResponse {
    Status(u16, String),
    TransportError,
}

/// Record of a request made to the mock fetcher.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFetchCall {
    Get { url: String },
    PostJson { url: String, body: serde_json::Value },
}

impl MockFetchCall {
    pub fn url(&self) -> &str {
        match self {
            MockFetchCall::Get { url } | MockFetchCall::PostJson { url, .. } => url,
        }
    }
}

/// A mock HTTP fetcher answering from a URL table.
///
/// Unregistered URLs answer 404 with an empty body.
#[derive(Clone, Default)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, CannedResponse>>>,
    calls: Arc<RwLock<Vec<MockFetchCall>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with 200 and `body`.
    pub fn with_page(self, url: impl Into<String>, body: impl Into<String>) -> Self {
        self.with_response(url, 200, body)
    }

    /// Answer `url` with `status` and an empty body.
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.with_response(url, status, "")
    }

    pub fn with_response(self, url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), CannedResponse::Status(status, body.into()));
        self
    }

    /// Fail `url` at the transport level.
    pub fn with_transport_error(self, url: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), CannedResponse::TransportError);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn respond(&self, url: &str) -> FetchResult<HttpResponse> {
        match self.responses.read().unwrap().get(url) {
            Some(CannedResponse::Status(status, body)) => Ok(HttpResponse::new(url, *status, body.clone())),
            Some(CannedResponse::TransportError) => Err(FetchError::Transport {
                url: url.to_string(),
                source: "connection refused".into(),
            }),
            None => Ok(HttpResponse::new(url, 404, "")),
        }
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn get(&self, url: &str) -> FetchResult<HttpResponse> {
        self.calls
            .write()
            .unwrap()
            .push(MockFetchCall::Get { url: url.to_string() });
        self.respond(url)
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> FetchResult<HttpResponse> {
        self.calls.write().unwrap().push(MockFetchCall::PostJson {
            url: url.to_string(),
            body: body.clone(),
        });
        self.respond(url)
    }

    fn name(&self) -> &str {
        "mock"
    }
}

// ============================================================================
// Browser
// ============================================================================

#[derive(Default)]
struct BrowserState {
    tabs: Vec<Tab>,
    /// tab id -> (title, text)
    pages: HashMap<String, (String, String)>,
    /// opened tab id -> (polls left while blank, target url)
    loading: HashMap<String, (usize, String)>,
    blank_polls: usize,
    opened: Vec<String>,
    evaluations: Vec<(String, String)>,
    eval_delay: Option<Duration>,
}

/// A mock browser with scripted tabs.
///
/// Opened tabs get ids `new-1`, `new-2`, ... and stay on `about:blank` for
/// the configured number of listings before showing their URL.
#[derive(Clone, Default)]
pub struct MockBrowser {
    state: Arc<RwLock<BrowserState>>,
}

impl MockBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already open tab.
    pub fn with_tab(self, tab: Tab) -> Self {
        self.state.write().unwrap().tabs.push(tab);
        self
    }

    /// Set what `document.title` and the body text evaluate to in a tab.
    pub fn with_page(self, tab_id: impl Into<String>, title: impl Into<String>, text: impl Into<String>) -> Self {
        self.state
            .write()
            .unwrap()
            .pages
            .insert(tab_id.into(), (title.into(), text.into()));
        self
    }

    /// Listings a newly opened tab stays blank for.
    pub fn with_blank_polls(self, polls: usize) -> Self {
        self.state.write().unwrap().blank_polls = polls;
        self
    }

    /// Delay every evaluation.
    pub fn with_eval_delay(self, delay: Duration) -> Self {
        self.state.write().unwrap().eval_delay = Some(delay);
        self
    }

    /// URLs passed to `open_tab`, in order.
    pub fn opened_urls(&self) -> Vec<String> {
        self.state.read().unwrap().opened.clone()
    }

    /// (tab id, expression) of every evaluation, in order.
    pub fn evaluations(&self) -> Vec<(String, String)> {
        self.state.read().unwrap().evaluations.clone()
    }
}

#[async_trait]
impl BrowserControl for MockBrowser {
    async fn list_tabs(&self) -> ExtractionResult<Vec<Tab>> {
        let mut state = self.state.write().unwrap();
        let mut finished = Vec::new();
        for (id, (polls, url)) in state.loading.iter_mut() {
            if *polls == 0 {
                finished.push((id.clone(), url.clone()));
            } else {
                *polls -= 1;
            }
        }
        for (id, url) in finished {
            state.loading.remove(&id);
            if let Some(tab) = state.tabs.iter_mut().find(|t| t.id == id) {
                tab.url = url;
            }
        }
        Ok(state.tabs.clone())
    }

    async fn evaluate(&self, tab_id: &str, expression: &str) -> ExtractionResult<String> {
        let delay = {
            let mut state = self.state.write().unwrap();
            state
                .evaluations
                .push((tab_id.to_string(), expression.to_string()));
            state.eval_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let state = self.state.read().unwrap();
        let (title, text) = state
            .pages
            .get(tab_id)
            .ok_or_else(|| ExtractionError::Browser(format!("no page scripted for tab {tab_id}")))?;
        if expression.contains("document.title") {
            Ok(title.clone())
        } else {
            Ok(text.clone())
        }
    }

    async fn open_tab(&self, url: &str) -> ExtractionResult<Tab> {
        let mut state = self.state.write().unwrap();
        state.opened.push(url.to_string());
        let id = format!("new-{}", state.opened.len());
        let tab = Tab::new(&id, "", "about:blank");
        state.tabs.push(tab.clone());
        let polls = state.blank_polls;
        state.loading.insert(id, (polls, url.to_string()));
        Ok(tab)
    }
}

// ============================================================================
// Summarizer
// ============================================================================

/// Record of a call made to the mock summarizer.
#[derive(Debug, Clone)]
pub struct MockSummarizeCall {
    pub content: String,
    pub meta: SummaryMeta,
}

/// A mock summarizer returning deterministic summaries.
///
/// By default the answer names the prompt kind, the title and the input word
/// count, so distinct calls produce distinct summaries.
#[derive(Clone, Default)]
pub struct MockSummarizer {
    response: Arc<RwLock<Option<String>>>,
    failure: Arc<RwLock<Option<String>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<MockSummarizeCall>>>,
}

impl MockSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every call with `text`.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        *self.response.write().unwrap() = Some(text.into());
        self
    }

    /// Fail every call with an oracle error.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        *self.failure.write().unwrap() = Some(message.into());
        self
    }

    /// Delay every answer.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = Some(delay);
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockSummarizeCall> {
        self.calls.read().unwrap().clone()
    }

    /// Calls made with one prompt kind.
    pub fn calls_of_kind(&self, kind: PromptKind) -> Vec<MockSummarizeCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.meta.kind == kind)
            .collect()
    }

    /// Clear call history.
    pub fn clear_calls(&self) {
        self.calls.write().unwrap().clear();
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, content: &str, meta: &SummaryMeta) -> SummarizationResult<String> {
        self.calls.write().unwrap().push(MockSummarizeCall {
            content: content.to_string(),
            meta: meta.clone(),
        });

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(SummarizationError::Oracle(message));
        }
        if let Some(text) = self.response.read().unwrap().clone() {
            return Ok(text);
        }
        Ok(format!(
            "{:?} summary of {} ({} words)",
            meta.kind,
            meta.title,
            content.split_whitespace().count()
        ))
    }
}

// ============================================================================
// Discussion session
// ============================================================================

/// A mock discussion session recording what it was started with.
#[derive(Clone, Default)]
pub struct MockSession {
    started: Arc<RwLock<Vec<(String, String)>>>,
}

impl MockSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// (slug, content) of every started session.
    pub fn started(&self) -> Vec<(String, String)> {
        self.started.read().unwrap().clone()
    }
}

#[async_trait]
impl DiscussionSession for MockSession {
    async fn start(&self, meta: &ArtifactMeta, content: &str) -> Result<(), SessionError> {
        self.started
            .write()
            .unwrap()
            .push((meta.slug.clone(), content.to_string()));
        Ok(())
    }
}
