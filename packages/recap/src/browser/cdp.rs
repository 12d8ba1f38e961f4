//! Chrome DevTools endpoint client.
//!
//! Tabs are listed and opened over the endpoint's HTTP interface
//! (`/json/list`, `/json/new`). Expressions are evaluated by opening the tab's
//! debugger websocket and sending one `Runtime.evaluate` command.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};
use tracing::debug;

use crate::error::{ExtractionError, ExtractionResult};
use crate::traits::browser::{BrowserControl, Tab};

const EVALUATE_ID: u64 = 1;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TargetInfo {
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(rename = "type", default)]
    kind: String,
    web_socket_debugger_url: Option<String>,
}

impl TargetInfo {
    fn tab(&self) -> Tab {
        Tab::new(&self.id, &self.title, &self.url)
    }
}

pub struct CdpBrowser {
    client: reqwest::Client,
    endpoint: String,
}

impl CdpBrowser {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    async fn targets(&self) -> ExtractionResult<Vec<TargetInfo>> {
        let url = format!("{}/json/list", self.endpoint);
        let response = self.client.get(&url).send().await.map_err(browser_error)?;
        let targets: Vec<TargetInfo> = response.json().await.map_err(browser_error)?;
        Ok(targets.into_iter().filter(|t| t.kind == "page").collect())
    }

    async fn debugger_url(&self, tab_id: &str) -> ExtractionResult<String> {
        self.targets()
            .await?
            .into_iter()
            .find(|t| t.id == tab_id)
            .and_then(|t| t.web_socket_debugger_url)
            .ok_or_else(|| ExtractionError::Browser(format!("tab {tab_id} has no debugger URL")))
    }
}

fn browser_error(err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Browser(err.to_string())
}

/// Pull the string value out of a `Runtime.evaluate` reply.
fn evaluation_value(reply: &Value) -> ExtractionResult<String> {
    if let Some(error) = reply.get("error") {
        return Err(ExtractionError::Browser(format!("evaluate failed: {error}")));
    }
    let result = &reply["result"];
    if let Some(details) = result.get("exceptionDetails") {
        let text = details["text"].as_str().unwrap_or("exception");
        return Err(ExtractionError::Browser(format!("expression threw: {text}")));
    }
    Ok(match &result["result"]["value"] {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

#[async_trait]
impl BrowserControl for CdpBrowser {
    async fn list_tabs(&self) -> ExtractionResult<Vec<Tab>> {
        Ok(self.targets().await?.iter().map(TargetInfo::tab).collect())
    }

    async fn evaluate(&self, tab_id: &str, expression: &str) -> ExtractionResult<String> {
        let ws_url = self.debugger_url(tab_id).await?;
        let (stream, _) = connect_async(ws_url.as_str()).await.map_err(browser_error)?;
        let (mut write, mut read) = stream.split();

        let command = json!({
            "id": EVALUATE_ID,
            "method": "Runtime.evaluate",
            "params": { "expression": expression, "returnByValue": true },
        });
        write
            .send(Message::Text(command.to_string()))
            .await
            .map_err(browser_error)?;

        // events may arrive before the reply
        while let Some(message) = read.next().await {
            let Message::Text(text) = message.map_err(browser_error)? else {
                continue;
            };
            let reply: Value = serde_json::from_str(&text).map_err(browser_error)?;
            if reply["id"].as_u64() == Some(EVALUATE_ID) {
                let _ = write.close().await;
                return evaluation_value(&reply);
            }
            debug!(tab_id = %tab_id, "Ignoring devtools event");
        }

        Err(ExtractionError::Browser(
            "devtools connection closed before reply".to_string(),
        ))
    }

    async fn open_tab(&self, url: &str) -> ExtractionResult<Tab> {
        let endpoint = format!("{}/json/new?{}", self.endpoint, url);
        let response = self
            .client
            .put(&endpoint)
            .send()
            .await
            .map_err(browser_error)?;
        let target: TargetInfo = response.json().await.map_err(browser_error)?;
        Ok(target.tab())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_list_parsing() {
        let body = r#"[
            {"id":"A1","title":"Docs","url":"https://docs.rs/","type":"page",
             "webSocketDebuggerUrl":"ws://127.0.0.1:9222/devtools/page/A1"},
            {"id":"W1","title":"worker","url":"","type":"service_worker"}
        ]"#;
        let targets: Vec<TargetInfo> = serde_json::from_str(body).unwrap();
        let pages: Vec<Tab> = targets
            .iter()
            .filter(|t| t.kind == "page")
            .map(TargetInfo::tab)
            .collect();
        assert_eq!(pages, vec![Tab::new("A1", "Docs", "https://docs.rs/")]);
    }

    #[test]
    fn test_evaluation_value() {
        let ok = json!({"id":1,"result":{"result":{"type":"string","value":"page text"}}});
        assert_eq!(evaluation_value(&ok).unwrap(), "page text");

        let undefined = json!({"id":1,"result":{"result":{"type":"undefined"}}});
        assert_eq!(evaluation_value(&undefined).unwrap(), "");

        let thrown = json!({"id":1,"result":{"result":{},"exceptionDetails":{"text":"Uncaught"}}});
        assert!(matches!(evaluation_value(&thrown), Err(ExtractionError::Browser(_))));
    }

    #[test]
    fn test_endpoint_trailing_slash() {
        assert_eq!(CdpBrowser::new("http://localhost:9222/").endpoint, "http://localhost:9222");
    }
}
