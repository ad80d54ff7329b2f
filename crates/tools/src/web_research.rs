//! Web research tool — searches the web for policy context.
//!
//! POSTs `{"query": ...}` to the configured endpoint and flattens the result
//! list into text snippets. The endpoint may return plain strings or
//! `{title, snippet, url}` objects; both are accepted.

use async_trait::async_trait;
use civicdraft_core::error::ToolError;
use civicdraft_core::tool::Tool;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub struct WebResearchTool {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl WebResearchTool {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();
        Self {
            endpoint: endpoint.into(),
            timeout,
            client,
        }
    }
}

#[async_trait]
impl Tool for WebResearchTool {
    fn name(&self) -> &str {
        crate::WEB_SEARCH
    }

    fn description(&self) -> &str {
        "Search the web for policy information, existing legislation, and research"
    }

    async fn run(&self, query: &str) -> Result<Vec<String>, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::InvalidInput("empty search query".into()));
        }

        debug!(tool = self.name(), %query, "Running web research");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await
            .map_err(|e| request_error(self.name(), self.timeout, e))?;

        if !response.status().is_success() {
            return Err(ToolError::RequestFailed {
                tool_name: self.name().to_string(),
                reason: format!("status {}", response.status()),
            });
        }

        let payload: SearchResponse =
            response
                .json()
                .await
                .map_err(|e| ToolError::RequestFailed {
                    tool_name: self.name().to_string(),
                    reason: format!("invalid payload: {e}"),
                })?;

        Ok(payload.snippets())
    }
}

pub(crate) fn request_error(tool_name: &str, timeout: Duration, e: reqwest::Error) -> ToolError {
    if e.is_timeout() {
        ToolError::Timeout {
            tool_name: tool_name.to_string(),
            timeout_secs: timeout.as_secs(),
        }
    } else {
        ToolError::RequestFailed {
            tool_name: tool_name.to_string(),
            reason: e.to_string(),
        }
    }
}

/// `{"results": [...]}` where each result is a string or a structured hit.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchHit {
    Text(String),
    Structured {
        #[serde(default)]
        title: String,
        #[serde(default)]
        snippet: String,
        #[serde(default)]
        url: Option<String>,
    },
}

impl SearchResponse {
    pub(crate) fn snippets(self) -> Vec<String> {
        self.results
            .into_iter()
            .map(|hit| match hit {
                SearchHit::Text(text) => text,
                SearchHit::Structured {
                    title,
                    snippet,
                    url,
                } => {
                    let mut line = if title.is_empty() {
                        snippet
                    } else if snippet.is_empty() {
                        title
                    } else {
                        format!("{title}: {snippet}")
                    };
                    if let Some(url) = url {
                        line.push_str(&format!(" ({url})"));
                    }
                    line
                }
            })
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}
