//! Prior-legislation lookup tool.
//!
//! Given a policy topic, queries the bill-search endpoint for existing bills
//! touching that topic. Same wire shape as the research endpoint.

use async_trait::async_trait;
use civicdraft_core::error::ToolError;
use civicdraft_core::tool::Tool;
use std::time::Duration;
use tracing::debug;

use crate::web_research::{SearchResponse, request_error};

pub struct BillLookupTool {
    endpoint: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BillLookupTool {
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
impl Tool for BillLookupTool {
    fn name(&self) -> &str {
        crate::ANALYZE_BILLS
    }

    fn description(&self) -> &str {
        "Find existing bills related to a policy topic"
    }

    async fn run(&self, query: &str) -> Result<Vec<String>, ToolError> {
        if query.trim().is_empty() {
            return Err(ToolError::InvalidInput("empty topic".into()));
        }

        debug!(tool = self.name(), topic = %query, "Looking up related bills");

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
