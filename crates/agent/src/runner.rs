//! Tool orchestration — selects tools from the intent, runs them
//! concurrently, and bounds their output.
//!
//! Tools not requested by the intent are never invoked. A tool failure or
//! timeout yields an empty, unsuccessful outcome; it can never abort the
//! request. Raw result lists are truncated before they reach the
//! synthesizer, bounding prompt size regardless of upstream volume.

use civicdraft_core::intent::Intent;
use civicdraft_core::tool::{ANALYZE_BILLS, ToolOutcome, ToolRegistry, WEB_SEARCH};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Keep at most this many snippets per tool.
pub const MAX_SNIPPETS: usize = 3;

/// Clip each snippet to this many characters.
pub const MAX_SNIPPET_CHARS: usize = 400;

pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolRunner {
    pub fn new(registry: Arc<ToolRegistry>, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Run the tools the intent asks for. The two lookups are independent
    /// and run concurrently; both settle before this returns.
    pub async fn run(&self, intent: &Intent) -> Vec<ToolOutcome> {
        let research = async {
            if intent.needs_research {
                Some(self.invoke(WEB_SEARCH, &intent.search_query).await)
            } else {
                None
            }
        };
        let bills = async {
            if intent.needs_bill_analysis {
                Some(self.invoke(ANALYZE_BILLS, &intent.topic).await)
            } else {
                None
            }
        };

        let (research, bills) = tokio::join!(research, bills);
        [research, bills].into_iter().flatten().collect()
    }

    async fn invoke(&self, name: &str, query: &str) -> ToolOutcome {
        match tokio::time::timeout(self.timeout, self.registry.run(name, query)).await {
            Ok(Ok(snippets)) => {
                debug!(tool = name, count = snippets.len(), "Tool returned snippets");
                ToolOutcome {
                    tool: name.to_string(),
                    succeeded: true,
                    snippets: bound_snippets(snippets),
                }
            }
            Ok(Err(e)) => {
                warn!(tool = name, error = %e, "Tool failed");
                ToolOutcome::failed(name)
            }
            Err(_) => {
                warn!(tool = name, timeout_secs = self.timeout.as_secs(), "Tool timed out");
                ToolOutcome::failed(name)
            }
        }
    }
}

/// Top-N snippets, each clipped on a char boundary.
fn bound_snippets(snippets: Vec<String>) -> Vec<String> {
    snippets
        .into_iter()
        .take(MAX_SNIPPETS)
        .map(|s| {
            if s.chars().count() > MAX_SNIPPET_CHARS {
                s.chars().take(MAX_SNIPPET_CHARS).collect()
            } else {
                s
            }
        })
        .collect()
}
