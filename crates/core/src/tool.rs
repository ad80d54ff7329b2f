//! Tool trait — the abstraction over the agent's external lookups.
//!
//! A tool takes a query string and returns an ordered list of short text
//! snippets. Tools are registered by name; the agent selects a subset per
//! request from the classified intent rather than hard-coding invocation
//! order.

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Tool name for web research.
pub const WEB_SEARCH: &str = "web_search";

/// Tool name for the prior-legislation lookup.
pub const ANALYZE_BILLS: &str = "analyze_bills";

/// The outcome of one tool invocation, after the agent's failure wrapping.
///
/// A failed or timed-out tool yields `succeeded = false` with no snippets —
/// never an error that aborts the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Name of the tool that ran
    pub tool: String,

    /// Whether the invocation succeeded
    pub succeeded: bool,

    /// Ordered context snippets (possibly empty)
    pub snippets: Vec<String>,
}

impl ToolOutcome {
    /// Outcome for a tool that failed or timed out.
    pub fn failed(tool: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            succeeded: false,
            snippets: Vec::new(),
        }
    }
}

/// The core Tool trait.
///
/// Each capability (web research, prior-legislation lookup) implements this
/// trait and holds no shared state with the others.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "web_search", "analyze_bills").
    fn name(&self) -> &str;

    /// A description of what this tool does.
    fn description(&self) -> &str;

    /// Run the tool against a query, returning raw snippets.
    async fn run(&self, query: &str) -> std::result::Result<Vec<String>, ToolError>;
}

/// A registry of available tools, keyed by name.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Run a named tool against a query.
    pub async fn run(
        &self,
        name: &str,
        query: &str,
    ) -> std::result::Result<Vec<String>, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.run(query).await
    }

    /// List all registered tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the query"
        }
        async fn run(&self, query: &str) -> std::result::Result<Vec<String>, ToolError> {
            Ok(vec![query.to_string()])
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn registry_run_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let snippets = registry.run("echo", "hello world").await.unwrap();
        assert_eq!(snippets, vec!["hello world".to_string()]);
    }

    #[tokio::test]
    async fn registry_run_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry.run("nonexistent", "q").await.unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[test]
    fn failed_outcome_has_no_snippets() {
        let outcome = ToolOutcome::failed("web_search");
        assert!(!outcome.succeeded);
        assert!(outcome.snippets.is_empty());
        assert_eq!(outcome.tool, "web_search");
    }
}
