//! The agent façade — one total entry point over classify, research,
//! synthesize, and patch.

use crate::classifier::IntentClassifier;
use crate::runner::ToolRunner;
use crate::synthesizer::ResponseSynthesizer;
use civicdraft_core::completion::CompletionBackend;
use civicdraft_core::conversation::Turn;
use civicdraft_core::document::{Document, DocumentDelta};
use civicdraft_core::tool::ToolRegistry;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

/// The reply users see when the pipeline itself breaks.
pub const FALLBACK_REPLY: &str =
    "I encountered an error while processing your request. Please try again.";

/// Default per-tool wall-clock budget.
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(10);

const DEFAULT_CLASSIFY_TEMPERATURE: f32 = 0.3;
const DEFAULT_SYNTHESIZE_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Name recorded in `tools_used` when a section was upserted.
const UPDATE_SECTION: &str = "update_section";

/// Name recorded in `tools_used` when the whole document was rewritten.
const UPDATE_DOCUMENT: &str = "update_document";

/// One completed agent turn.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentResponse {
    /// Conversational reply, always non-empty
    pub reply: String,

    /// The new document snapshot, present only when it changed
    pub updated_document: Option<Document>,

    /// Which tools contributed to this turn (successful lookups plus any
    /// document mutation)
    pub tools_used: Vec<String>,
}

/// The conversational policy drafting agent.
///
/// Stateless across turns: every call receives the full context it needs and
/// owns nothing between calls, so one instance can serve concurrent
/// conversations.
pub struct PolicyAgent {
    classifier: IntentClassifier,
    runner: ToolRunner,
    synthesizer: ResponseSynthesizer,
}

impl PolicyAgent {
    /// Build an agent over an optional completion backend and a tool
    /// registry. With no backend, classification and synthesis run on their
    /// deterministic fallback paths.
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, registry: Arc<ToolRegistry>) -> Self {
        Self::with_settings(
            backend,
            registry,
            DEFAULT_TOOL_TIMEOUT,
            DEFAULT_CLASSIFY_TEMPERATURE,
            DEFAULT_SYNTHESIZE_TEMPERATURE,
            DEFAULT_MAX_TOKENS,
        )
    }

    pub fn with_settings(
        backend: Option<Arc<dyn CompletionBackend>>,
        registry: Arc<ToolRegistry>,
        tool_timeout: Duration,
        classify_temperature: f32,
        synthesize_temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            classifier: IntentClassifier::new(backend.clone(), classify_temperature),
            runner: ToolRunner::new(registry, tool_timeout),
            synthesizer: ResponseSynthesizer::new(backend, synthesize_temperature, max_tokens),
        }
    }

    /// Process one user turn. Total: whatever breaks inside, the caller gets
    /// a well-formed response — at worst the fixed fallback reply with no
    /// document change.
    pub async fn process(
        &self,
        message: &str,
        document: &Document,
        history: &[Turn],
    ) -> AgentResponse {
        let attempt = AssertUnwindSafe(self.try_process(message, document, history));
        match attempt.catch_unwind().await {
            Ok(response) => response,
            Err(_) => {
                error!("Agent pipeline panicked, returning fallback response");
                AgentResponse {
                    reply: FALLBACK_REPLY.to_string(),
                    updated_document: None,
                    tools_used: Vec::new(),
                }
            }
        }
    }

    async fn try_process(
        &self,
        message: &str,
        document: &Document,
        history: &[Turn],
    ) -> AgentResponse {
        let intent = self.classifier.classify(message, history).await;
        info!(
            action = %intent.action,
            topic = %intent.topic,
            needs_research = intent.needs_research,
            needs_bill_analysis = intent.needs_bill_analysis,
            "Processing turn"
        );

        let outcomes = self.runner.run(&intent).await;

        let synthesis = self
            .synthesizer
            .synthesize(message, &intent, document, history, &outcomes)
            .await;

        let mut tools_used: Vec<String> = outcomes
            .iter()
            .filter(|o| o.succeeded)
            .map(|o| o.tool.clone())
            .collect();

        let updated_document = match &synthesis.delta {
            DocumentDelta::NoChange => None,
            delta @ DocumentDelta::SectionUpsert { .. } => {
                tools_used.push(UPDATE_SECTION.to_string());
                Some(document.apply(delta))
            }
            delta @ DocumentDelta::Replace { .. } => {
                tools_used.push(UPDATE_DOCUMENT.to_string());
                Some(document.apply(delta))
            }
        };

        AgentResponse {
            reply: synthesis.reply,
            updated_document,
            tools_used,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use civicdraft_core::error::{CompletionError, ToolError};
    use civicdraft_core::tool::{Tool, WEB_SEARCH};
    use civicdraft_providers::StaticBackend;

    struct FixedTool {
        name: &'static str,
        snippets: Vec<String>,
    }

    #[async_trait]
    impl Tool for FixedTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "fixed"
        }
        async fn run(&self, _query: &str) -> Result<Vec<String>, ToolError> {
            Ok(self.snippets.clone())
        }
    }

    struct PanickingTool;

    #[async_trait]
    impl Tool for PanickingTool {
        fn name(&self) -> &str {
            WEB_SEARCH
        }
        fn description(&self) -> &str {
            "panics"
        }
        async fn run(&self, _query: &str) -> Result<Vec<String>, ToolError> {
            panic!("tool blew up")
        }
    }

    fn doc() -> Document {
        Document::new("Draft", "## Summary\nInitial notes.")
    }

    #[tokio::test]
    async fn heuristic_create_updates_document_and_records_it() {
        let agent = PolicyAgent::new(None, Arc::new(ToolRegistry::new()));
        let response = agent
            .process("Let's create a healthcare proposal", &doc(), &[])
            .await;

        let updated = response.updated_document.expect("document should change");
        assert!(updated.content.contains("## Policy on healthcare"));
        assert_eq!(response.tools_used, vec![UPDATE_SECTION.to_string()]);
        assert!(response.reply.contains("healthcare"));
    }

    #[tokio::test]
    async fn chat_turn_leaves_document_alone() {
        let agent = PolicyAgent::new(None, Arc::new(ToolRegistry::new()));
        let response = agent.process("Hello there", &doc(), &[]).await;
        assert!(response.updated_document.is_none());
        assert!(response.tools_used.is_empty());
        assert!(!response.reply.is_empty());
    }

    #[tokio::test]
    async fn successful_tool_appears_in_tools_used() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FixedTool {
            name: WEB_SEARCH,
            snippets: vec!["study: rent caps slow displacement".into()],
        }));
        let agent = PolicyAgent::new(None, Arc::new(registry));

        let response = agent.process("research housing policy", &doc(), &[]).await;
        assert_eq!(response.tools_used, vec![WEB_SEARCH.to_string()]);
        assert!(response.updated_document.is_none());
    }

    #[tokio::test]
    async fn failed_tool_is_excluded_from_tools_used() {
        // Research requested but no such tool registered
        let agent = PolicyAgent::new(None, Arc::new(ToolRegistry::new()));
        let response = agent.process("research housing policy", &doc(), &[]).await;
        assert!(response.tools_used.is_empty());
        assert!(!response.reply.is_empty());
    }

    #[tokio::test]
    async fn one_tool_failing_does_not_hide_the_other() {
        struct FailingTool;

        #[async_trait]
        impl Tool for FailingTool {
            fn name(&self) -> &str {
                WEB_SEARCH
            }
            fn description(&self) -> &str {
                "failing"
            }
            async fn run(&self, _query: &str) -> Result<Vec<String>, ToolError> {
                Err(ToolError::RequestFailed {
                    tool_name: WEB_SEARCH.to_string(),
                    reason: "boom".into(),
                })
            }
        }

        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FailingTool));
        registry.register(Box::new(FixedTool {
            name: civicdraft_core::tool::ANALYZE_BILLS,
            snippets: vec!["HB 1204: rental assistance".into()],
        }));
        let agent = PolicyAgent::new(None, Arc::new(registry));

        let response = agent
            .process("find similar bills on housing", &doc(), &[])
            .await;
        assert!(!response.reply.is_empty());
        assert_eq!(
            response.tools_used,
            vec![civicdraft_core::tool::ANALYZE_BILLS.to_string()]
        );
    }

    #[tokio::test]
    async fn backend_failure_still_produces_a_turn() {
        let backend: Arc<dyn CompletionBackend> = Arc::new(StaticBackend::failing(
            CompletionError::Network("connection refused".into()),
        ));
        let agent = PolicyAgent::new(Some(backend), Arc::new(ToolRegistry::new()));

        let response = agent
            .process("draft an education proposal", &doc(), &[])
            .await;
        assert!(!response.reply.is_empty());
        assert_ne!(response.reply, FALLBACK_REPLY);
        assert!(response.updated_document.is_some());
    }

    #[tokio::test]
    async fn panicking_tool_yields_fallback_reply() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(PanickingTool));
        let agent = PolicyAgent::new(None, Arc::new(registry));

        let response = agent.process("research housing policy", &doc(), &[]).await;
        assert_eq!(response.reply, FALLBACK_REPLY);
        assert!(response.updated_document.is_none());
        assert!(response.tools_used.is_empty());
    }

    #[tokio::test]
    async fn model_driven_turn_threads_tool_output_through() {
        let backend: Arc<dyn CompletionBackend> = Arc::new(StaticBackend::with_replies(vec![
            // classification
            r#"{"needsResearch": true, "needsBillAnalysis": false,
                "searchQuery": "transit funding", "topic": "infrastructure",
                "action": "add", "shouldUpdateDocument": true}"#
                .into(),
            // synthesis
            r#"{"message": "Added a transit funding section.",
                "documentChanges": true,
                "newSection": {"title": "Transit Funding", "content": "Dedicate 1% of sales tax."}}"#
                .into(),
        ]));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(FixedTool {
            name: WEB_SEARCH,
            snippets: vec!["report: dedicated transit taxes".into()],
        }));
        let agent = PolicyAgent::new(Some(backend), Arc::new(registry));

        let response = agent
            .process("add a transit funding section", &doc(), &[])
            .await;
        assert_eq!(response.reply, "Added a transit funding section.");
        assert_eq!(
            response.tools_used,
            vec![WEB_SEARCH.to_string(), UPDATE_SECTION.to_string()]
        );
        let updated = response.updated_document.unwrap();
        assert!(updated.content.contains("## Transit Funding"));
        assert!(updated.content.contains("## Summary"));
    }
}
