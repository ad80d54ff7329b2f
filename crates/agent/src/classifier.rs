//! Intent classification — model-backed with a deterministic keyword
//! fallback.
//!
//! `classify` never fails: any error on the model path (network, timeout,
//! malformed JSON, missing or invalid fields) drops to the heuristic path,
//! which always produces a fully-populated [`Intent`].

use civicdraft_core::completion::{CompletionBackend, CompletionRequest};
use civicdraft_core::conversation::{Turn, recent_turns};
use civicdraft_core::error::Error;
use civicdraft_core::intent::{Action, DEFAULT_TOPIC, Intent};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// How many trailing turns the classifier sees.
pub const CLASSIFY_HISTORY_TURNS: usize = 3;

/// Fixed topic vocabulary for the heuristic path.
const TOPICS: [&str; 6] = [
    "healthcare",
    "education",
    "environment",
    "economy",
    "infrastructure",
    "technology",
];

const SYSTEM_PROMPT: &str =
    "You are a policy analysis assistant. Always respond with valid JSON.";

pub struct IntentClassifier {
    backend: Option<Arc<dyn CompletionBackend>>,
    temperature: f32,
}

impl IntentClassifier {
    /// A classifier that tries the completion backend first.
    pub fn new(backend: Option<Arc<dyn CompletionBackend>>, temperature: f32) -> Self {
        Self {
            backend,
            temperature,
        }
    }

    /// A classifier with no backend — heuristics only.
    pub fn heuristic() -> Self {
        Self::new(None, 0.0)
    }

    /// Classify a message against its recent history. Total: always returns
    /// a fully-populated intent.
    pub async fn classify(&self, message: &str, history: &[Turn]) -> Intent {
        if let Some(backend) = &self.backend {
            match self.model_classify(backend.as_ref(), message, history).await {
                Ok(intent) => {
                    debug!(action = %intent.action, topic = %intent.topic, "Model classified intent");
                    return intent;
                }
                Err(e) => {
                    warn!(error = %e, "Model classification failed, using keyword heuristics");
                }
            }
        }
        heuristic_intent(message)
    }

    async fn model_classify(
        &self,
        backend: &dyn CompletionBackend,
        message: &str,
        history: &[Turn],
    ) -> Result<Intent, Error> {
        let conversation = recent_turns(history, CLASSIFY_HISTORY_TURNS)
            .iter()
            .map(Turn::prompt_line)
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            r#"Analyze this policy-related request and determine the user's intent.

User message: "{message}"

Recent conversation:
{conversation}

Return a JSON object with:
- needsResearch: boolean (true if the user wants web research)
- needsBillAnalysis: boolean (true if the user wants existing bills analyzed)
- searchQuery: string (query for web search if needed)
- topic: string (main policy topic)
- action: string (one of: create, add, research, analyze, chat)
- shouldUpdateDocument: boolean (true if the document should be modified)"#
        );

        let raw = backend
            .complete(CompletionRequest::json(SYSTEM_PROMPT, prompt, self.temperature))
            .await?;

        let payload: IntentPayload = serde_json::from_str(&raw)?;
        payload.into_intent(message)
    }
}

/// The strict-JSON shape the model is asked for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IntentPayload {
    needs_research: bool,
    needs_bill_analysis: bool,
    #[serde(default)]
    search_query: String,
    #[serde(default)]
    topic: String,
    action: String,
    #[serde(default)]
    should_update_document: bool,
}

impl IntentPayload {
    /// Validate the payload into an intent, filling blank strings from the
    /// message. An unknown action is a validation failure, not a silent
    /// default.
    fn into_intent(self, message: &str) -> Result<Intent, Error> {
        let action: Action = self
            .action
            .parse()
            .map_err(|e: String| Error::Internal(e))?;

        let search_query = if self.search_query.trim().is_empty() {
            message.to_string()
        } else {
            self.search_query
        };

        let topic = if self.topic.trim().is_empty() {
            DEFAULT_TOPIC.to_string()
        } else {
            self.topic
        };

        Ok(Intent {
            needs_research: self.needs_research,
            needs_bill_analysis: self.needs_bill_analysis,
            search_query,
            topic,
            action,
            should_update_document: self.should_update_document,
        })
    }
}

/// Deterministic keyword classification.
fn heuristic_intent(message: &str) -> Intent {
    let lower = message.to_lowercase();

    let needs_research = ["research", "find", "search"]
        .iter()
        .any(|k| lower.contains(k));
    let needs_bill_analysis = ["existing", "similar", "bills"]
        .iter()
        .any(|k| lower.contains(k));

    let topic = TOPICS
        .iter()
        .find(|t| lower.contains(**t))
        .map(|t| (*t).to_string())
        .unwrap_or_else(|| DEFAULT_TOPIC.to_string());

    let action = determine_action(&lower);

    Intent {
        needs_research,
        needs_bill_analysis,
        search_query: message.to_string(),
        topic,
        action,
        should_update_document: matches!(action, Action::Create | Action::Add),
    }
}

fn determine_action(lower: &str) -> Action {
    if lower.contains("create") || lower.contains("draft") {
        Action::Create
    } else if lower.contains("add") || lower.contains("include") {
        Action::Add
    } else if lower.contains("research") || lower.contains("find") {
        Action::Research
    } else if lower.contains("analyze") || lower.contains("review") {
        Action::Analyze
    } else {
        Action::Chat
    }
}
