//! Response synthesis — turns the intent plus tool findings into a reply
//! and a document change.
//!
//! Like classification, synthesis is total: any model failure drops to a
//! templated reply derived from the intent alone. The synthesizer only
//! *proposes* a [`DocumentDelta`]; applying it is the orchestrator's job.

use civicdraft_core::completion::{CompletionBackend, CompletionRequest};
use civicdraft_core::conversation::{Turn, recent_turns};
use civicdraft_core::document::{Document, DocumentDelta};
use civicdraft_core::error::Error;
use civicdraft_core::intent::{Action, Intent};
use civicdraft_core::tool::ToolOutcome;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

/// How many trailing turns the synthesizer sees.
pub const SYNTHESIS_HISTORY_TURNS: usize = 6;

/// How much of the current document body goes into the prompt.
pub const DOCUMENT_PREVIEW_CHARS: usize = 500;

const SYSTEM_PROMPT: &str = "You are an expert policy advisor helping citizens draft \
policy proposals. Be concise, constructive, and specific. Always respond with valid JSON.";

/// A synthesized turn: what to say, and what to change.
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    pub reply: String,
    pub delta: DocumentDelta,
}

pub struct ResponseSynthesizer {
    backend: Option<Arc<dyn CompletionBackend>>,
    temperature: f32,
    max_tokens: u32,
}

impl ResponseSynthesizer {
    pub fn new(
        backend: Option<Arc<dyn CompletionBackend>>,
        temperature: f32,
        max_tokens: u32,
    ) -> Self {
        Self {
            backend,
            temperature,
            max_tokens,
        }
    }

    /// A synthesizer with no backend — templated replies only.
    pub fn templated() -> Self {
        Self::new(None, 0.0, 0)
    }

    /// Produce a reply and a proposed document change. Total: model failures
    /// fall back to a template built from the intent.
    pub async fn synthesize(
        &self,
        message: &str,
        intent: &Intent,
        document: &Document,
        history: &[Turn],
        outcomes: &[ToolOutcome],
    ) -> Synthesis {
        if let Some(backend) = &self.backend {
            match self
                .model_synthesize(backend.as_ref(), message, intent, document, history, outcomes)
                .await
            {
                Ok(synthesis) => {
                    debug!(delta = ?synthesis.delta, "Model synthesized response");
                    return synthesis;
                }
                Err(e) => {
                    warn!(error = %e, "Model synthesis failed, using templated response");
                }
            }
        }
        templated_synthesis(intent)
    }

    async fn model_synthesize(
        &self,
        backend: &dyn CompletionBackend,
        message: &str,
        intent: &Intent,
        document: &Document,
        history: &[Turn],
        outcomes: &[ToolOutcome],
    ) -> Result<Synthesis, Error> {
        let conversation = recent_turns(history, SYNTHESIS_HISTORY_TURNS)
            .iter()
            .map(Turn::prompt_line)
            .collect::<Vec<_>>()
            .join("\n");

        let preview: String = document.content.chars().take(DOCUMENT_PREVIEW_CHARS).collect();

        let mut findings = String::new();
        for outcome in outcomes.iter().filter(|o| !o.snippets.is_empty()) {
            findings.push_str(&format!("\nFindings from {}:\n", outcome.tool));
            for snippet in &outcome.snippets {
                findings.push_str(&format!("- {snippet}\n"));
            }
        }
        if findings.is_empty() {
            findings.push_str("(none)\n");
        }

        let prompt = format!(
            r#"Help the user with their policy request.

User message: "{message}"

Intent: action={action}, topic={topic}

Current document "{doc_title}" (may be truncated):
{preview}

Recent conversation:
{conversation}

Research findings:
{findings}
Return a JSON object with:
- message: string (your conversational reply to the user)
- documentChanges: boolean (true if the document should change)
- newSection: object with "title" and "content" strings, or null (a section to add or replace)
- updates: object with optional "title" and "content" strings, or null (a full-document rewrite)"#,
            action = intent.action,
            topic = intent.topic,
            doc_title = document.title,
        );

        let raw = backend
            .complete(
                CompletionRequest::json(SYSTEM_PROMPT, prompt, self.temperature)
                    .with_max_tokens(self.max_tokens),
            )
            .await?;

        let payload: SynthesisPayload = serde_json::from_str(&raw)?;
        Ok(payload.into_synthesis())
    }
}

/// The strict-JSON shape the model is asked for.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesisPayload {
    message: String,
    #[serde(default)]
    document_changes: bool,
    #[serde(default)]
    new_section: Option<NewSection>,
    #[serde(default)]
    updates: Option<Updates>,
}

#[derive(Debug, Deserialize)]
struct NewSection {
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct Updates {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

impl SynthesisPayload {
    /// Map the payload onto a delta. A section change wins over a full
    /// rewrite when the model returns both.
    fn into_synthesis(self) -> Synthesis {
        let delta = if !self.document_changes {
            DocumentDelta::NoChange
        } else if let Some(section) = self
            .new_section
            .filter(|s| !s.title.trim().is_empty())
        {
            DocumentDelta::SectionUpsert {
                title: section.title,
                content: section.content,
            }
        } else if let Some(updates) = self
            .updates
            .filter(|u| u.title.is_some() || u.content.is_some())
        {
            DocumentDelta::Replace {
                title: updates.title,
                content: updates.content,
            }
        } else {
            DocumentDelta::NoChange
        };

        Synthesis {
            reply: self.message,
            delta,
        }
    }
}

/// Deterministic reply built from the intent alone.
fn templated_synthesis(intent: &Intent) -> Synthesis {
    let action = intent.action;
    let topic = &intent.topic;

    if matches!(action, Action::Create | Action::Add) {
        Synthesis {
            reply: format!(
                "I understand you want to {action} regarding {topic}. Let me help you \
                 with that. I've created a new section in your document for {topic}."
            ),
            delta: DocumentDelta::SectionUpsert {
                title: format!("Policy on {topic}"),
                content: format!(
                    "This section addresses {topic} policy considerations based on your request."
                ),
            },
        }
    } else {
        Synthesis {
            reply: format!(
                "I understand you want to {action} regarding {topic}. Let me help you with that."
            ),
            delta: DocumentDelta::NoChange,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use civicdraft_core::error::CompletionError;
    use civicdraft_providers::StaticBackend;

    fn doc() -> Document {
        Document::new("Housing Proposal", "## Summary\nExpand affordable housing.")
    }

    fn create_intent() -> Intent {
        Intent {
            needs_research: false,
            needs_bill_analysis: false,
            search_query: "housing".into(),
            topic: "healthcare".into(),
            action: Action::Create,
            should_update_document: true,
        }
    }

    #[tokio::test]
    async fn model_section_change_maps_to_upsert() {
        let backend = Arc::new(StaticBackend::with_replies(vec![
            r#"{
                "message": "Added a funding section.",
                "documentChanges": true,
                "newSection": {"title": "Funding", "content": "Allocate grants."},
                "updates": null
            }"#
            .into(),
        ]));
        let synthesizer = ResponseSynthesizer::new(Some(backend), 0.7, 2000);
        let out = synthesizer
            .synthesize("add funding", &create_intent(), &doc(), &[], &[])
            .await;
        assert_eq!(out.reply, "Added a funding section.");
        assert_eq!(
            out.delta,
            DocumentDelta::SectionUpsert {
                title: "Funding".into(),
                content: "Allocate grants.".into(),
            }
        );
    }

    #[tokio::test]
    async fn section_change_wins_over_full_rewrite() {
        let backend = Arc::new(StaticBackend::with_replies(vec![
            r#"{
                "message": "Done.",
                "documentChanges": true,
                "newSection": {"title": "Funding", "content": "Grants."},
                "updates": {"content": "entire new body"}
            }"#
            .into(),
        ]));
        let synthesizer = ResponseSynthesizer::new(Some(backend), 0.7, 2000);
        let out = synthesizer
            .synthesize("msg", &create_intent(), &doc(), &[], &[])
            .await;
        assert!(matches!(out.delta, DocumentDelta::SectionUpsert { .. }));
    }

    #[tokio::test]
    async fn no_document_changes_means_no_change() {
        let backend = Arc::new(StaticBackend::with_replies(vec![
            r#"{
                "message": "Here is some background.",
                "documentChanges": false,
                "newSection": {"title": "Funding", "content": "Grants."}
            }"#
            .into(),
        ]));
        let synthesizer = ResponseSynthesizer::new(Some(backend), 0.7, 2000);
        let out = synthesizer
            .synthesize("msg", &create_intent(), &doc(), &[], &[])
            .await;
        assert_eq!(out.delta, DocumentDelta::NoChange);
    }

    #[tokio::test]
    async fn blank_section_title_falls_through_to_updates() {
        let backend = Arc::new(StaticBackend::with_replies(vec![
            r#"{
                "message": "Rewrote the draft.",
                "documentChanges": true,
                "newSection": {"title": "  ", "content": "x"},
                "updates": {"title": "New Title", "content": "New body"}
            }"#
            .into(),
        ]));
        let synthesizer = ResponseSynthesizer::new(Some(backend), 0.7, 2000);
        let out = synthesizer
            .synthesize("msg", &create_intent(), &doc(), &[], &[])
            .await;
        assert_eq!(
            out.delta,
            DocumentDelta::Replace {
                title: Some("New Title".into()),
                content: Some("New body".into()),
            }
        );
    }

    #[tokio::test]
    async fn backend_error_uses_template_for_create() {
        let backend = Arc::new(StaticBackend::failing(CompletionError::Network(
            "unreachable".into(),
        )));
        let synthesizer = ResponseSynthesizer::new(Some(backend), 0.7, 2000);
        let out = synthesizer
            .synthesize("msg", &create_intent(), &doc(), &[], &[])
            .await;
        assert!(out.reply.contains("create"));
        assert!(out.reply.contains("healthcare"));
        assert_eq!(
            out.delta,
            DocumentDelta::SectionUpsert {
                title: "Policy on healthcare".into(),
                content: "This section addresses healthcare policy considerations based on \
                          your request."
                    .into(),
            }
        );
    }

    #[tokio::test]
    async fn template_without_document_action_is_no_change() {
        let synthesizer = ResponseSynthesizer::templated();
        let intent = Intent::chat("hello");
        let out = synthesizer.synthesize("hello", &intent, &doc(), &[], &[]).await;
        assert_eq!(out.delta, DocumentDelta::NoChange);
        assert!(out.reply.contains("chat"));
    }

    #[tokio::test]
    async fn malformed_model_json_falls_back() {
        let backend = Arc::new(StaticBackend::with_replies(vec!["{broken".into()]));
        let synthesizer = ResponseSynthesizer::new(Some(backend), 0.7, 2000);
        let out = synthesizer
            .synthesize("msg", &create_intent(), &doc(), &[], &[])
            .await;
        assert!(matches!(out.delta, DocumentDelta::SectionUpsert { .. }));
    }
}
