//! Structured intent — the classifier's guess at what the user wants done.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fallback topic when no known policy area is mentioned.
pub const DEFAULT_TOPIC: &str = "general policy";

/// What kind of request the user is making.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Draft a new proposal or section
    Create,
    /// Add material to the existing document
    Add,
    /// Gather outside research
    Research,
    /// Review existing legislation or the current draft
    Analyze,
    /// Plain conversation, no document work
    #[default]
    Chat,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Add => "add",
            Action::Research => "research",
            Action::Analyze => "analyze",
            Action::Chat => "chat",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "create" => Ok(Action::Create),
            "add" => Ok(Action::Add),
            "research" => Ok(Action::Research),
            "analyze" => Ok(Action::Analyze),
            "chat" => Ok(Action::Chat),
            other => Err(format!("unknown action: {other}")),
        }
    }
}

/// The classifier's structured output. Produced fresh per request, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intent {
    /// Whether the web research tool should run
    pub needs_research: bool,

    /// Whether the prior-legislation lookup should run
    pub needs_bill_analysis: bool,

    /// Query for the research tool
    pub search_query: String,

    /// Main policy topic
    pub topic: String,

    /// What the user is asking for
    pub action: Action,

    /// Whether the synthesizer is expected to mutate the document
    pub should_update_document: bool,
}

impl Intent {
    /// A conversational no-op intent for the given message.
    pub fn chat(message: &str) -> Self {
        Self {
            needs_research: false,
            needs_bill_analysis: false,
            search_query: message.to_string(),
            topic: DEFAULT_TOPIC.to_string(),
            action: Action::Chat,
            should_update_document: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_roundtrips_through_str() {
        for action in [
            Action::Create,
            Action::Add,
            Action::Research,
            Action::Analyze,
            Action::Chat,
        ] {
            assert_eq!(action.as_str().parse::<Action>().unwrap(), action);
        }
    }

    #[test]
    fn action_parse_is_case_insensitive() {
        assert_eq!("  CREATE ".parse::<Action>().unwrap(), Action::Create);
        assert!("summarize".parse::<Action>().is_err());
    }

    #[test]
    fn chat_intent_uses_sentinel_topic() {
        let intent = Intent::chat("hello there");
        assert_eq!(intent.topic, DEFAULT_TOPIC);
        assert_eq!(intent.action, Action::Chat);
        assert!(!intent.needs_research);
        assert!(!intent.should_update_document);
    }
}
