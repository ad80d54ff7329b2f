//! Conversation turn domain types.
//!
//! The agent is stateless across requests: the caller owns the full
//! conversation and passes a suffix of it into each call. A `Turn` is
//! immutable once created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Render as a `role: content` line for inclusion in a prompt.
    pub fn prompt_line(&self) -> String {
        let role = match self.role {
            Role::User => "user",
            Role::Assistant => "assistant",
        };
        format!("{role}: {}", self.content)
    }
}

/// The last `limit` turns of a history, oldest first.
///
/// Prompt context windows are a stated contract, not an implicit slicing
/// detail: callers of the classifier and synthesizer always cap the history
/// through this function.
pub fn recent_turns(history: &[Turn], limit: usize) -> &[Turn] {
    let start = history.len().saturating_sub(limit);
    &history[start..]
}
