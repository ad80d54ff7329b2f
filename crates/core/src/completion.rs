//! CompletionBackend trait — the abstraction over LLM completion services.
//!
//! A backend knows how to send a prompt pair to a completion endpoint and
//! return the raw text of the model's reply. The classifier and synthesizer
//! parse that text themselves; any failure on this boundary is absorbed by
//! their deterministic fallback paths, so no retry policy lives here.

use crate::error::CompletionError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One completion request: a system instruction plus a user prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// System instruction (persona, output-format rules)
    pub system: String,

    /// The user prompt body
    pub user: String,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Ask the backend for a strict-JSON response body
    #[serde(default)]
    pub json: bool,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    /// A request expecting a strict-JSON object back.
    pub fn json(system: impl Into<String>, user: impl Into<String>, temperature: f32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature,
            max_tokens: None,
            json: true,
        }
    }

    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = Some(max);
        self
    }
}

/// The core completion trait.
///
/// Every completion service (OpenAI-compatible endpoints, test doubles)
/// implements this. Callers never know which backend is in play.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// A human-readable name for this backend (e.g., "openai", "static").
    fn name(&self) -> &str;

    /// Send a request and get the raw reply text.
    async fn complete(&self, request: CompletionRequest)
    -> std::result::Result<String, CompletionError>;

    /// Health check — can we reach the backend?
    async fn health_check(&self) -> std::result::Result<bool, CompletionError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_request_sets_flag() {
        let req = CompletionRequest::json("system", "user", 0.3);
        assert!(req.json);
        assert!((req.temperature - 0.3).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
    }

    #[test]
    fn max_tokens_builder() {
        let req = CompletionRequest::json("s", "u", 0.7).with_max_tokens(2000);
        assert_eq!(req.max_tokens, Some(2000));
    }
}
