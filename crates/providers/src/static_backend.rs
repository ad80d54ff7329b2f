//! Canned-response backend for tests and offline runs.

use async_trait::async_trait;
use civicdraft_core::completion::{CompletionBackend, CompletionRequest};
use civicdraft_core::error::CompletionError;
use std::sync::Mutex;

/// A backend that replays a fixed queue of responses, or a fixed error.
///
/// Each `complete` call pops the next queued reply; an exhausted queue (or a
/// backend constructed with [`StaticBackend::failing`]) returns the
/// configured error, which exercises callers' fallback paths without any
/// network mocking.
pub struct StaticBackend {
    replies: Mutex<Vec<String>>,
    error: CompletionError,
    calls: Mutex<usize>,
}

impl StaticBackend {
    /// A backend that returns the given replies in order.
    pub fn with_replies(replies: Vec<String>) -> Self {
        let mut queue = replies;
        queue.reverse();
        Self {
            replies: Mutex::new(queue),
            error: CompletionError::NotConfigured("static backend exhausted".into()),
            calls: Mutex::new(0),
        }
    }

    /// A backend that always fails with the given error.
    pub fn failing(error: CompletionError) -> Self {
        Self {
            replies: Mutex::new(Vec::new()),
            error,
            calls: Mutex::new(0),
        }
    }

    /// How many completions have been requested.
    pub fn calls(&self) -> usize {
        *self.calls.lock().expect("calls lock poisoned")
    }
}

#[async_trait]
impl CompletionBackend for StaticBackend {
    fn name(&self) -> &str {
        "static"
    }

    async fn complete(&self, _request: CompletionRequest) -> Result<String, CompletionError> {
        *self.calls.lock().expect("calls lock poisoned") += 1;
        self.replies
            .lock()
            .expect("replies lock poisoned")
            .pop()
            .ok_or_else(|| self.error.clone())
    }

    async fn health_check(&self) -> Result<bool, CompletionError> {
        Ok(!self.replies.lock().expect("replies lock poisoned").is_empty())
    }
}
