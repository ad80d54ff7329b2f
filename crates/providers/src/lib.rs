//! Completion backend implementations for CivicDraft.
//!
//! - [`OpenAiCompatBackend`] — any OpenAI-compatible `/v1/chat/completions`
//!   endpoint (OpenAI, OpenRouter, Ollama, vLLM, ...)
//! - [`StaticBackend`] — a canned-response backend for tests and offline runs

pub mod openai_compat;
pub mod static_backend;

pub use openai_compat::OpenAiCompatBackend;
pub use static_backend::StaticBackend;
