//! # CivicDraft Core
//!
//! Domain types, traits, and error definitions for the CivicDraft policy
//! drafting agent. This crate has **zero framework dependencies** — it defines
//! the domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external capability is defined as a trait here. Implementations live
//! in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod completion;
pub mod conversation;
pub mod document;
pub mod error;
pub mod intent;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use completion::{CompletionBackend, CompletionRequest};
pub use conversation::{Role, Turn, recent_turns};
pub use document::{Document, DocumentDelta, Section};
pub use error::{CompletionError, Error, Result, ToolError};
pub use intent::{Action, Intent};
pub use tool::{ANALYZE_BILLS, Tool, ToolOutcome, ToolRegistry, WEB_SEARCH};
