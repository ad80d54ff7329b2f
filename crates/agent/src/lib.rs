//! # CivicDraft Agent
//!
//! The conversational policy drafting pipeline: classify the user's intent,
//! gather outside context through tools, synthesize a reply and a document
//! change, and apply that change through the patch engine.
//!
//! The public surface is [`PolicyAgent::process`], which is total — every
//! internal failure mode (model errors, tool failures, timeouts, panics)
//! degrades to a well-formed [`AgentResponse`] rather than an error.

pub mod agent;
pub mod classifier;
pub mod runner;
pub mod synthesizer;

pub use agent::{AgentResponse, FALLBACK_REPLY, PolicyAgent};
pub use classifier::IntentClassifier;
pub use runner::ToolRunner;
pub use synthesizer::{ResponseSynthesizer, Synthesis};
