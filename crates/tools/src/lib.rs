//! External lookup tools for CivicDraft.
//!
//! Tools give the agent bounded, failure-tolerant access to outside context:
//! web research for a topic, and a lookup of prior legislation. Each tool is
//! a thin HTTP client over a configured endpoint; a tool that fails or times
//! out contributes nothing to the request rather than aborting it (that
//! wrapping lives in the agent crate).

pub mod bill_lookup;
pub mod web_research;

use civicdraft_core::tool::ToolRegistry;
use std::time::Duration;

pub use bill_lookup::BillLookupTool;
pub use civicdraft_core::tool::{ANALYZE_BILLS, WEB_SEARCH};
pub use web_research::WebResearchTool;

/// Create the default tool registry from endpoint URLs.
pub fn default_registry(
    research_url: impl Into<String>,
    bills_url: impl Into<String>,
    timeout: Duration,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(WebResearchTool::new(research_url, timeout)));
    registry.register(Box::new(BillLookupTool::new(bills_url, timeout)));
    registry
}
