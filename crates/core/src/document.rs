//! Policy document domain type and the section patch engine.
//!
//! A document body is markdown composed of ordered blocks, each optionally
//! headed by a level-2 heading line (`## Section Title`). Headings are unique
//! by normalized (trimmed, case-insensitive) title within one document.
//!
//! Mutation happens exclusively through [`Document::apply`], which parses the
//! body into an ordered block list, transforms it, and re-serializes — a
//! structural transform rather than a regex string edit, so an upsert can
//! never corrupt unrelated sections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The mutable markdown artifact the agent edits.
///
/// The agent never persists or deletes a document; it consumes a snapshot and
/// returns a new immutable snapshot. Persistence is the caller's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document title (not part of the markdown body)
    pub title: String,

    /// Markdown body, a sequence of optionally-headed blocks
    pub content: String,

    /// When the document was last mutated
    pub last_updated: DateTime<Utc>,
}

/// A change requested by the response synthesizer, applied by the patch
/// engine.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentDelta {
    /// Replace the body of the named section, or append it if absent.
    SectionUpsert { title: String, content: String },

    /// Overwrite the document title and/or whole body.
    Replace {
        title: Option<String>,
        content: Option<String>,
    },

    /// Leave the document untouched.
    NoChange,
}

/// A parsed view of one level-2-headed block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    /// Heading title with original casing, without the `## ` marker
    pub title: String,

    /// Body text between this heading and the next (trailing blank lines
    /// trimmed)
    pub body: String,
}

impl Document {
    /// Create a document from a title and starting body.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            last_updated: Utc::now(),
        }
    }

    /// The ordered list of level-2-headed sections in the body.
    ///
    /// Preamble text before the first heading is not a section.
    pub fn sections(&self) -> Vec<Section> {
        parse_blocks(&self.content)
            .sections
            .into_iter()
            .map(|raw| Section {
                title: raw.title().to_string(),
                body: raw.body.join("\n").trim_end().to_string(),
            })
            .collect()
    }

    /// The body of the first section whose normalized title matches.
    pub fn section_body(&self, title: &str) -> Option<String> {
        let wanted = normalize_title(title);
        self.sections()
            .into_iter()
            .find(|s| normalize_title(&s.title) == wanted)
            .map(|s| s.body)
    }

    /// Apply a delta, returning a new snapshot.
    ///
    /// Pure, deterministic, total. `NoChange` returns the input unchanged and
    /// does not bump `last_updated`; the other variants stamp the new
    /// snapshot with the current time.
    pub fn apply(&self, delta: &DocumentDelta) -> Document {
        match delta {
            DocumentDelta::NoChange => self.clone(),
            DocumentDelta::SectionUpsert { title, content } => Document {
                title: self.title.clone(),
                content: upsert_section(&self.content, title, content),
                last_updated: Utc::now(),
            },
            DocumentDelta::Replace { title, content } => Document {
                title: title.clone().unwrap_or_else(|| self.title.clone()),
                content: content.clone().unwrap_or_else(|| self.content.clone()),
                last_updated: Utc::now(),
            },
        }
    }
}

/// Trim and case-fold a heading title for matching.
fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A raw block: the verbatim heading line plus the verbatim body lines.
struct RawSection {
    /// The full heading line, e.g. `## Funding Model`
    heading_line: String,

    /// Lines between this heading and the next heading (or end of input)
    body: Vec<String>,
}

impl RawSection {
    fn title(&self) -> &str {
        heading_title(&self.heading_line).unwrap_or("")
    }
}

struct Blocks {
    /// Lines before the first heading
    preamble: Vec<String>,
    sections: Vec<RawSection>,
}

/// The title of a level-2 heading line, if the line is one.
///
/// `### Deeper` has no `"## "` prefix (its third character is `#`), so
/// sub-headings stay inside their parent section's body.
fn heading_title(line: &str) -> Option<&str> {
    line.strip_prefix("## ").map(str::trim)
}

fn parse_blocks(content: &str) -> Blocks {
    let mut preamble = Vec::new();
    let mut sections: Vec<RawSection> = Vec::new();

    for line in content.split('\n') {
        if heading_title(line).is_some() {
            sections.push(RawSection {
                heading_line: line.to_string(),
                body: Vec::new(),
            });
        } else if let Some(current) = sections.last_mut() {
            current.body.push(line.to_string());
        } else {
            preamble.push(line.to_string());
        }
    }

    Blocks { preamble, sections }
}

fn render_blocks(blocks: &Blocks) -> String {
    let mut lines = blocks.preamble.clone();
    for section in &blocks.sections {
        lines.push(section.heading_line.clone());
        lines.extend(section.body.iter().cloned());
    }
    lines.join("\n")
}

/// Replace the first matching section's body, or append a new section.
///
/// A title match is case/whitespace-insensitive and keeps the existing
/// heading's original casing; a new section uses the delta's casing. When the
/// document contains duplicate headings with the same normalized title (a
/// pre-existing malformed-document condition) only the first match is
/// updated and the rest are left untouched.
fn upsert_section(document_content: &str, title: &str, section_content: &str) -> String {
    let wanted = normalize_title(title);
    let mut blocks = parse_blocks(document_content);

    let existing = blocks
        .sections
        .iter_mut()
        .find(|s| normalize_title(s.title()) == wanted);

    match existing {
        Some(section) => {
            section.body = replacement_body(section_content);
            render_blocks(&blocks)
        }
        None => {
            // Pure append, preceded by a blank line when non-empty.
            if document_content.trim().is_empty() {
                format!("## {}\n{}", title.trim(), section_content)
            } else {
                format!(
                    "{}\n\n## {}\n{}",
                    document_content.trim_end(),
                    title.trim(),
                    section_content
                )
            }
        }
    }
}

/// Body lines for a replaced section, with a separating blank line so a
/// following heading does not abut the new text.
fn replacement_body(content: &str) -> Vec<String> {
    let mut lines: Vec<String> = content.trim_end().split('\n').map(String::from).collect();
    lines.push(String::new());
    lines
}
