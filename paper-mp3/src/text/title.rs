//! Heading detection for chunks.

use once_cell::sync::Lazy;
use regex::Regex;

use super::ChunkKind;

/// A chunk consisting of exactly one heading line.
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[\t ]*#+([^\r\n]*)(?:\r\n|\n|\r)?$").expect("title pattern should compile")
});

/// Classify a chunk as a title (with its label) or body text.
///
/// Trailing `#` decoration is not part of the label, so `## Methods ##`
/// yields `Methods`. A heading with no text (`###`) is body.
pub fn classify(chunk_text: &str) -> ChunkKind {
    let Some(caps) = HEADING.captures(chunk_text) else {
        return ChunkKind::Body;
    };

    let label = caps[1]
        .trim_end_matches(|c: char| c == '#' || c.is_whitespace())
        .trim();

    if label.is_empty() {
        ChunkKind::Body
    } else {
        ChunkKind::Title(label.to_string())
    }
}
