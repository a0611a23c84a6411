//! Splitting documents into provider-sized chunks.
//!
//! Headings always become their own chunk. Oversized chunks are then broken
//! on progressively finer separators, one tier at a time across the whole
//! document, so a paragraph break anywhere is preferred over a sentence break
//! anywhere.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use super::TextChunk;

/// Default maximum chunk size in characters.
pub const DEFAULT_MAX_CHARS: usize = 4999;

/// A heading line: optional blanks, one or more `#`, rest of the line and its terminator.
static HEADING_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[\t ]*#+[^\r\n]*(?:\r\n|\n|\r|\z)").expect("heading pattern should compile")
});

/// A chunk that no separator could bring under the size limit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Couldn't divide chunk {index} ({len} chars) to {max} chars or fewer")]
pub struct SegmentationError {
    /// Position of the offending chunk
    pub index: usize,
    /// Its length in characters
    pub len: usize,
    /// The limit it exceeds
    pub max: usize,
}

/// Separator tiers, coarsest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Separator {
    Paragraph,
    LineEndSentence,
    Sentence,
    Word,
}

impl Separator {
    /// Order in which tiers are tried.
    pub const TIERS: [Separator; 4] = [
        Separator::Paragraph,
        Separator::LineEndSentence,
        Separator::Sentence,
        Separator::Word,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Separator::Paragraph => "\n\n",
            Separator::LineEndSentence => ".\n",
            Separator::Sentence => ". ",
            Separator::Word => " ",
        }
    }

    /// Split on this separator, putting it back at the end of each piece it
    /// followed. Blank pieces are dropped together with their separator.
    pub fn split(self, text: &str) -> Vec<String> {
        let sep = self.as_str();
        let parts: Vec<&str> = text.split(sep).collect();
        let last = parts.len() - 1;

        parts
            .into_iter()
            .enumerate()
            .filter(|(_, piece)| !piece.trim().is_empty())
            .map(|(i, piece)| {
                if i < last {
                    format!("{piece}{sep}")
                } else {
                    piece.to_string()
                }
            })
            .collect()
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text at heading lines, keeping each heading line as its own piece.
fn split_headings(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for heading in HEADING_LINE.find_iter(text) {
        pieces.push(&text[last..heading.start()]);
        pieces.push(heading.as_str());
        last = heading.end();
    }
    pieces.push(&text[last..]);

    pieces
        .into_iter()
        .filter(|piece| !piece.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Greedily join consecutive pieces while they fit within `max_chars`.
///
/// A single piece longer than the limit is kept whole for the next tier.
fn reassemble_pieces(pieces: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let len = char_len(&piece);
        if !current.is_empty() && current_len + len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(&piece);
        current_len += len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

/// Apply one separator tier to every chunk that is still too long.
fn apply_tier(chunks: Vec<String>, separator: Separator, max_chars: usize) -> Vec<String> {
    chunks
        .into_iter()
        .flat_map(|chunk| {
            if char_len(&chunk) > max_chars && chunk.contains(separator.as_str()) {
                reassemble_pieces(separator.split(&chunk), max_chars)
            } else {
                vec![chunk]
            }
        })
        .collect()
}

/// Split a normalized document into chunks of at most `max_chars` characters.
///
/// # Errors
/// Returns [`SegmentationError`] when a chunk contains none of the separators
/// needed to bring it under the limit.
pub fn split_document(text: &str, max_chars: usize) -> Result<Vec<TextChunk>, SegmentationError> {
    let mut chunks = split_headings(text);

    for separator in Separator::TIERS {
        if chunks.iter().all(|c| char_len(c) <= max_chars) {
            break;
        }
        chunks = apply_tier(chunks, separator, max_chars);
    }

    if let Some((index, chunk)) = chunks
        .iter()
        .enumerate()
        .find(|(_, c)| char_len(c) > max_chars)
    {
        return Err(SegmentationError {
            index,
            len: char_len(chunk),
            max: max_chars,
        });
    }

    Ok(chunks
        .into_iter()
        .enumerate()
        .map(|(index, text)| TextChunk::new(index, text))
        .collect())
}
