//! Text processing for TTS: normalization, chunking, and heading detection.

mod normalize;
pub mod splitter;
mod title;

pub use normalize::normalize_text;
pub use splitter::split_document;
pub use title::classify;

/// A chunk of the document ready for TTS processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextChunk {
    /// Position of this chunk in the document
    pub index: usize,
    /// The text content
    pub text: String,
}

impl TextChunk {
    /// Create a new text chunk.
    pub fn new(index: usize, text: String) -> Self {
        Self { index, text }
    }
}

/// Whether a chunk is a section heading or body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkKind {
    /// A heading; holds the extracted label
    Title(String),
    /// Ordinary body text
    Body,
}

impl ChunkKind {
    /// The heading label, if this is a title chunk.
    pub fn label(&self) -> Option<&str> {
        match self {
            ChunkKind::Title(label) => Some(label.as_str()),
            ChunkKind::Body => None,
        }
    }

    pub fn is_title(&self) -> bool {
        matches!(self, ChunkKind::Title(_))
    }

    /// Text to send to the synthesizer: the label for titles, the whole chunk otherwise.
    pub fn speech_text<'a>(&'a self, chunk_text: &'a str) -> &'a str {
        match self {
            ChunkKind::Title(label) => label.as_str(),
            ChunkKind::Body => chunk_text,
        }
    }
}
