//! Audio assembly: concatenating chunk MP3s and tagging chapter markers.

mod artifact;
pub mod assembler;
pub mod metadata;
mod probe;

pub use artifact::ChunkArtifact;
pub use assembler::OutputWriter;
pub use metadata::{ChapterMarker, ChunkTiming, build_chapters, chapter_markers, write_chapter_tags};
pub use probe::mp3_duration_secs;

/// Convert seconds to whole milliseconds.
pub fn secs_to_ms(secs: f64) -> u32 {
    (secs * 1000.0).round() as u32
}
