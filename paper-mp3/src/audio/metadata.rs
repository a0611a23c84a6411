//! Chapter timeline reconciliation and ID3 chapter tags.

use super::secs_to_ms;
use anyhow::{Context, Result};
use id3::frame::{Chapter, TableOfContents};
use id3::{Content, ErrorKind, Frame, Tag, TagLike, Version};
use std::path::Path;

/// Element ID of the table of contents frame.
const TOC_ELEMENT_ID: &str = "toc";

/// CHAP byte offsets are unused; all bits set means "ignore".
const NO_OFFSET: u32 = u32::MAX;

/// Measured duration and heading label of one synthesized chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkTiming {
    pub duration_secs: f64,
    /// Heading label, or `None` for body text
    pub label: Option<String>,
}

/// A logical chapter: a heading plus the body chunks after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChapterEntry {
    pub title: String,
    pub duration_secs: f64,
}

impl ChapterEntry {
    pub fn new(title: impl Into<String>, duration_secs: f64) -> Self {
        Self {
            title: title.into(),
            duration_secs,
        }
    }
}

/// A chapter positioned on the output timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterMarker {
    /// ID3 element ID (`ch0`, `ch1`, ...)
    pub element_id: String,
    pub title: String,
    /// Start position in milliseconds
    pub start_ms: u32,
    /// End position in milliseconds
    pub end_ms: u32,
}

/// Fold chunk timings into chapters.
///
/// A titled chunk opens a new chapter; body chunks extend the latest one.
/// Body chunks before the first heading go to an implicit chapter named
/// `preface_title`, so every second of audio belongs to some chapter.
pub fn build_chapters(timings: &[ChunkTiming], preface_title: &str) -> Vec<ChapterEntry> {
    let mut chapters: Vec<ChapterEntry> = Vec::new();

    for timing in timings {
        if let Some(label) = &timing.label {
            chapters.push(ChapterEntry::new(label.clone(), timing.duration_secs));
        } else if let Some(current) = chapters.last_mut() {
            current.duration_secs += timing.duration_secs;
        } else {
            chapters.push(ChapterEntry::new(preface_title, timing.duration_secs));
        }
    }

    chapters
}

/// Lay chapters end to end starting at zero.
///
/// Boundaries come from the running total in seconds, so each chapter starts
/// exactly where the previous one ends and rounding never accumulates.
pub fn chapter_markers(chapters: &[ChapterEntry]) -> Vec<ChapterMarker> {
    let mut elapsed = 0.0;
    let mut start_ms = 0;

    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            elapsed += chapter.duration_secs;
            let end_ms = secs_to_ms(elapsed);
            let marker = ChapterMarker {
                element_id: format!("ch{}", i),
                title: chapter.title.clone(),
                start_ms,
                end_ms,
            };
            start_ms = end_ms;
            marker
        })
        .collect()
}

/// Write chapter frames, a table of contents, and the total length to `path`.
///
/// Any existing tag is kept apart from its chapter frames, which are replaced.
pub fn write_chapter_tags(path: &Path, markers: &[ChapterMarker], total_ms: u32) -> Result<()> {
    let mut tag = match Tag::read_from_path(path) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, ErrorKind::NoTag) => Tag::new(),
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read tag from {}", path.display()));
        }
    };

    tag.remove("CHAP");
    tag.remove("CTOC");
    tag.set_text("TLEN", total_ms.to_string());

    for marker in markers {
        let chapter = Chapter {
            element_id: marker.element_id.clone(),
            start_time: marker.start_ms,
            end_time: marker.end_ms,
            start_offset: NO_OFFSET,
            end_offset: NO_OFFSET,
            frames: vec![Frame::text("TIT2", marker.title.clone())],
        };
        tag.add_frame(Frame::with_content("CHAP", Content::Chapter(chapter)));
    }

    let toc = TableOfContents {
        element_id: TOC_ELEMENT_ID.to_string(),
        top_level: true,
        ordered: true,
        elements: markers.iter().map(|m| m.element_id.clone()).collect(),
        frames: Vec::new(),
    };
    tag.add_frame(Frame::with_content("CTOC", Content::TableOfContents(toc)));

    tag.write_to_path(path, Version::Id3v24)
        .with_context(|| format!("Failed to write chapter tags to {}", path.display()))?;

    for marker in markers {
        log::info!(
            "Chapter {}: {} ({} - {} ms)",
            marker.element_id,
            marker.title,
            marker.start_ms,
            marker.end_ms
        );
    }

    Ok(())
}
