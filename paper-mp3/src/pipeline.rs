//! End-to-end conversion of a text document into a chaptered MP3.
//!
//! normalize -> split -> classify -> synthesize -> concatenate -> chapters -> tags

use crate::audio::{
    self, ChapterMarker, ChunkTiming, OutputWriter, build_chapters, chapter_markers,
    mp3_duration_secs, write_chapter_tags,
};
use crate::text::{self, ChunkKind};
use crate::tts::{SynthesisDispatcher, Voices};
use anyhow::{Context, Result};
use futures_util::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use tts_client::SpeechSynthesizer;

/// Everything a run needs besides its input, output, and synthesizer.
#[derive(Debug, Clone)]
pub struct Settings {
    pub max_chunk_chars: usize,
    pub preface_title: String,
    /// Synthesis requests in flight at once (1 = strictly sequential)
    pub jobs: usize,
    pub voices: Voices,
    pub show_progress: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub chunks: usize,
    pub titles: usize,
    pub chapters: Vec<ChapterMarker>,
    pub total_ms: u32,
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} chunks ({eta}) {msg}")
    {
        pb.set_style(style.progress_chars("#>-"));
    }
    pb
}

/// Convert `input` into a chaptered MP3 at `output`.
///
/// Chunks may be synthesized concurrently (`settings.jobs`), but they are
/// always appended to the output in document order. On failure, temporary
/// chunk files are removed; the partially written output is left in place.
pub async fn run(
    input: &Path,
    output: &Path,
    settings: &Settings,
    synthesizer: &dyn SpeechSynthesizer,
) -> Result<RunSummary> {
    let raw = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let normalized = text::normalize_text(&raw);
    let chunks = text::split_document(&normalized, settings.max_chunk_chars)?;
    if chunks.is_empty() {
        anyhow::bail!("No text to synthesize in {}", input.display());
    }

    let kinds: Vec<ChunkKind> = chunks.iter().map(|c| text::classify(&c.text)).collect();
    let titles = kinds.iter().filter(|k| k.is_title()).count();
    log::info!(
        "Split {} into {} chunks ({} headings)",
        input.display(),
        chunks.len(),
        titles
    );

    let dispatcher = SynthesisDispatcher::new(synthesizer, &settings.voices);
    let mut writer = OutputWriter::create(output)?;
    let mut timings = Vec::with_capacity(chunks.len());
    let pb = progress_bar(chunks.len(), settings.show_progress);

    let mut artifacts = stream::iter(chunks.iter().zip(&kinds))
        .map(|(chunk, kind)| dispatcher.synthesize_chunk(chunk, kind, output))
        .buffered(settings.jobs.max(1));

    while let Some(artifact) = artifacts.next().await {
        let artifact = artifact?;
        let label = kinds[artifact.index()].label().map(str::to_string);
        let duration_secs = writer.append(artifact)?;
        timings.push(ChunkTiming {
            duration_secs,
            label,
        });
        pb.inc(1);
    }
    drop(artifacts);

    pb.finish_with_message("synthesis complete");
    let bytes = writer.bytes_written();
    writer.finish()?;

    let total_secs = mp3_duration_secs(output)?;
    let total_ms = audio::secs_to_ms(total_secs);
    log::info!(
        "Wrote {} ({:.1} MB, {:.1}s)",
        output.display(),
        bytes as f64 / (1024.0 * 1024.0),
        total_secs
    );

    let chapters = build_chapters(&timings, &settings.preface_title);
    let markers = chapter_markers(&chapters);
    write_chapter_tags(output, &markers, total_ms)?;

    Ok(RunSummary {
        chunks: chunks.len(),
        titles,
        chapters: markers,
        total_ms,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::{FRAME_SECS, silent_mp3};
    use std::path::PathBuf;
    use tempfile::TempDir;
    use tts_client::MockSynthesizer;

    fn settings() -> Settings {
        Settings {
            max_chunk_chars: 4999,
            preface_title: "Preface".to_string(),
            jobs: 1,
            voices: Voices::default(),
            show_progress: false,
        }
    }

    /// One frame of audio per character of request text.
    fn frames_per_char() -> MockSynthesizer {
        MockSynthesizer::with_responder(|req| silent_mp3(req.text.chars().count()))
    }

    fn ms(frames: usize) -> u32 {
        audio::secs_to_ms(frames as f64 * FRAME_SECS)
    }

    fn write_input(dir: &TempDir, text: &str) -> PathBuf {
        let path = dir.path().join("paper.txt");
        std::fs::write(&path, text).unwrap();
        path
    }

    fn leftover_chunk_files(dir: &TempDir) -> Vec<PathBuf> {
        std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| p.to_string_lossy().contains("out.mp3."))
            .collect()
    }

    #[tokio::test]
    async fn test_two_chapter_document() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "# Intro\nHello world.\n\n# Body\nThis is the rest.");
        let output = dir.path().join("out.mp3");
        let mock = frames_per_char();

        let summary = run(&input, &output, &settings(), &mock).await.unwrap();

        // "Intro" 5, "Hello world.\n\n" 14, "Body" 4, "This is the rest." 17
        assert_eq!(summary.chunks, 4);
        assert_eq!(summary.titles, 2);
        assert_eq!(summary.chapters.len(), 2);
        assert_eq!(summary.chapters[0].title, "Intro");
        assert_eq!(summary.chapters[0].start_ms, 0);
        assert_eq!(summary.chapters[0].end_ms, ms(19));
        assert_eq!(summary.chapters[1].title, "Body");
        assert_eq!(summary.chapters[1].start_ms, ms(19));
        assert_eq!(summary.chapters[1].end_ms, ms(40));
        assert_eq!(summary.total_ms, ms(40));

        let requests = mock.requests();
        let spoken: Vec<&str> = requests.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(spoken, vec!["Intro", "Hello world.\n\n", "Body", "This is the rest."]);
        assert_eq!(requests[0].voice.name, "en-US-Wavenet-B");
        assert_eq!(requests[1].voice.name, "en-US-Wavenet-J");

        assert!(leftover_chunk_files(&dir).is_empty());

        let tag = id3::Tag::read_from_path(&output).unwrap();
        use id3::TagLike;
        assert_eq!(tag.chapters().count(), 2);
        let total = ms(40).to_string();
        assert_eq!(
            tag.get("TLEN").and_then(|f| f.content().text()),
            Some(total.as_str())
        );
    }

    #[tokio::test]
    async fn test_output_holds_every_chunk() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "# A\nxx\n# B\nyyy");
        let output = dir.path().join("out.mp3");
        let mock = frames_per_char();

        run(&input, &output, &settings(), &mock).await.unwrap();

        // "A", "xx\n", "B", "yyy" after the ID3 tag
        let duration = mp3_duration_secs(&output).unwrap();
        assert!((duration - 8.0 * FRAME_SECS).abs() < 1e-6, "got {duration}");
    }

    #[tokio::test]
    async fn test_leading_body_gets_preface_chapter() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "Abstract text.\n# Methods\nWe did things.");
        let output = dir.path().join("out.mp3");
        let mock = frames_per_char();

        let summary = run(&input, &output, &settings(), &mock).await.unwrap();
        let titles: Vec<&str> = summary.chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Preface", "Methods"]);
        assert_eq!(summary.chapters[0].end_ms, ms(15));
        assert_eq!(summary.chapters.last().unwrap().end_ms, summary.total_ms);
    }

    #[tokio::test]
    async fn test_concurrent_jobs_keep_order() {
        let dir = TempDir::new().unwrap();
        let text = (0..12)
            .map(|i| format!("# Section {}\n{}\n", i, "word ".repeat(i + 1)))
            .collect::<String>();
        let input = write_input(&dir, &text);
        let output = dir.path().join("out.mp3");

        let sequential = frames_per_char();
        let expected = run(&input, &output, &settings(), &sequential).await.unwrap();

        let concurrent = frames_per_char();
        let mut parallel = settings();
        parallel.jobs = 4;
        let actual = run(&input, &output, &parallel, &concurrent).await.unwrap();

        assert_eq!(actual.chapters, expected.chapters);
        assert_eq!(actual.total_ms, expected.total_ms);
        assert_eq!(actual.chapters.len(), 12);
    }

    #[tokio::test]
    async fn test_ligatures_normalized_before_synthesis() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "The \u{fb01}rst result: a \u{226a} b.");
        let output = dir.path().join("out.mp3");
        let mock = frames_per_char();

        run(&input, &output, &settings(), &mock).await.unwrap();
        assert_eq!(
            mock.requests()[0].text,
            "The first result: a is much less than b."
        );
    }

    #[tokio::test]
    async fn test_synthesis_failure_cleans_up_chunks() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "# A\none\n# B\ntwo\n# C\nthree\n");
        let output = dir.path().join("out.mp3");
        let mock = MockSynthesizer::with_responder(|req| silent_mp3(req.text.len())).failing_from(3);

        let mut parallel = settings();
        parallel.jobs = 2;
        let err = run(&input, &output, &parallel, &mock).await.unwrap_err();

        assert!(err.to_string().contains("mock failed to synthesize chunk"));
        assert!(leftover_chunk_files(&dir).is_empty());
    }

    #[tokio::test]
    async fn test_unsplittable_input_does_no_work() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, &"x".repeat(6000));
        let output = dir.path().join("out.mp3");
        let mock = frames_per_char();

        let err = run(&input, &output, &settings(), &mock).await.unwrap_err();
        assert!(err.downcast_ref::<text::splitter::SegmentationError>().is_some());
        assert_eq!(mock.call_count(), 0);
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "  \n\n ");
        let output = dir.path().join("out.mp3");
        let mock = frames_per_char();

        let err = run(&input, &output, &settings(), &mock).await.unwrap_err();
        assert!(err.to_string().contains("No text"));
    }

    #[tokio::test]
    async fn test_missing_input() {
        let dir = TempDir::new().unwrap();
        let mock = frames_per_char();
        let err = run(
            &dir.path().join("absent.txt"),
            &dir.path().join("out.mp3"),
            &settings(),
            &mock,
        )
        .await
        .unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
