//! Byte-level concatenation of per-chunk MP3 files.
//!
//! MP3 is a sequence of self-contained frames, so appending independently
//! encoded files yields a playable stream without re-encoding.

use super::artifact::ChunkArtifact;
use super::probe::mp3_duration_secs;
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Single writer for the output file.
///
/// The file is truncated on creation and closed when the writer is dropped,
/// including on error paths.
pub struct OutputWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    bytes_written: u64,
}

impl OutputWriter {
    /// Create (or truncate) the output file.
    pub fn create(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: BufWriter::new(file),
            bytes_written: 0,
        })
    }

    /// Measure an artifact, append its bytes, and delete it.
    ///
    /// Returns the artifact's duration in seconds.
    pub fn append(&mut self, artifact: ChunkArtifact) -> Result<f64> {
        let duration = mp3_duration_secs(artifact.path())
            .with_context(|| format!("Failed to measure chunk {}", artifact.index()))?;

        let data = fs::read(artifact.path())
            .with_context(|| format!("Failed to read {}", artifact.path().display()))?;
        self.writer
            .write_all(&data)
            .with_context(|| format!("Failed to append to {}", self.path.display()))?;
        self.bytes_written += data.len() as u64;

        log::debug!(
            "Appended chunk {} ({} bytes, {:.2}s)",
            artifact.index(),
            data.len(),
            duration
        );

        Ok(duration)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush everything to disk and close the file.
    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        self.writer.get_ref().sync_all()?;
        Ok(self.path)
    }
}
