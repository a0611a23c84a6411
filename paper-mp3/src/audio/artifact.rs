//! Per-chunk temporary audio files.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Synthesized audio for one chunk, stored next to the output file.
///
/// The file is removed when the artifact is dropped, whether it was consumed
/// by the concatenator or abandoned because the run failed.
#[derive(Debug)]
pub struct ChunkArtifact {
    index: usize,
    path: PathBuf,
}

impl ChunkArtifact {
    /// Temporary path for chunk `index`: the output path with `.<index>` appended.
    pub fn path_for(output: &Path, index: usize) -> PathBuf {
        let mut path = OsString::from(output.as_os_str());
        path.push(format!(".{}", index));
        PathBuf::from(path)
    }

    /// Write `audio` to the temporary file for chunk `index`.
    pub fn write(output: &Path, index: usize, audio: &[u8]) -> Result<Self> {
        // Own the path before writing so a partial write is cleaned up too.
        let artifact = Self {
            index,
            path: Self::path_for(output, index),
        };
        fs::write(&artifact.path, audio)
            .with_context(|| format!("Failed to write {}", artifact.path.display()))?;
        Ok(artifact)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ChunkArtifact {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != ErrorKind::NotFound {
                log::warn!("Failed to remove {}: {}", self.path.display(), e);
            }
        }
    }
}
