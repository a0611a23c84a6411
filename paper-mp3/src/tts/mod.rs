//! Synthesis dispatch: voice selection per chunk kind and temporary artifacts.

use crate::audio::ChunkArtifact;
use crate::text::{ChunkKind, TextChunk};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tts_client::{AudioEncoding, SpeechSynthesizer, SynthesisRequest, VoiceParams};

/// Default effects profile: tuned for headphone playback.
pub const DEFAULT_EFFECTS_PROFILE: &str = "headphone-class-device";

/// Slowest speaking rate the provider accepts.
pub const MIN_SPEAKING_RATE: f32 = 0.25;

/// Fastest speaking rate the provider accepts.
pub const MAX_SPEAKING_RATE: f32 = 4.0;

/// A voice and the rate it speaks at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceProfile {
    /// Provider voice name, e.g. "en-US-Wavenet-J"
    pub name: String,

    /// BCP-47 language code
    #[serde(default = "default_language_code")]
    pub language_code: String,

    /// Speaking rate multiplier (0.25-4.0)
    pub speaking_rate: f32,
}

fn default_language_code() -> String {
    "en-US".to_string()
}

impl VoiceProfile {
    pub fn new(name: impl Into<String>, speaking_rate: f32) -> Self {
        Self {
            name: name.into(),
            language_code: default_language_code(),
            speaking_rate,
        }
    }

    /// Voice for section headings.
    pub fn title_default() -> Self {
        Self::new("en-US-Wavenet-B", 1.2)
    }

    /// Voice for body text.
    pub fn body_default() -> Self {
        Self::new("en-US-Wavenet-J", 1.5)
    }
}

/// Voice settings for a run.
#[derive(Debug, Clone, PartialEq)]
pub struct Voices {
    pub title: VoiceProfile,
    pub body: VoiceProfile,
    pub effects_profile: Vec<String>,
}

impl Default for Voices {
    fn default() -> Self {
        Self {
            title: VoiceProfile::title_default(),
            body: VoiceProfile::body_default(),
            effects_profile: vec![DEFAULT_EFFECTS_PROFILE.to_string()],
        }
    }
}

/// Sends chunks to the synthesizer with the voice for their kind.
pub struct SynthesisDispatcher<'a> {
    synthesizer: &'a dyn SpeechSynthesizer,
    voices: &'a Voices,
}

impl<'a> SynthesisDispatcher<'a> {
    pub fn new(synthesizer: &'a dyn SpeechSynthesizer, voices: &'a Voices) -> Self {
        Self {
            synthesizer,
            voices,
        }
    }

    /// Build the provider request for a chunk.
    ///
    /// Titles are spoken from their label, never the raw `#` line.
    pub fn request_for(&self, chunk: &TextChunk, kind: &ChunkKind) -> SynthesisRequest {
        let profile = if kind.is_title() {
            &self.voices.title
        } else {
            &self.voices.body
        };

        SynthesisRequest {
            text: kind.speech_text(&chunk.text).to_string(),
            voice: VoiceParams {
                name: profile.name.clone(),
                language_code: profile.language_code.clone(),
            },
            speaking_rate: profile.speaking_rate,
            audio_encoding: AudioEncoding::Mp3,
            effects_profile: self.voices.effects_profile.clone(),
        }
    }

    /// Synthesize one chunk into its temporary file next to `output`.
    ///
    /// Provider errors are returned as-is; there is no retry.
    pub async fn synthesize_chunk(
        &self,
        chunk: &TextChunk,
        kind: &ChunkKind,
        output: &Path,
    ) -> Result<ChunkArtifact> {
        let request = self.request_for(chunk, kind);
        log::debug!(
            "Synthesizing chunk {} ({} chars, voice {})",
            chunk.index,
            request.text.chars().count(),
            request.voice.name
        );

        let audio = self
            .synthesizer
            .synthesize(&request)
            .await
            .with_context(|| {
                format!(
                    "{} failed to synthesize chunk {}",
                    self.synthesizer.name(),
                    chunk.index
                )
            })?;

        ChunkArtifact::write(output, chunk.index, &audio.audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tts_client::MockSynthesizer;

    fn chunk(index: usize, text: &str) -> TextChunk {
        TextChunk::new(index, text.to_string())
    }

    #[test]
    fn test_default_voices() {
        let voices = Voices::default();
        assert_eq!(voices.title.name, "en-US-Wavenet-B");
        assert_eq!(voices.title.speaking_rate, 1.2);
        assert_eq!(voices.body.name, "en-US-Wavenet-J");
        assert_eq!(voices.body.speaking_rate, 1.5);
        assert_eq!(voices.title.language_code, "en-US");
        assert_eq!(voices.effects_profile, vec!["headphone-class-device"]);
    }

    #[test]
    fn test_title_request_uses_label_and_title_voice() {
        let mock = MockSynthesizer::always_succeeds(Vec::new());
        let voices = Voices::default();
        let dispatcher = SynthesisDispatcher::new(&mock, &voices);

        let request = dispatcher.request_for(
            &chunk(0, "## Intro ##\n"),
            &ChunkKind::Title("Intro".to_string()),
        );
        assert_eq!(request.text, "Intro");
        assert_eq!(request.voice.name, "en-US-Wavenet-B");
        assert_eq!(request.speaking_rate, 1.2);
        assert_eq!(request.audio_encoding, AudioEncoding::Mp3);
        assert_eq!(request.effects_profile, vec!["headphone-class-device"]);
    }

    #[test]
    fn test_body_request_uses_full_text_and_body_voice() {
        let mock = MockSynthesizer::always_succeeds(Vec::new());
        let voices = Voices::default();
        let dispatcher = SynthesisDispatcher::new(&mock, &voices);

        let request = dispatcher.request_for(&chunk(1, "Hello world.\n\n"), &ChunkKind::Body);
        assert_eq!(request.text, "Hello world.\n\n");
        assert_eq!(request.voice.name, "en-US-Wavenet-J");
        assert_eq!(request.speaking_rate, 1.5);
    }

    #[tokio::test]
    async fn test_synthesize_chunk_writes_artifact() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.mp3");
        let mock = MockSynthesizer::always_succeeds(vec![9, 8, 7]);
        let voices = Voices::default();
        let dispatcher = SynthesisDispatcher::new(&mock, &voices);

        let artifact = dispatcher
            .synthesize_chunk(&chunk(4, "Body text."), &ChunkKind::Body, &output)
            .await
            .unwrap();

        assert_eq!(artifact.index(), 4);
        assert_eq!(artifact.path(), temp_dir.path().join("out.mp3.4"));
        assert_eq!(std::fs::read(artifact.path()).unwrap(), vec![9, 8, 7]);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.mp3");
        let mock = MockSynthesizer::always_fails();
        let voices = Voices::default();
        let dispatcher = SynthesisDispatcher::new(&mock, &voices);

        let err = dispatcher
            .synthesize_chunk(&chunk(0, "text"), &ChunkKind::Body, &output)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("chunk 0"));
        assert_eq!(mock.call_count(), 1);
        assert!(!temp_dir.path().join("out.mp3.0").exists());
    }
}
