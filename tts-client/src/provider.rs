use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;

/// Audio codec requested from the provider
///
/// Only MP3 is requested: chunk files are joined by byte concatenation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AudioEncoding {
    #[default]
    Mp3,
}

/// Voice selection for a request
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceParams {
    pub name: String,
    pub language_code: String,
}

/// Request to send to a speech synthesis provider
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub voice: VoiceParams,
    pub speaking_rate: f32,
    pub audio_encoding: AudioEncoding,
    /// Post-processing presets, e.g. "headphone-class-device"
    pub effects_profile: Vec<String>,
}

/// Encoded audio returned by a provider
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    pub audio: Vec<u8>,
}

/// Trait for speech synthesis providers
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one request into encoded audio bytes
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio>;

    /// Get the provider name for display
    fn name(&self) -> &'static str;
}
