//! Speech synthesis client library for paper-mp3
//!
//! Provides a single interface over text-to-speech providers:
//! - Google Cloud Text-to-Speech (REST)
//! - Mock (deterministic, for tests)

pub mod config;
pub mod error;
pub mod provider;
pub mod providers;

pub use config::ProviderConfig;
pub use error::{Result, TtsError};
pub use provider::{
    AudioEncoding, SpeechSynthesizer, SynthesisRequest, SynthesizedAudio, VoiceParams,
};
pub use providers::{
    ACCESS_TOKEN_ENV, API_KEY_ENV, Credentials, GoogleCloudProvider, MockSynthesizer, get_provider,
};
