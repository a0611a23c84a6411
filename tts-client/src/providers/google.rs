//! Google Cloud Text-to-Speech provider
//!
//! Direct HTTP implementation of the `text:synthesize` REST endpoint.

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64_STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TtsError};
use crate::provider::{AudioEncoding, SpeechSynthesizer, SynthesisRequest, SynthesizedAudio};

const GOOGLE_TTS_BASE_URL: &str = "https://texttospeech.googleapis.com";
const SYNTHESIZE_PATH: &str = "/v1/text:synthesize";

/// How requests are authenticated
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Sent as the `key` query parameter
    ApiKey(String),
    /// Sent as a bearer token
    AccessToken(String),
}

/// Provider for Google Cloud Text-to-Speech
pub struct GoogleCloudProvider {
    credentials: Credentials,
    endpoint: String,
    client: Client,
}

impl GoogleCloudProvider {
    /// Create a new Google provider, optionally against a custom base URL
    ///
    /// A base URL that is not an absolute http(s) URL is a configuration error.
    pub fn new(credentials: Credentials, base_url: Option<String>) -> Result<Self> {
        let base_url = base_url.unwrap_or_else(|| GOOGLE_TTS_BASE_URL.to_string());
        let parsed = reqwest::Url::parse(&base_url)
            .map_err(|e| TtsError::ConfigError(format!("Invalid base_url '{}': {}", base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(TtsError::ConfigError(format!(
                "base_url must use http or https, got '{}'",
                parsed.scheme()
            )));
        }
        let endpoint = format!("{}{}", base_url.trim_end_matches('/'), SYNTHESIZE_PATH);

        Ok(Self {
            credentials,
            endpoint,
            client: Client::new(),
        })
    }
}

// Google API request/response types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeBody<'a> {
    input: Input<'a>,
    voice: Voice<'a>,
    audio_config: AudioConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Input<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Voice<'a> {
    language_code: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioConfig<'a> {
    audio_encoding: AudioEncoding,
    speaking_rate: f32,
    #[serde(skip_serializing_if = "no_effects")]
    effects_profile_id: &'a [String],
}

fn no_effects(profile: &&[String]) -> bool {
    profile.is_empty()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SynthesizeResponse {
    audio_content: String,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

fn build_body(request: &SynthesisRequest) -> SynthesizeBody<'_> {
    SynthesizeBody {
        input: Input {
            text: &request.text,
        },
        voice: Voice {
            language_code: &request.voice.language_code,
            name: &request.voice.name,
        },
        audio_config: AudioConfig {
            audio_encoding: request.audio_encoding,
            speaking_rate: request.speaking_rate,
            effects_profile_id: &request.effects_profile,
        },
    }
}

/// Decode the base64 `audioContent` field of a successful response
fn decode_audio(body: &str) -> Result<Vec<u8>> {
    let response: SynthesizeResponse = serde_json::from_str(body)
        .map_err(|e| TtsError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    BASE64_STANDARD
        .decode(response.audio_content.as_bytes())
        .map_err(|e| TtsError::InvalidResponse(format!("audioContent is not base64: {}", e)))
}

/// Map a non-success status and body to an error
fn error_from_status(status: u16, retry_after: Option<u64>, body: &str) -> TtsError {
    if status == 429 {
        return TtsError::RateLimited { retry_after };
    }

    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(error_response) => error_response.error.message,
        Err(_) => body.to_string(),
    };

    TtsError::ApiError {
        message,
        status_code: Some(status),
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleCloudProvider {
    async fn synthesize(&self, request: &SynthesisRequest) -> Result<SynthesizedAudio> {
        let mut builder = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(&build_body(request));

        builder = match &self.credentials {
            Credentials::ApiKey(key) => builder.query(&[("key", key)]),
            Credentials::AccessToken(token) => builder.bearer_auth(token),
        };

        let response = builder.send().await.map_err(|e| TtsError::ApiError {
            message: format!("Request failed: {}", e),
            status_code: None,
        })?;

        let status = response.status();
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok());

        let body = response.text().await.map_err(|e| TtsError::ApiError {
            message: format!("Failed to read response body: {}", e),
            status_code: Some(status.as_u16()),
        })?;

        if !status.is_success() {
            return Err(error_from_status(status.as_u16(), retry_after, &body));
        }

        Ok(SynthesizedAudio {
            audio: decode_audio(&body)?,
        })
    }

    fn name(&self) -> &'static str {
        "Google Cloud TTS"
    }
}
