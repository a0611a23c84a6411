//! Speech synthesis provider implementations

mod google;
pub mod mock;

pub use google::{Credentials, GoogleCloudProvider};
pub use mock::MockSynthesizer;

use crate::config::ProviderConfig;
use crate::error::{Result, TtsError};
use crate::provider::SpeechSynthesizer;

/// Environment variable holding a Google Cloud API key
pub const API_KEY_ENV: &str = "GOOGLE_TTS_API_KEY";

/// Environment variable holding an OAuth access token
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_ACCESS_TOKEN";

/// Create the Google Cloud provider from config and the process environment
pub fn get_provider(config: &ProviderConfig) -> Result<Box<dyn SpeechSynthesizer>> {
    let credentials = resolve_credentials(config, |name| std::env::var(name).ok())?;
    Ok(Box::new(GoogleCloudProvider::new(
        credentials,
        config.base_url.clone(),
    )?))
}

/// Pick credentials: config before environment, API key before access token
fn resolve_credentials(
    config: &ProviderConfig,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Credentials> {
    if let Some(key) = config.api_key.clone().or_else(|| env(API_KEY_ENV)) {
        return Ok(Credentials::ApiKey(key));
    }

    if let Some(token) = config.access_token.clone().or_else(|| env(ACCESS_TOKEN_ENV)) {
        return Ok(Credentials::AccessToken(token));
    }

    Err(TtsError::MissingCredentials {
        provider: "Google Cloud Text-to-Speech".to_string(),
        env_var: format!("{} or {}", API_KEY_ENV, ACCESS_TOKEN_ENV),
    })
}
