//! paper-mp3 configuration management.

use crate::text::splitter::DEFAULT_MAX_CHARS;
use crate::tts::{
    DEFAULT_EFFECTS_PROFILE, MAX_SPEAKING_RATE, MIN_SPEAKING_RATE, VoiceProfile, Voices,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tts_client::ProviderConfig;

// Default values
const DEFAULT_PREFACE_TITLE: &str = "Preface";
const DEFAULT_JOBS: usize = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaperMp3Config {
    /// Maximum characters per synthesis request
    #[serde(default = "default_max_chunk_chars")]
    pub max_chunk_chars: usize,

    /// Chapter title for text before the first heading
    #[serde(default = "default_preface_title")]
    pub preface_title: String,

    /// Synthesis requests in flight at once
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Audio effects profiles requested from the provider
    #[serde(default = "default_effects_profile")]
    pub effects_profile: Vec<String>,

    /// Voice for section headings
    #[serde(default = "VoiceProfile::title_default")]
    pub title_voice: VoiceProfile,

    /// Voice for body text
    #[serde(default = "VoiceProfile::body_default")]
    pub body_voice: VoiceProfile,

    /// Speech provider credentials and endpoint
    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_max_chunk_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_preface_title() -> String {
    DEFAULT_PREFACE_TITLE.to_string()
}

fn default_jobs() -> usize {
    DEFAULT_JOBS
}

fn default_effects_profile() -> Vec<String> {
    vec![DEFAULT_EFFECTS_PROFILE.to_string()]
}

impl Default for PaperMp3Config {
    fn default() -> Self {
        Self {
            max_chunk_chars: default_max_chunk_chars(),
            preface_title: default_preface_title(),
            jobs: default_jobs(),
            effects_profile: default_effects_profile(),
            title_voice: VoiceProfile::title_default(),
            body_voice: VoiceProfile::body_default(),
            provider: ProviderConfig::default(),
        }
    }
}

impl PaperMp3Config {
    /// Get the config file path: ~/.config/cli-programs/paper-mp3.toml
    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").or_else(|_| std::env::var("USERPROFILE"))?;
        Ok(PathBuf::from(home)
            .join(".config")
            .join("cli-programs")
            .join("paper-mp3.toml"))
    }

    /// Load config from file, returning default if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)?;
        let config: PaperMp3Config = toml::from_str(&content)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_chars == 0 {
            anyhow::bail!("max_chunk_chars must be at least 1");
        }
        if self.jobs == 0 {
            anyhow::bail!("jobs must be at least 1");
        }
        if self.preface_title.trim().is_empty() {
            anyhow::bail!("preface_title must not be empty");
        }
        for (which, voice) in [("title_voice", &self.title_voice), ("body_voice", &self.body_voice)] {
            if voice.name.trim().is_empty() {
                anyhow::bail!("{}.name must not be empty", which);
            }
            if !(MIN_SPEAKING_RATE..=MAX_SPEAKING_RATE).contains(&voice.speaking_rate) {
                anyhow::bail!(
                    "{}.speaking_rate must be between {} and {}",
                    which,
                    MIN_SPEAKING_RATE,
                    MAX_SPEAKING_RATE
                );
            }
        }
        Ok(())
    }

    /// Voice settings for the synthesis dispatcher.
    pub fn voices(&self) -> Voices {
        Voices {
            title: self.title_voice.clone(),
            body: self.body_voice.clone(),
            effects_profile: self.effects_profile.clone(),
        }
    }
}
