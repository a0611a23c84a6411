//! paper-mp3 - Convert markdown-headed papers into chaptered MP3 audiobooks

mod audio;
mod config;
mod pipeline;
mod text;
mod tts;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use config::PaperMp3Config;
use pipeline::Settings;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "paper-mp3")]
#[command(about = "Convert markdown-headed text into a chaptered MP3 using cloud TTS", long_about = None)]
#[command(version)]
struct Args {
    /// Path to the input text file
    input: Option<PathBuf>,

    /// Path of the MP3 file to write
    output: Option<PathBuf>,

    /// Synthesis requests in flight at once
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Maximum characters per synthesis request
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Chapter title for text before the first heading
    #[arg(long)]
    preface_title: Option<String>,

    /// Enable debug output
    #[arg(short, long, default_value_t = false)]
    debug: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set the voice used for headings
    SetTitleVoice {
        /// Provider voice name (e.g. en-US-Wavenet-B)
        name: String,
    },
    /// Set the voice used for body text
    SetBodyVoice {
        /// Provider voice name (e.g. en-US-Wavenet-J)
        name: String,
    },
    /// Set the default number of concurrent requests
    SetJobs {
        /// Value (at least 1)
        value: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Some(Commands::Config { action }) = &args.command {
        return handle_config_command(action);
    }

    let (Some(input), Some(output)) = (args.input.clone(), args.output.clone()) else {
        Args::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                "both <INPUT> and <OUTPUT> are required",
            )
            .exit();
    };

    let mut config = PaperMp3Config::load().context("Failed to load configuration")?;
    if let Some(jobs) = args.jobs {
        config.jobs = jobs;
    }
    if let Some(max) = args.max_chunk_chars {
        config.max_chunk_chars = max;
    }
    if let Some(title) = &args.preface_title {
        config.preface_title = title.clone();
    }
    config.validate()?;

    log::debug!("Input: {}", input.display());
    log::debug!("Output: {}", output.display());
    log::debug!("Max chunk chars: {}", config.max_chunk_chars);
    log::debug!("Jobs: {}", config.jobs);
    log::debug!(
        "Voices: {} (titles), {} (body)",
        config.title_voice.name,
        config.body_voice.name
    );

    let synthesizer = tts_client::get_provider(&config.provider)?;

    let settings = Settings {
        max_chunk_chars: config.max_chunk_chars,
        preface_title: config.preface_title.clone(),
        jobs: config.jobs,
        voices: config.voices(),
        show_progress: true,
    };

    let summary = pipeline::run(&input, &output, &settings, synthesizer.as_ref()).await?;

    log::info!(
        "Done: {} chunks ({} headings), {} chapters, {:.1}s of audio in {}",
        summary.chunks,
        summary.titles,
        summary.chapters.len(),
        f64::from(summary.total_ms) / 1000.0,
        output.display()
    );

    Ok(())
}

fn handle_config_command(action: &ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = PaperMp3Config::load()?;
            println!("Configuration file: {:?}", PaperMp3Config::config_path()?);
            println!();
            println!("max_chunk_chars = {}", config.max_chunk_chars);
            println!("preface_title = \"{}\"", config.preface_title);
            println!("jobs = {}", config.jobs);
            println!("effects_profile = {:?}", config.effects_profile);
            println!(
                "title_voice = \"{}\" ({}, rate {})",
                config.title_voice.name,
                config.title_voice.language_code,
                config.title_voice.speaking_rate
            );
            println!(
                "body_voice = \"{}\" ({}, rate {})",
                config.body_voice.name,
                config.body_voice.language_code,
                config.body_voice.speaking_rate
            );
            if config.provider.api_key.is_some() {
                println!("api_key = (set)");
            } else {
                println!("api_key = (from {})", tts_client::API_KEY_ENV);
            }
            if let Some(url) = &config.provider.base_url {
                println!("base_url = \"{}\"", url);
            }
        }
        ConfigAction::SetTitleVoice { name } => {
            let mut config = PaperMp3Config::load()?;
            config.title_voice.name = name.clone();
            config.save()?;
            println!("Title voice set to: {}", name);
        }
        ConfigAction::SetBodyVoice { name } => {
            let mut config = PaperMp3Config::load()?;
            config.body_voice.name = name.clone();
            config.save()?;
            println!("Body voice set to: {}", name);
        }
        ConfigAction::SetJobs { value } => {
            let mut config = PaperMp3Config::load()?;
            config.jobs = *value;
            config.save()?;
            println!("Default jobs set to: {}", config.jobs);
        }
    }
    Ok(())
}
