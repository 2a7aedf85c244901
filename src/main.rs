//! Katari - Narrated Video Assembly Workflow
//!
//! This is the main entry point for the Katari application, which turns a
//! generated story into a narrated video using TTS and ffmpeg: per-sentence
//! speech synthesis, per-sentence imagery, and burned-in captions.

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{info, Level};
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use katari::cli::{Args, Commands};
use katari::config::Config;
use katari::pipeline::{AssemblyJob, Pipeline};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging to both console and file
    setup_logging(args.verbose)?;

    // Load configuration
    let config = match &args.config {
        Some(config_path) => Config::from_file(config_path)?,
        None => {
            // Try to load config.toml from current directory first
            if Path::new("config.toml").exists() {
                info!("Found config.toml in current directory, loading...");
                Config::from_file("config.toml")?
            } else {
                Config::default()
            }
        }
    };

    let pipeline = Pipeline::new(config)?;

    match args.command {
        Commands::Generate {
            story,
            images,
            voice_url,
            language,
            output,
        } => {
            info!("Generating narrated video for story: {}", story.display());

            let story_text = read_story(&story)?;
            let image_urls = read_url_list(&images)?;
            let language = resolve_language(&pipeline, language);

            let audio_urls = pipeline
                .synthesize_story(&story_text, voice_url.as_deref(), &language)
                .await?;
            if audio_urls.is_empty() {
                anyhow::bail!("No audio was generated for any segment");
            }

            let job = AssemblyJob {
                story: story_text,
                image_urls,
                audio_urls,
            };
            let video_url = pipeline.assemble(&job, output.as_deref()).await?;
            println!("{}", video_url);
        }
        Commands::Synthesize {
            story,
            voice_url,
            language,
        } => {
            info!("Synthesizing narration for story: {}", story.display());

            let story_text = read_story(&story)?;
            let language = resolve_language(&pipeline, language);

            let audio_urls = pipeline
                .synthesize_story(&story_text, voice_url.as_deref(), &language)
                .await?;
            if audio_urls.is_empty() {
                anyhow::bail!("No audio was generated for any segment");
            }
            for url in audio_urls {
                println!("{}", url);
            }
        }
        Commands::Subtitles {
            story,
            audio,
            output,
        } => {
            info!("Building subtitle track for story: {}", story.display());

            let story_text = read_story(&story)?;
            let audio_urls = read_url_list(&audio)?;

            pipeline.subtitles(&story_text, &audio_urls, &output).await?;
            println!("{}", output.display());
        }
        Commands::Assemble {
            story,
            images,
            audio,
            output,
        } => {
            info!("Assembling narrated video for story: {}", story.display());

            let job = AssemblyJob {
                story: read_story(&story)?,
                image_urls: read_url_list(&images)?,
                audio_urls: read_url_list(&audio)?,
            };
            let video_url = pipeline.assemble(&job, output.as_deref()).await?;
            println!("{}", video_url);
        }
    }

    info!("Katari workflow completed successfully");
    Ok(())
}

/// Setup logging to both console and file
fn setup_logging(verbose: bool) -> Result<()> {
    // Create log directory
    let katari_dir = std::env::current_dir()?.join(".katari");
    let log_dir = katari_dir.join("log");
    std::fs::create_dir_all(&log_dir)?;

    // Set up file appender with daily rotation
    let file_appender = rolling::daily(&log_dir, "katari.log");
    let (non_blocking_file, _guard) = non_blocking(file_appender);
    // Keep the guard alive for the duration of the program
    std::mem::forget(_guard);

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };

    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true);

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_target(false)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false); // No ANSI colors in file

    let subscriber = tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(console_layer)
        .with(file_layer);

    subscriber
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    info!(
        "Logging initialized - console: {}, file: {}",
        log_level,
        log_dir.join("katari.log").display()
    );

    Ok(())
}

fn read_story(path: &Path) -> Result<String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read story file {}: {}", path.display(), e))?;
    Ok(text)
}

/// Read a URL list file: one URL per line, blank lines ignored
fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read URL list {}: {}", path.display(), e))?;

    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

fn resolve_language(pipeline: &Pipeline, language: Option<String>) -> String {
    language.unwrap_or_else(|| pipeline.config().speech.language.clone())
}
