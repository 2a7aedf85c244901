use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline: synthesize narration and assemble the video
    Generate {
        /// Story text file (one narration, sentences separated by periods)
        #[arg(short, long)]
        story: PathBuf,

        /// File listing one image URL per line, in sentence order
        #[arg(short, long)]
        images: PathBuf,

        /// Voice reference audio URL for voice cloning
        #[arg(long)]
        voice_url: Option<String>,

        /// Narration language (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,

        /// Also save the final video to this local path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Synthesize narration audio for a story and upload the assets
    Synthesize {
        /// Story text file
        #[arg(short, long)]
        story: PathBuf,

        /// Voice reference audio URL for voice cloning
        #[arg(long)]
        voice_url: Option<String>,

        /// Narration language (defaults to the configured language)
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Build the time-aligned subtitle track for a story
    Subtitles {
        /// Story text file
        #[arg(short, long)]
        story: PathBuf,

        /// File listing one audio asset URL per line, in sentence order
        #[arg(short, long)]
        audio: PathBuf,

        /// Output subtitle file (.ass)
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Assemble a narrated video from existing image and audio URLs
    Assemble {
        /// Story text file
        #[arg(short, long)]
        story: PathBuf,

        /// File listing one image URL per line, in sentence order
        #[arg(short, long)]
        images: PathBuf,

        /// File listing one audio asset URL per line, in sentence order
        #[arg(short, long)]
        audio: PathBuf,

        /// Also save the final video to this local path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
