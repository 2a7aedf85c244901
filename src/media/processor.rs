use async_trait::async_trait;
use std::path::Path;
use std::process::Command;
use tracing::info;

use super::{fade_duration, MediaCommandBuilder, MediaProcessorTrait};
use crate::config::MediaConfig;
use crate::error::{KatariError, Result};

/// Concrete implementation of media processor (FFmpeg-based)
pub struct MediaProcessorImpl {
    config: MediaConfig,
    command_builder: MediaCommandBuilder,
}

impl MediaProcessorImpl {
    /// Create a new media processor implementation
    pub fn new(config: MediaConfig) -> Self {
        let command_builder = MediaCommandBuilder::new(&config.binary_path, &config.probe_path);

        Self {
            config,
            command_builder,
        }
    }
}

#[async_trait]
impl MediaProcessorTrait for MediaProcessorImpl {
    /// Fuse one still image with one audio track into a faded clip
    async fn render_clip(
        &self,
        image_path: &Path,
        audio_path: &Path,
        duration_secs: f64,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Rendering clip from {} + {} ({:.2}s) -> {}",
            image_path.display(),
            audio_path.display(),
            duration_secs,
            output_path.display()
        );

        let fade = fade_duration(duration_secs);
        let command = self.command_builder.render_clip(
            image_path,
            audio_path,
            duration_secs,
            fade,
            &self.config.encode_options,
            output_path,
        );

        command.execute().await?;

        info!("Clip rendering completed");
        Ok(())
    }

    /// Concatenate ordered clips and burn in the subtitle track
    async fn assemble(
        &self,
        concat_list_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        info!(
            "Assembling video from {} with subtitles {} -> {}",
            concat_list_path.display(),
            subtitle_path.display(),
            output_path.display()
        );

        let command = self.command_builder.concat_with_subtitles(
            concat_list_path,
            subtitle_path,
            output_path,
        );

        command.execute().await?;

        info!("Video assembly completed successfully");
        Ok(())
    }

    /// Probe the duration of an audio file in seconds
    async fn probe_duration(&self, audio_path: &Path) -> Result<f64> {
        let command = self.command_builder.probe_duration(audio_path);
        let stdout = command.execute_capture().await?;

        stdout.trim().parse::<f64>().map_err(|e| {
            KatariError::Media(format!(
                "Unparseable duration '{}' for {}: {}",
                stdout.trim(),
                audio_path.display(),
                e
            ))
        })
    }

    /// Check if media processor is available
    fn check_availability(&self) -> Result<()> {
        let output = Command::new(&self.config.binary_path)
            .arg("-version")
            .output()
            .map_err(|e| KatariError::Media(format!("Media processor not found: {}", e)))?;

        if output.status.success() {
            info!("Media processor is available");
            Ok(())
        } else {
            Err(KatariError::Media(
                "Media processor version check failed".to_string(),
            ))
        }
    }
}
