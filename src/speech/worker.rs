use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::{AudioAsset, SpeechSynthesizer};
use crate::config::SpeechConfig;
use crate::error::{KatariError, Result};
use crate::media::MediaProcessorTrait;
use crate::text::TextSegment;
use crate::workspace::attempt_file_name;

/// Per-segment synthesis worker with retry and output verification.
///
/// Each attempt writes a fresh file into the job's audio directory; failed
/// attempt files stay on disk and are cleaned in bulk by the coordinator.
pub struct SynthesisWorker {
    engine: Arc<dyn SpeechSynthesizer>,
    media: Arc<dyn MediaProcessorTrait>,
    config: SpeechConfig,
    audio_dir: PathBuf,
}

impl SynthesisWorker {
    pub fn new(
        engine: Arc<dyn SpeechSynthesizer>,
        media: Arc<dyn MediaProcessorTrait>,
        config: SpeechConfig,
        audio_dir: PathBuf,
    ) -> Self {
        Self {
            engine,
            media,
            config,
            audio_dir,
        }
    }

    /// Synthesize one normalized segment into an audio asset.
    ///
    /// Fails fast on empty input; otherwise retries transient failures up to
    /// the configured attempt count with a fixed backoff. A failure here
    /// never aborts sibling segments.
    pub async fn synthesize(
        &self,
        segment: &TextSegment,
        voice_reference: Option<&Path>,
        language: &str,
    ) -> Result<AudioAsset> {
        if segment.text.trim().is_empty() {
            return Err(KatariError::EmptyInput);
        }

        let mut last_error = KatariError::Speech("No synthesis attempt was made".to_string());

        for attempt in 0..self.config.max_retries {
            let output_path = self.audio_dir.join(attempt_file_name(segment.index, attempt));
            debug!(
                "Attempt {} for segment {}: {}",
                attempt + 1,
                segment.index,
                segment.text
            );

            match self.attempt(segment, &output_path, voice_reference, language).await {
                Ok(asset) => {
                    debug!(
                        "Synthesized segment {} in {:.2}s of audio",
                        segment.index, asset.duration_secs
                    );
                    return Ok(asset);
                }
                Err(e) => {
                    warn!(
                        "Attempt {} failed for segment {}: {}",
                        attempt + 1,
                        segment.index,
                        e
                    );
                    last_error = e;
                }
            }

            if attempt + 1 < self.config.max_retries {
                tokio::time::sleep(Duration::from_secs(self.config.retry_delay_secs)).await;
            }
        }

        warn!("All attempts failed for segment {}", segment.index);
        Err(last_error)
    }

    async fn attempt(
        &self,
        segment: &TextSegment,
        output_path: &Path,
        voice_reference: Option<&Path>,
        language: &str,
    ) -> Result<AudioAsset> {
        self.engine
            .synthesize_to_file(&segment.text, output_path, language, voice_reference)
            .await?;

        self.verify_output(output_path)?;

        let duration_secs = self.media.probe_duration(output_path).await?;

        Ok(AudioAsset {
            index: segment.index,
            path: output_path.to_path_buf(),
            duration_secs,
        })
    }

    /// Missing or undersized output is a transient failure worth retrying
    fn verify_output(&self, output_path: &Path) -> Result<()> {
        let size = std::fs::metadata(output_path).map(|m| m.len()).unwrap_or(0);
        if size <= self.config.min_output_bytes {
            return Err(KatariError::Speech(format!(
                "Generated file {} is too small or invalid ({} bytes)",
                output_path.display(),
                size
            )));
        }
        Ok(())
    }
}
