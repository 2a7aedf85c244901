use async_trait::async_trait;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use super::SpeechSynthesizer;
use crate::config::SpeechConfig;
use crate::error::{KatariError, Result};

/// Speech synthesizer backed by a TTS CLI binary (e.g., Coqui `tts`).
///
/// Each call spawns one process writing one output file, so concurrent
/// calls are safe as long as output paths are unique.
pub struct CommandSynthesizer {
    config: SpeechConfig,
}

impl CommandSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SpeechSynthesizer for CommandSynthesizer {
    async fn synthesize_to_file(
        &self,
        text: &str,
        output_path: &Path,
        language: &str,
        voice_reference: Option<&Path>,
    ) -> Result<()> {
        let mut cmd = Command::new(&self.config.binary_path);
        // The coordinator may drop this future on timeout; the subprocess
        // must not outlive it
        cmd.kill_on_drop(true)
            .arg("--model_name")
            .arg(&self.config.model)
            .arg("--text")
            .arg(text)
            .arg("--language_idx")
            .arg(language)
            .arg("--out_path")
            .arg(output_path);

        if let Some(reference) = voice_reference {
            cmd.arg("--speaker_wav").arg(reference);
        }

        debug!("Executing TTS command: {:?}", cmd);

        let output = cmd
            .output()
            .await
            .map_err(|e| KatariError::Speech(format!("Failed to execute TTS binary: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KatariError::Speech(format!(
                "Synthesis failed for '{}': {}",
                text, stderr
            )));
        }

        Ok(())
    }
}
