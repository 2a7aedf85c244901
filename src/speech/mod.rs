// Speech synthesis for the assembly pipeline
//
// This module turns normalized narration segments into audio assets:
// - Engine: the external TTS binary behind the SpeechSynthesizer trait
// - Worker: per-segment synthesis with retry and output verification
// - Coordinator: bounded-concurrency fan-out/fan-in over all segments

pub mod coordinator;
pub mod engine;
#[cfg(test)]
pub mod test_support;
pub mod worker;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use coordinator::*;
pub use engine::*;
pub use worker::*;

use crate::config::SpeechConfig;
use crate::error::Result;

/// The audio produced for one narration segment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioAsset {
    /// Original segment index, carried so downstream consumers can restore
    /// segment order from unordered completion
    pub index: usize,
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Speech model service behind the synthesis worker.
///
/// Implementations must be safely callable concurrently from multiple tasks.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` into an audio file at `output_path`
    async fn synthesize_to_file(
        &self,
        text: &str,
        output_path: &Path,
        language: &str,
        voice_reference: Option<&Path>,
    ) -> Result<()>;
}

/// Factory for creating speech synthesizer instances
pub struct SpeechSynthesizerFactory;

impl SpeechSynthesizerFactory {
    /// Create the default synthesizer implementation (TTS CLI subprocess)
    pub fn create_default(config: SpeechConfig) -> Arc<dyn SpeechSynthesizer> {
        Arc::new(engine::CommandSynthesizer::new(config))
    }
}
