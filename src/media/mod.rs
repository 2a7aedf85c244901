// Media processing for the assembly pipeline
//
// This module wraps the external transcoding engine (ffmpeg/ffprobe):
// - Commands: command builders for clip rendering, assembly, and probing
// - Processor: the concrete implementation behind MediaProcessorTrait

pub mod commands;
pub mod processor;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use commands::*;
pub use processor::*;

use crate::config::MediaConfig;
use crate::error::Result;

/// One rendered video fragment: one image fused with one audio asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub index: usize,
    pub path: PathBuf,
    pub duration_secs: f64,
}

/// Fade length for a clip: one second, capped at half the clip duration
pub fn fade_duration(duration_secs: f64) -> f64 {
    (duration_secs / 2.0).min(1.0)
}

/// Main trait for media processing operations
#[async_trait]
pub trait MediaProcessorTrait: Send + Sync {
    /// Fuse one still image with one audio track into a faded clip
    async fn render_clip(
        &self,
        image_path: &Path,
        audio_path: &Path,
        duration_secs: f64,
        output_path: &Path,
    ) -> Result<()>;

    /// Concatenate ordered clips and burn in the subtitle track
    async fn assemble(
        &self,
        concat_list_path: &Path,
        subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()>;

    /// Probe the duration of an audio file in seconds
    async fn probe_duration(&self, audio_path: &Path) -> Result<f64>;

    /// Check if the media processor is available
    fn check_availability(&self) -> Result<()>;
}

/// Factory for creating media processor instances
pub struct MediaProcessorFactory;

impl MediaProcessorFactory {
    /// Create the default media processor implementation (FFmpeg-based).
    /// Shared behind an Arc because the synthesis workers probe durations
    /// concurrently.
    pub fn create_processor(config: MediaConfig) -> Arc<dyn MediaProcessorTrait> {
        Arc::new(processor::MediaProcessorImpl::new(config))
    }
}
