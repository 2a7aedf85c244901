//! Shared fakes for exercising the synthesis pipeline without external
//! binaries. Marker substrings in the segment text steer the fake engine:
//! `[fail]` makes every attempt fail, `[slow]` blocks past any timeout, and
//! `[tiny]` writes an output below the size threshold.

use async_trait::async_trait;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{KatariError, Result};
use crate::media::MediaProcessorTrait;
use crate::speech::SpeechSynthesizer;

pub struct FakeSynthesizer {
    calls: AtomicUsize,
    texts: Mutex<Vec<String>>,
    fail_all: bool,
    undersized_attempts: usize,
}

impl FakeSynthesizer {
    pub fn succeeding() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
            fail_all: false,
            undersized_attempts: 0,
        }
    }

    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
            fail_all: true,
            undersized_attempts: 0,
        }
    }

    /// The first `n` calls write a file below any sane size threshold
    pub fn undersized_for_attempts(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            texts: Mutex::new(Vec::new()),
            fail_all: false,
            undersized_attempts: n,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Texts received so far, in call order
    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize_to_file(
        &self,
        text: &str,
        output_path: &Path,
        _language: &str,
        _voice_reference: Option<&Path>,
    ) -> Result<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.texts.lock().unwrap().push(text.to_string());

        if text.contains("[slow]") {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.fail_all || text.contains("[fail]") {
            return Err(KatariError::Speech("fake synthesis failure".to_string()));
        }
        if text.contains("[tiny]") {
            std::fs::write(output_path, b"x")?;
            return Ok(());
        }

        let payload: &[u8] = if call < self.undersized_attempts {
            b"x"
        } else {
            b"RIFF fake audio payload, comfortably over threshold"
        };
        std::fs::write(output_path, payload)?;
        Ok(())
    }
}

/// Media processor fake: fixed probe duration, file-creating render/assemble
pub struct FakeProbe {
    duration_secs: f64,
    renders: AtomicUsize,
    assemblies: AtomicUsize,
}

impl FakeProbe {
    pub fn new(duration_secs: f64) -> Self {
        Self {
            duration_secs,
            renders: AtomicUsize::new(0),
            assemblies: AtomicUsize::new(0),
        }
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn assemblies(&self) -> usize {
        self.assemblies.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MediaProcessorTrait for FakeProbe {
    async fn render_clip(
        &self,
        _image_path: &Path,
        _audio_path: &Path,
        _duration_secs: f64,
        output_path: &Path,
    ) -> Result<()> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        std::fs::write(output_path, b"fake clip")?;
        Ok(())
    }

    async fn assemble(
        &self,
        _concat_list_path: &Path,
        _subtitle_path: &Path,
        output_path: &Path,
    ) -> Result<()> {
        self.assemblies.fetch_add(1, Ordering::SeqCst);
        std::fs::write(output_path, b"fake video")?;
        Ok(())
    }

    async fn probe_duration(&self, _audio_path: &Path) -> Result<f64> {
        Ok(self.duration_secs)
    }

    fn check_availability(&self) -> Result<()> {
        Ok(())
    }
}
