use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use super::{AudioAsset, SpeechSynthesizer, SynthesisWorker};
use crate::config::SpeechConfig;
use crate::error::{KatariError, Result};
use crate::fetch::Fetcher;
use crate::media::MediaProcessorTrait;
use crate::text::{self, TextSegment};
use crate::workspace::JobWorkspace;

/// Fan-out/fan-in scheduler for speech synthesis.
///
/// Dispatches one worker task per segment into a fixed-size pool, collects
/// the successes in segment order, and cleans up everything the failed
/// attempts left behind. A failed segment never aborts its siblings.
pub struct SynthesisCoordinator {
    engine: Arc<dyn SpeechSynthesizer>,
    media: Arc<dyn MediaProcessorTrait>,
    fetcher: Fetcher,
    config: SpeechConfig,
}

impl SynthesisCoordinator {
    pub fn new(
        engine: Arc<dyn SpeechSynthesizer>,
        media: Arc<dyn MediaProcessorTrait>,
        fetcher: Fetcher,
        config: SpeechConfig,
    ) -> Self {
        Self {
            engine,
            media,
            fetcher,
            config,
        }
    }

    /// Synthesize all segments, returning the successful assets ordered by
    /// segment index. Gaps are allowed; an empty result means no segment
    /// succeeded and downstream video assembly cannot proceed.
    pub async fn run(
        &self,
        workspace: &JobWorkspace,
        segments: &[TextSegment],
        voice_url: Option<&str>,
        language: &str,
    ) -> Result<Vec<AudioAsset>> {
        let voice_reference = self.download_voice_reference(workspace, voice_url).await;

        // Segments that normalize to empty are dropped before dispatch
        let mut dispatchable = Vec::new();
        for segment in segments {
            match text::normalize(&segment.text, self.config.max_text_length) {
                Ok(normalized) => dispatchable.push(TextSegment::new(segment.index, normalized)),
                Err(_) => warn!(
                    "Dropping segment {}: empty after normalization",
                    segment.index
                ),
            }
        }

        info!(
            "Audio generation started: {} of {} segments, {} workers",
            dispatchable.len(),
            segments.len(),
            self.config.max_workers
        );

        let worker = Arc::new(SynthesisWorker::new(
            self.engine.clone(),
            self.media.clone(),
            self.config.clone(),
            workspace.audio_dir(),
        ));
        let semaphore = Arc::new(Semaphore::new(self.config.max_workers));
        let task_timeout = Duration::from_secs(self.config.task_timeout_secs);

        // Submission order is segment order; completion order is not
        let mut handles = Vec::with_capacity(dispatchable.len());
        for segment in dispatchable {
            let worker = worker.clone();
            let semaphore = semaphore.clone();
            let voice_reference = voice_reference.clone();
            let language = language.to_string();
            let index = segment.index;

            let handle = tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (index, Err(KatariError::Speech("Worker pool closed".to_string())))
                    }
                };

                let result = tokio::time::timeout(
                    task_timeout,
                    worker.synthesize(
                        &segment,
                        voice_reference.as_ref().map(|p| p.as_path()),
                        &language,
                    ),
                )
                .await
                .unwrap_or_else(|_| {
                    Err(KatariError::Speech(format!(
                        "Synthesis timed out after {}s",
                        task_timeout.as_secs()
                    )))
                });

                (index, result)
            });
            handles.push(handle);
        }

        // A timed-out or panicked task only loses its own segment
        let mut indexed: Vec<(usize, AudioAsset)> = Vec::new();
        for handle in handles {
            match handle.await {
                Ok((index, Ok(asset))) => indexed.push((index, asset)),
                Ok((index, Err(e))) => warn!("Segment {} dropped: {}", index, e),
                Err(e) => warn!("Synthesis task aborted: {}", e),
            }
        }

        // Restore segment order from the carried indices, never arrival order
        indexed.sort_by_key(|(index, _)| *index);
        let assets: Vec<AudioAsset> = indexed.into_iter().map(|(_, asset)| asset).collect();

        if assets.is_empty() {
            warn!("No audio assets were generated successfully");
        } else {
            info!("Synthesized {} of {} segments", assets.len(), segments.len());
        }

        self.cleanup_failed_attempts(workspace, &assets);
        if let Some(reference) = voice_reference {
            workspace.remove_files([reference.as_ref()]);
        }

        Ok(assets)
    }

    /// Voice reference download failure degrades to synthesizing without a
    /// cloned voice; it never aborts the job.
    async fn download_voice_reference(
        &self,
        workspace: &JobWorkspace,
        voice_url: Option<&str>,
    ) -> Option<Arc<PathBuf>> {
        let url = voice_url?;
        let path = workspace.voice_reference_path();
        match self.fetcher.download_to(url, &path).await {
            Ok(()) => Some(Arc::new(path)),
            Err(e) => {
                warn!(
                    "Failed to download voice reference, proceeding without it: {}",
                    e
                );
                None
            }
        }
    }

    /// Bulk removal of attempt files that did not become assets
    fn cleanup_failed_attempts(&self, workspace: &JobWorkspace, assets: &[AudioAsset]) {
        let keep: Vec<&PathBuf> = assets.iter().map(|a| &a.path).collect();

        let entries = match std::fs::read_dir(workspace.audio_dir()) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to scan audio directory for cleanup: {}", e);
                return;
            }
        };

        let leftovers: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file() && !keep.contains(&path))
            .collect();

        let removed = workspace.remove_files(leftovers.iter());
        if removed > 0 {
            info!("Removed {} failed attempt files", removed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FetchConfig;
    use crate::speech::test_support::{FakeProbe, FakeSynthesizer};

    fn test_config(task_timeout_secs: u64) -> SpeechConfig {
        SpeechConfig {
            binary_path: "tts".to_string(),
            model: "test".to_string(),
            language: "en".to_string(),
            max_workers: 3,
            max_retries: 3,
            retry_delay_secs: 0,
            task_timeout_secs,
            min_output_bytes: 16,
            max_text_length: 500,
        }
    }

    fn coordinator(
        engine: Arc<FakeSynthesizer>,
        task_timeout_secs: u64,
    ) -> SynthesisCoordinator {
        SynthesisCoordinator::new(
            engine,
            Arc::new(FakeProbe::new(4.0)),
            Fetcher::new(&FetchConfig { timeout_secs: 1 }),
            test_config(task_timeout_secs),
        )
    }

    fn segments(texts: &[&str]) -> Vec<TextSegment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextSegment::new(i, *t))
            .collect()
    }

    #[tokio::test]
    async fn test_run_returns_assets_in_segment_order() {
        let workspace = JobWorkspace::create().unwrap();
        let coordinator = coordinator(Arc::new(FakeSynthesizer::succeeding()), 30);

        let segs = segments(&["first", "second", "third"]);
        let assets = coordinator.run(&workspace, &segs, None, "en").await.unwrap();

        let indices: Vec<usize> = assets.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        for asset in &assets {
            assert!(asset.path.exists());
            assert_eq!(asset.duration_secs, 4.0);
        }
    }

    #[tokio::test]
    async fn test_failed_segment_leaves_gap_and_no_files() {
        let workspace = JobWorkspace::create().unwrap();
        let coordinator = coordinator(Arc::new(FakeSynthesizer::succeeding()), 30);

        // Segment 2 always produces undersized output and is dropped after
        // exhausting retries; its attempt files are cleaned in bulk.
        let segs = segments(&["zero", "one", "[tiny] two", "three"]);
        let assets = coordinator.run(&workspace, &segs, None, "en").await.unwrap();

        let indices: Vec<usize> = assets.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 1, 3]);

        for attempt in 0..3 {
            assert!(!workspace.attempt_path(2, attempt).exists());
        }
        for asset in &assets {
            assert!(asset.path.exists());
        }
    }

    #[tokio::test]
    async fn test_timed_out_segment_does_not_block_siblings() {
        let workspace = JobWorkspace::create().unwrap();
        let coordinator = coordinator(Arc::new(FakeSynthesizer::succeeding()), 1);

        let segs = segments(&["fast one", "[slow] stuck", "fast two"]);
        let assets = coordinator.run(&workspace, &segs, None, "en").await.unwrap();

        let indices: Vec<usize> = assets.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_all_failures_return_empty_result() {
        let workspace = JobWorkspace::create().unwrap();
        let coordinator = coordinator(Arc::new(FakeSynthesizer::failing()), 30);

        let segs = segments(&["doomed", "also doomed"]);
        let assets = coordinator.run(&workspace, &segs, None, "en").await.unwrap();
        assert!(assets.is_empty());
    }

    #[tokio::test]
    async fn test_empty_segments_are_dropped_before_dispatch() {
        let workspace = JobWorkspace::create().unwrap();
        let engine = Arc::new(FakeSynthesizer::succeeding());
        let coordinator = coordinator(engine.clone(), 30);

        let segs = vec![
            TextSegment::new(0, "real text"),
            TextSegment::new(1, "   "),
            TextSegment::new(2, "more text"),
        ];
        let assets = coordinator.run(&workspace, &segs, None, "en").await.unwrap();

        let indices: Vec<usize> = assets.iter().map(|a| a.index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(engine.calls(), 2);
    }

    #[tokio::test]
    async fn test_configured_text_limit_applies_to_dispatched_segments() {
        let workspace = JobWorkspace::create().unwrap();
        let engine = Arc::new(FakeSynthesizer::succeeding());
        let mut config = test_config(30);
        config.max_text_length = 24;
        let coordinator = SynthesisCoordinator::new(
            engine.clone(),
            Arc::new(FakeProbe::new(4.0)),
            Fetcher::new(&FetchConfig { timeout_secs: 1 }),
            config,
        );

        let segs = segments(&["short one", "this segment is well past the configured limit"]);
        coordinator.run(&workspace, &segs, None, "en").await.unwrap();

        let texts = engine.texts();
        assert!(texts.iter().any(|t| t == "short one."));
        assert!(texts.iter().all(|t| t.chars().count() <= 24));
        assert!(texts.iter().any(|t| t.ends_with("...")));
    }

    #[tokio::test]
    async fn test_voice_reference_failure_degrades_gracefully() {
        let workspace = JobWorkspace::create().unwrap();
        let coordinator = coordinator(Arc::new(FakeSynthesizer::succeeding()), 30);

        // Reserved TEST-NET-1 address, the download always fails
        let segs = segments(&["still works"]);
        let assets = coordinator
            .run(&workspace, &segs, Some("http://192.0.2.1:9/voice.wav"), "en")
            .await
            .unwrap();

        assert_eq!(assets.len(), 1);
        assert!(!workspace.voice_reference_path().exists());
    }

    #[tokio::test]
    async fn test_rerun_with_same_inputs_returns_same_subset() {
        let segs = segments(&["keep", "[fail] drop", "keep too"]);

        let mut runs = Vec::new();
        for _ in 0..2 {
            let workspace = JobWorkspace::create().unwrap();
            let coordinator = coordinator(Arc::new(FakeSynthesizer::succeeding()), 30);
            let assets = coordinator.run(&workspace, &segs, None, "en").await.unwrap();
            runs.push(assets.iter().map(|a| a.index).collect::<Vec<_>>());
        }

        assert_eq!(runs[0], vec![0, 2]);
        assert_eq!(runs[0], runs[1]);
    }
}
