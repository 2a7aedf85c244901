use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{KatariError, Result};
use crate::fetch::Fetcher;
use crate::media::{Clip, MediaProcessorFactory, MediaProcessorTrait};
use crate::speech::{
    AudioAsset, SpeechSynthesizer, SpeechSynthesizerFactory, SynthesisCoordinator,
};
use crate::store::{ObjectStore, ObjectStoreFactory};
use crate::subtitle;
use crate::text;
use crate::timing;
use crate::workspace::JobWorkspace;

/// Root aggregate of one pipeline invocation: the story, its per-sentence
/// imagery, and the narration source URLs. Everything derived from it lives
/// in a single job workspace.
#[derive(Debug, Clone)]
pub struct AssemblyJob {
    pub story: String,
    pub image_urls: Vec<String>,
    pub audio_urls: Vec<String>,
}

/// The pipeline context: owns the collaborator handles (speech engine,
/// media processor, object store, HTTP fetcher) and the worker pool
/// configuration. No ambient singletons; every stage goes through here.
pub struct Pipeline {
    config: Config,
    media: Arc<dyn MediaProcessorTrait>,
    store: Box<dyn ObjectStore>,
    fetcher: Fetcher,
    coordinator: SynthesisCoordinator,
}

impl Pipeline {
    pub fn new(config: Config) -> Result<Self> {
        let speech = SpeechSynthesizerFactory::create_default(config.speech.clone());
        let media = MediaProcessorFactory::create_processor(config.media.clone());
        let store = ObjectStoreFactory::create_store(config.store.clone());
        let fetcher = Fetcher::new(&config.fetch);

        media.check_availability()?;

        Ok(Self::with_collaborators(config, speech, media, store, fetcher))
    }

    /// Assemble a pipeline from explicit collaborators (used by tests)
    pub fn with_collaborators(
        config: Config,
        speech: Arc<dyn SpeechSynthesizer>,
        media: Arc<dyn MediaProcessorTrait>,
        store: Box<dyn ObjectStore>,
        fetcher: Fetcher,
    ) -> Self {
        let coordinator = SynthesisCoordinator::new(
            speech,
            media.clone(),
            fetcher.clone(),
            config.speech.clone(),
        );

        Self {
            config,
            media,
            store,
            fetcher,
            coordinator,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Full pipeline: synthesize narration for the story, then assemble the
    /// narrated video, returning its public URL.
    pub async fn generate(
        &self,
        story: &str,
        image_urls: Vec<String>,
        voice_url: Option<&str>,
        language: &str,
    ) -> Result<String> {
        let audio_urls = self.synthesize_story(story, voice_url, language).await?;
        if audio_urls.is_empty() {
            return Err(KatariError::NoAudioGenerated);
        }

        let job = AssemblyJob {
            story: story.to_string(),
            image_urls,
            audio_urls,
        };
        self.assemble(&job, None).await
    }

    /// Synthesize every sentence of the story and upload the audio assets,
    /// returning their public URLs in segment order (gaps allowed).
    pub async fn synthesize_story(
        &self,
        story: &str,
        voice_url: Option<&str>,
        language: &str,
    ) -> Result<Vec<String>> {
        let workspace = JobWorkspace::create()?;
        let result = self
            .synthesize_story_inner(&workspace, story, voice_url, language)
            .await;
        workspace.purge();
        result
    }

    async fn synthesize_story_inner(
        &self,
        workspace: &JobWorkspace,
        story: &str,
        voice_url: Option<&str>,
        language: &str,
    ) -> Result<Vec<String>> {
        let segments = text::split_story(story);
        let assets = self
            .coordinator
            .run(workspace, &segments, voice_url, language)
            .await?;

        if assets.is_empty() {
            return Ok(Vec::new());
        }

        info!("Uploading {} audio assets", assets.len());
        let paths: Vec<&Path> = assets.iter().map(|a| a.path.as_path()).collect();
        let urls = self.store.upload_files(&paths).await?;

        // Audio assets are deleted after upload; the purge covers the rest
        let asset_paths: Vec<PathBuf> = assets.into_iter().map(|a| a.path).collect();
        workspace.remove_files(asset_paths.iter());

        Ok(urls)
    }

    /// Assemble the narrated video for a job and upload it, returning the
    /// public URL. When `save_copy` is given the final video is also copied
    /// there before the workspace is purged.
    pub async fn assemble(&self, job: &AssemblyJob, save_copy: Option<&Path>) -> Result<String> {
        let workspace = JobWorkspace::create()?;
        let result = self.assemble_inner(&workspace, job, save_copy).await;
        workspace.purge();
        result
    }

    async fn assemble_inner(
        &self,
        workspace: &JobWorkspace,
        job: &AssemblyJob,
        save_copy: Option<&Path>,
    ) -> Result<String> {
        let segments = text::split_story(&job.story);

        let assets = self.fetch_audio_metadata(workspace, &job.audio_urls).await?;
        if assets.is_empty() {
            return Err(KatariError::NoAudioGenerated);
        }

        // Cue sheet and subtitle track
        let durations: Vec<f64> = assets.iter().map(|a| a.duration_secs).collect();
        let cues = timing::build_cues(&segments, &durations)?;
        let subtitle_path = workspace.subtitles_path();
        subtitle::write_ass(&cues, &subtitle_path).await?;

        // Per-segment clips, then one concatenation pass
        let clips = self.render_clips(workspace, &job.image_urls, &assets).await?;
        check_counts(job.image_urls.len(), assets.len(), clips.len())?;

        let output_path = self.assemble_clips(workspace, &clips, &subtitle_path).await?;

        if let Some(copy_path) = save_copy {
            fs::copy(&output_path, copy_path).await?;
            info!("Saved a local copy to {}", copy_path.display());
        }

        let video_url = self.store.upload_file(&output_path).await?;
        info!("Final video available at {}", video_url);
        Ok(video_url)
    }

    /// Render the subtitle track for a story narrated by the given audio
    /// URLs, writing the ASS document to `output_path`.
    pub async fn subtitles(
        &self,
        story: &str,
        audio_urls: &[String],
        output_path: &Path,
    ) -> Result<()> {
        let workspace = JobWorkspace::create()?;
        let result = self
            .subtitles_inner(&workspace, story, audio_urls, output_path)
            .await;
        workspace.purge();
        result
    }

    async fn subtitles_inner(
        &self,
        workspace: &JobWorkspace,
        story: &str,
        audio_urls: &[String],
        output_path: &Path,
    ) -> Result<()> {
        let segments = text::split_story(story);
        let assets = self.fetch_audio_metadata(workspace, audio_urls).await?;
        let durations: Vec<f64> = assets.iter().map(|a| a.duration_secs).collect();
        let cues = timing::build_cues(&segments, &durations)?;
        subtitle::write_ass(&cues, output_path).await
    }

    /// Download each audio source URL into the workspace and probe its
    /// duration. A URL that fails to download or probe is skipped with a
    /// warning; the assembly precondition catches the count mismatch later.
    pub async fn fetch_audio_metadata(
        &self,
        workspace: &JobWorkspace,
        audio_urls: &[String],
    ) -> Result<Vec<AudioAsset>> {
        let mut assets = Vec::with_capacity(audio_urls.len());

        for (index, url) in audio_urls.iter().enumerate() {
            let path = workspace.downloaded_audio_path(index);
            if let Err(e) = self.fetcher.download_to(url, &path).await {
                warn!("Failed to download audio from {}: {}", url, e);
                continue;
            }

            match self.media.probe_duration(&path).await {
                Ok(duration_secs) => assets.push(AudioAsset {
                    index,
                    path,
                    duration_secs,
                }),
                Err(e) => warn!("Failed to probe audio from {}: {}", url, e),
            }
        }

        let metadata = serde_json::to_string_pretty(&assets)?;
        fs::write(workspace.metadata_path(), metadata).await?;
        info!(
            "Audio metadata saved for {} of {} sources",
            assets.len(),
            audio_urls.len()
        );

        Ok(assets)
    }

    /// Fuse each image with its audio asset into a faded clip, in segment
    /// order. Image download or transcoding failure is fatal to the job.
    async fn render_clips(
        &self,
        workspace: &JobWorkspace,
        image_urls: &[String],
        assets: &[AudioAsset],
    ) -> Result<Vec<Clip>> {
        check_counts(image_urls.len(), assets.len(), assets.len())?;

        let mut clips = Vec::with_capacity(assets.len());
        for (image_url, asset) in image_urls.iter().zip(assets) {
            let image_path = workspace.image_path(asset.index);
            self.fetcher.download_to(image_url, &image_path).await?;

            let clip_path = workspace.clip_path(asset.index);
            self.media
                .render_clip(&image_path, &asset.path, asset.duration_secs, &clip_path)
                .await?;

            clips.push(Clip {
                index: asset.index,
                path: clip_path,
                duration_secs: asset.duration_secs,
            });
        }

        Ok(clips)
    }

    /// Concatenate the ordered clips and burn in the subtitle track. The
    /// subtitle entry count is independent of the clip count; only the
    /// image/audio/clip counts must agree.
    async fn assemble_clips(
        &self,
        workspace: &JobWorkspace,
        clips: &[Clip],
        subtitle_path: &Path,
    ) -> Result<PathBuf> {
        let concat_list_path = workspace.concat_list_path();
        let mut concat_list = String::new();
        for clip in clips {
            concat_list.push_str(&format!("file '{}'\n", clip.path.display()));
        }
        fs::write(&concat_list_path, concat_list).await?;

        let output_path = workspace.output_path();
        self.media
            .assemble(&concat_list_path, subtitle_path, &output_path)
            .await?;

        if !output_path.exists() {
            return Err(KatariError::Media(
                "Assembly produced no output file".to_string(),
            ));
        }

        Ok(output_path)
    }
}

/// The image, audio, and clip lists must pair up one-to-one
fn check_counts(images: usize, audio: usize, clips: usize) -> Result<()> {
    if images != audio || audio != clips {
        return Err(KatariError::PreconditionMismatch {
            images,
            audio,
            clips,
        });
    }
    Ok(())
}
