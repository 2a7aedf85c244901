use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::Result;

/// Filename for one synthesis attempt, keyed by segment index and attempt
/// number so concurrent workers never contend on a path
pub fn attempt_file_name(index: usize, attempt: u32) -> String {
    format!("audio_{}_{}.wav", index, attempt)
}

/// Temporary on-disk scope owned by one pipeline run.
///
/// Every intermediate artifact (audio attempts, downloaded images, rendered
/// clips, subtitle track, concat list, final video) lives under this
/// directory and is removed when the job ends, success or failure.
pub struct JobWorkspace {
    id: Uuid,
    root: TempDir,
}

impl JobWorkspace {
    pub fn create() -> Result<Self> {
        let root = tempfile::Builder::new().prefix("katari-").tempdir()?;
        let workspace = Self {
            id: Uuid::new_v4(),
            root,
        };

        std::fs::create_dir_all(workspace.audio_dir())?;
        std::fs::create_dir_all(workspace.clips_dir())?;

        info!(
            "Created job workspace {} at {}",
            workspace.id,
            workspace.path().display()
        );
        Ok(workspace)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn path(&self) -> &Path {
        self.root.path()
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.path().join("audio")
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.path().join("clips")
    }

    /// Synthesis attempt output
    pub fn attempt_path(&self, index: usize, attempt: u32) -> PathBuf {
        self.audio_dir().join(attempt_file_name(index, attempt))
    }

    /// Audio asset downloaded from a source URL
    pub fn downloaded_audio_path(&self, index: usize) -> PathBuf {
        self.audio_dir().join(format!("audio_{}.mp3", index))
    }

    pub fn voice_reference_path(&self) -> PathBuf {
        self.path().join("voice_reference.wav")
    }

    pub fn image_path(&self, index: usize) -> PathBuf {
        self.clips_dir().join(format!("image_{}.png", index))
    }

    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.clips_dir().join(format!("clip_{}.mp4", index))
    }

    pub fn subtitles_path(&self) -> PathBuf {
        self.path().join("subtitles.ass")
    }

    pub fn concat_list_path(&self) -> PathBuf {
        self.clips_dir().join("concat_list.txt")
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path().join("audio_metadata.json")
    }

    pub fn output_path(&self) -> PathBuf {
        self.path().join("output.mp4")
    }

    /// Best-effort deletion of individual files.
    ///
    /// Deletion failures are logged and counted, never propagated; the final
    /// purge removes anything left behind.
    pub fn remove_files<'a, I>(&self, paths: I) -> usize
    where
        I: IntoIterator<Item = &'a PathBuf>,
    {
        let mut removed = 0;
        for path in paths {
            if !path.exists() {
                continue;
            }
            match std::fs::remove_file(path) {
                Ok(()) => {
                    debug!("Removed {}", path.display());
                    removed += 1;
                }
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        removed
    }

    /// Delete the entire workspace. Runs on every exit path of a job.
    pub fn purge(self) {
        let path = self.path().to_path_buf();
        let id = self.id;
        match self.root.close() {
            Ok(()) => info!("Purged job workspace {}", id),
            Err(e) => warn!("Failed to purge workspace {} at {}: {}", id, path.display(), e),
        }
    }
}
