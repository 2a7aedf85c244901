use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::StoreConfig;
use crate::error::{KatariError, Result};

/// Object store used for publishing audio assets and the final video
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload one local file, returning its public URL
    async fn upload_file(&self, local_path: &Path) -> Result<String>;

    /// Upload a batch of files in order, returning their public URLs
    async fn upload_files(&self, local_paths: &[&Path]) -> Result<Vec<String>> {
        let mut urls = Vec::with_capacity(local_paths.len());
        for path in local_paths {
            urls.push(self.upload_file(path).await?);
        }
        Ok(urls)
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

/// HTTP multipart upload implementation (Cloudinary-style unsigned uploads)
pub struct HttpObjectStore {
    client: Client,
    config: StoreConfig,
}

impl HttpObjectStore {
    pub fn new(config: StoreConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self { client, config }
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn upload_file(&self, local_path: &Path) -> Result<String> {
        if !local_path.exists() {
            return Err(KatariError::FileNotFound(local_path.display().to_string()));
        }

        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "artifact".to_string());

        debug!("Uploading {} to {}", local_path.display(), self.config.endpoint);

        let bytes = tokio::fs::read(local_path).await?;
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.clone()))
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .client
            .post(&self.config.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| KatariError::Store(format!("Upload request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(KatariError::Store(format!(
                "Upload of {} failed {}: {}",
                file_name, status, error_text
            )));
        }

        let upload: UploadResponse = response
            .json()
            .await
            .map_err(|e| KatariError::Store(format!("Failed to parse upload response: {}", e)))?;

        info!("Uploaded {} -> {}", file_name, upload.secure_url);
        Ok(upload.secure_url)
    }
}

/// Factory for creating object store instances
pub struct ObjectStoreFactory;

impl ObjectStoreFactory {
    /// Create the default object store implementation (HTTP multipart)
    pub fn create_store(config: StoreConfig) -> Box<dyn ObjectStore> {
        Box::new(HttpObjectStore::new(config))
    }
}
