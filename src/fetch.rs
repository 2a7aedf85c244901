use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::FetchConfig;
use crate::error::{KatariError, Result};

/// HTTP fetcher for voice references, per-segment images, and audio assets
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("HTTP client creation should not fail");

        Self { client }
    }

    /// Download a URL into a local file. Non-200 status is a failure.
    pub async fn download_to<P: AsRef<Path>>(&self, url: &str, output_path: P) -> Result<()> {
        let output_path = output_path.as_ref();
        debug!("Downloading {} -> {}", url, output_path.display());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| KatariError::Download(format!("Request failed for {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(KatariError::Download(format!(
                "Failed to download {}: status {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| KatariError::Download(format!("Failed to read body of {}: {}", url, e)))?;

        tokio::fs::write(output_path, &bytes).await?;

        info!(
            "Downloaded {} ({} bytes) to {}",
            url,
            bytes.len(),
            output_path.display()
        );
        Ok(())
    }
}
