use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{KatariError, Result};

fn default_max_text_length() -> usize {
    crate::text::MAX_SEGMENT_CHARS
}

fn default_min_output_bytes() -> u64 {
    1024
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub speech: SpeechConfig,
    pub media: MediaConfig,
    pub fetch: FetchConfig,
    pub store: StoreConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Path to the TTS binary (e.g., Coqui `tts`)
    pub binary_path: String,
    /// Model identifier passed to the TTS binary
    pub model: String,
    /// Default narration language
    pub language: String,
    /// Number of synthesis workers running in parallel
    pub max_workers: usize,
    /// Attempts per segment before it is dropped
    pub max_retries: u32,
    /// Delay between attempts (seconds)
    pub retry_delay_secs: u64,
    /// Per-segment synthesis timeout (seconds)
    pub task_timeout_secs: u64,
    /// Output files smaller than this are treated as failed attempts
    #[serde(default = "default_min_output_bytes")]
    pub min_output_bytes: u64,
    /// Segments longer than this are truncated before synthesis
    #[serde(default = "default_max_text_length")]
    pub max_text_length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Path to ffmpeg binary
    pub binary_path: String,
    /// Path to ffprobe binary, used for audio duration probing
    pub probe_path: String,
    /// Additional encoding options appended to clip rendering
    /// Common options: ["-preset", "medium", "-crf", "23"]
    pub encode_options: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Timeout for HTTP downloads (seconds)
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Object store upload endpoint (e.g., a Cloudinary-style API base)
    pub endpoint: String,
    /// Unsigned upload preset sent with each upload
    pub upload_preset: String,
    /// Timeout for uploads (seconds)
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            speech: SpeechConfig {
                binary_path: "tts".to_string(),
                model: "tts_models/multilingual/multi-dataset/xtts_v2".to_string(),
                language: "en".to_string(),
                max_workers: 3,
                max_retries: 3,
                retry_delay_secs: 1,
                task_timeout_secs: 300,
                min_output_bytes: 1024,
                max_text_length: 500,
            },
            media: MediaConfig {
                binary_path: "ffmpeg".to_string(),
                probe_path: "ffprobe".to_string(),
                encode_options: vec![
                    // Example encoding options users can customize:
                    // "-preset".to_string(), "medium".to_string(), // Encoding speed
                    // "-crf".to_string(), "23".to_string(),        // Quality (0-51)
                ],
            },
            fetch: FetchConfig { timeout_secs: 30 },
            store: StoreConfig {
                endpoint: "http://localhost:9000/upload".to_string(),
                upload_preset: "katari".to_string(),
                timeout_secs: 120,
            },
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| KatariError::Config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&content)
            .map_err(|e| KatariError::Config(format!("Failed to parse config file: {}", e)))
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| KatariError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| KatariError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trip() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.speech.max_workers, 3);
        assert_eq!(parsed.speech.task_timeout_secs, 300);
        assert_eq!(parsed.media.binary_path, "ffmpeg");
    }

    #[test]
    fn test_missing_optional_fields_use_defaults() {
        let toml_str = r#"
            [speech]
            binary_path = "tts"
            model = "xtts_v2"
            language = "en"
            max_workers = 2
            max_retries = 3
            retry_delay_secs = 1
            task_timeout_secs = 120

            [media]
            binary_path = "ffmpeg"
            probe_path = "ffprobe"
            encode_options = []

            [fetch]
            timeout_secs = 10

            [store]
            endpoint = "http://localhost:9000/upload"
            upload_preset = "test"
            timeout_secs = 60
        "#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.speech.min_output_bytes, 1024);
        assert_eq!(config.speech.max_text_length, 500);
    }
}
