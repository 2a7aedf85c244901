use thiserror::Error;

#[derive(Error, Debug)]
pub enum KatariError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Media processing error: {0}")]
    Media(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Object store error: {0}")]
    Store(String),

    #[error("Text segment is empty after trimming")]
    EmptyInput,

    #[error("Cannot build cues from an empty segment list")]
    EmptySegmentList,

    #[error("No audio assets were generated for any segment")]
    NoAudioGenerated,

    #[error("Clip inputs out of step: {images} images, {audio} audio assets, {clips} clips")]
    PreconditionMismatch {
        images: usize,
        audio: usize,
        clips: usize,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

pub type Result<T> = std::result::Result<T, KatariError>;
