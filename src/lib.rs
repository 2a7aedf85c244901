//! Katari - Narrated Video Assembly Workflow
//!
//! A Rust implementation of an automated workflow for turning a generated
//! story into a narrated video using TTS and ffmpeg: per-sentence speech
//! synthesis, per-sentence imagery, and time-aligned burned-in captions.

pub mod cli;
pub mod config;
pub mod error;
pub mod fetch;
pub mod media;
pub mod pipeline;
pub mod speech;
pub mod store;
pub mod subtitle;
pub mod text;
pub mod timing;
pub mod workspace;
