//! Voice cloning: the model capability trait, the caching adapter in front of
//! it, and the HTTP backend.

use std::path::PathBuf;

pub mod cloner;
pub mod elevenlabs;
pub mod model;

pub use cloner::{SUPPORTED_SAMPLE_EXTENSIONS, VoiceCloner, validate_reference_sample};
pub use elevenlabs::{ElevenLabsVoiceModel, language_code};
pub use model::VoiceModel;

/// Errors that can occur while cloning voices or synthesising speech
#[derive(Debug, thiserror::Error)]
pub enum VoiceError {
    #[error("voice '{0}' not loaded; load its reference sample first")]
    VoiceNotLoaded(String),

    #[error("unusable reference sample {}: {reason}", path.display())]
    ReferenceSample { path: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("voice api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    #[error("failed to save speech: {0}")]
    Audio(#[from] crate::audio::AudioError),
}
