//! `audio/mod.rs` – public façade for the panel's audio helpers
//!
//! After `use crate::audio::*` you get:
//!   * Clip stitching  → `AudioStitcher`, `StitchOptions`
//!   * Loudness / rate helpers  → `normalize()`, `resample_linear()`
//!   * WAV import/export  → `read_wav()`, `write_wav()`
//!

use std::path::PathBuf;

pub mod stitcher;
pub mod wav;

pub use stitcher::{
    AudioStitcher, DEFAULT_CROSSFADE_MS, DEFAULT_PAUSE_MS, DEFAULT_TARGET_DB, StitchOptions,
    normalize, resample_linear, rms,
};
pub use wav::{read_wav, write_wav};

/// Default output rate of the stitcher (24 kHz mono).
pub const SAMPLE_RATE: u32 = 24_000;

/// Errors raised while combining or persisting audio.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("no audio clips provided")]
    EmptyInput,

    #[error("invalid sample rate: {0} Hz")]
    InvalidSampleRate(u32),

    #[error("i/o error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("wav error: {0}")]
    Wav(#[from] hound::Error),
}
