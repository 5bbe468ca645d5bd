//! Mono floating-point PCM with its sample rate.

use serde::{Deserialize, Serialize};

/// A mono waveform (-1.0‥+1.0 nominal) tagged with its sample rate.
///
/// Buffers move by value through the pipeline: the model produces one, the
/// stitcher consumes it and hands back a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioBuffer {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl AudioBuffer {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// `len` zero samples at `sample_rate`.
    pub fn zeros(len: usize, sample_rate: u32) -> Self {
        Self::new(vec![0.0; len], sample_rate)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length in seconds; zero when the rate is unset.
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
