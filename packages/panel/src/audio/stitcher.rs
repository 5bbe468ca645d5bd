//! src/audio/stitcher.rs
//!
//! Joins per-speaker clips into one panel recording: every clip is brought to
//! the stitcher's rate, optionally RMS-normalised, and separated by a fixed
//! pause.  Intro/outro stingers are attached with a short linear crossfade.
//
// The resampler here is nearest-index on purpose; it only has to bridge the
// odd model that does not emit 24 kHz.

use std::path::{Path, PathBuf};

use voice_panel_domain::AudioBuffer;

use super::{AudioError, SAMPLE_RATE, read_wav, write_wav};

/// Loudness target for [`normalize`], in dBFS RMS.
pub const DEFAULT_TARGET_DB: f32 = -20.0;
/// Silence inserted between speakers.
pub const DEFAULT_PAUSE_MS: u32 = 800;
/// Overlap used when attaching intro/outro audio.
pub const DEFAULT_CROSSFADE_MS: u32 = 50;

/// Knobs for [`AudioStitcher::stitch`].
#[derive(Debug, Clone)]
pub struct StitchOptions {
    pub pause_ms: u32,
    pub normalize_each: bool,
    pub target_db: f32,
    /// Persist the stitched result here before returning it.
    pub output_path: Option<PathBuf>,
}

impl Default for StitchOptions {
    fn default() -> Self {
        Self {
            pause_ms: DEFAULT_PAUSE_MS,
            normalize_each: true,
            target_db: DEFAULT_TARGET_DB,
            output_path: None,
        }
    }
}

impl StitchOptions {
    pub fn with_pause_ms(mut self, pause_ms: u32) -> Self {
        self.pause_ms = pause_ms;
        self
    }

    pub fn with_normalize(mut self, normalize_each: bool) -> Self {
        self.normalize_each = normalize_each;
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// Combines clips into a single mono recording at a fixed sample rate.
#[derive(Debug, Clone, Copy)]
pub struct AudioStitcher {
    sample_rate: u32,
}

impl Default for AudioStitcher {
    fn default() -> Self {
        Self::new(SAMPLE_RATE)
    }
}

impl AudioStitcher {
    pub fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples covering `duration_ms` at the stitcher rate.
    pub fn samples_for(&self, duration_ms: u32) -> usize {
        (self.sample_rate as f64 * duration_ms as f64 / 1000.0).round() as usize
    }

    /// `duration_ms` of digital silence at the stitcher rate.
    pub fn silence(&self, duration_ms: u32) -> Vec<f32> {
        vec![0.0; self.samples_for(duration_ms)]
    }

    /// Overlap the tail of `a` with the head of `b` using complementary
    /// linear ramps.
    ///
    /// Falls back to plain concatenation when either side is shorter than
    /// the fade (or the fade rounds to zero samples), so the result is
    /// `a.len() + b.len() - fade` samples long only when a fade happened.
    pub fn crossfade(&self, a: &[f32], b: &[f32], fade_ms: u32) -> Vec<f32> {
        let fade = self.samples_for(fade_ms);

        if fade == 0 || a.len() < fade || b.len() < fade {
            let mut out = Vec::with_capacity(a.len() + b.len());
            out.extend_from_slice(a);
            out.extend_from_slice(b);
            return out;
        }

        let head = a.len() - fade;
        let mut out = Vec::with_capacity(a.len() + b.len() - fade);
        out.extend_from_slice(&a[..head]);

        // Ramp endpoints are inclusive: fade-out runs 1 → 0, fade-in 0 → 1.
        for i in 0..fade {
            let t = if fade == 1 {
                0.0
            } else {
                i as f32 / (fade - 1) as f32
            };
            out.push(a[head + i] * (1.0 - t) + b[i] * t);
        }

        out.extend_from_slice(&b[fade..]);
        out
    }

    /// Stitch `clips` into one buffer at the stitcher rate.
    ///
    /// Clips keep their input order; exactly one pause sits between each
    /// consecutive pair and none at either end.
    pub fn stitch(
        &self,
        clips: Vec<AudioBuffer>,
        options: &StitchOptions,
    ) -> Result<AudioBuffer, AudioError> {
        if clips.is_empty() {
            return Err(AudioError::EmptyInput);
        }
        if self.sample_rate == 0 {
            return Err(AudioError::InvalidSampleRate(0));
        }

        let clip_count = clips.len();
        let pause = self.silence(options.pause_ms);
        let mut combined = Vec::new();

        for (i, clip) in clips.into_iter().enumerate() {
            let mut samples = if clip.sample_rate == self.sample_rate {
                clip.samples
            } else {
                tracing::debug!(
                    from = clip.sample_rate,
                    to = self.sample_rate,
                    "resampling clip"
                );
                resample_linear(clip.samples, clip.sample_rate, self.sample_rate)?
            };

            if options.normalize_each {
                samples = normalize(samples, options.target_db);
            }

            if i > 0 {
                combined.extend_from_slice(&pause);
            }
            combined.extend(samples);
        }

        let stitched = AudioBuffer::new(combined, self.sample_rate);
        tracing::info!(
            clips = clip_count,
            samples = stitched.len(),
            seconds = stitched.duration_secs(),
            "stitched panel"
        );

        if let Some(path) = &options.output_path {
            write_wav(path, &stitched)?;
            tracing::info!(path = %path.display(), "saved panel audio");
        }

        Ok(stitched)
    }

    /// Crossfade an intro before and an outro after `main`.
    ///
    /// Both files are down-mixed and brought to the stitcher rate first.
    pub fn add_intro_outro(
        &self,
        main: Vec<f32>,
        intro_path: Option<&Path>,
        outro_path: Option<&Path>,
    ) -> Result<Vec<f32>, AudioError> {
        let mut result = main;

        if let Some(path) = intro_path {
            let intro = self.load_at_rate(path)?;
            result = self.crossfade(&intro, &result, DEFAULT_CROSSFADE_MS);
        }

        if let Some(path) = outro_path {
            let outro = self.load_at_rate(path)?;
            result = self.crossfade(&result, &outro, DEFAULT_CROSSFADE_MS);
        }

        Ok(result)
    }

    fn load_at_rate(&self, path: &Path) -> Result<Vec<f32>, AudioError> {
        let clip = read_wav(path)?;
        resample_linear(clip.samples, clip.sample_rate, self.sample_rate)
    }
}

/// Root-mean-square amplitude; zero for an empty slice.
pub fn rms(samples: &[f32]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum_sq / samples.len() as f64).sqrt()
}

/// Scale `samples` to `target_db` RMS and clip to [-1, 1].
///
/// Silent input (RMS of zero) is returned untouched. NaN samples count as
/// silence and infinities saturate to full scale before measuring.
pub fn normalize(samples: Vec<f32>, target_db: f32) -> Vec<f32> {
    let samples: Vec<f32> = samples
        .into_iter()
        .map(|s| match s {
            s if s.is_nan() => 0.0,
            s if s.is_infinite() => s.signum(),
            s => s,
        })
        .collect();

    let level = rms(&samples);
    if level == 0.0 {
        return samples;
    }

    // Gain stays in f64: a subnormal RMS would overflow an f32 gain.
    let target_rms = 10f64.powf(f64::from(target_db) / 20.0);
    let gain = target_rms / level;
    samples
        .into_iter()
        .map(|s| (f64::from(s) * gain).clamp(-1.0, 1.0) as f32)
        .collect()
}

/// Nearest-index rate conversion from `from_rate` to `to_rate`.
///
/// Produces `round(len * to / from)` samples picked at evenly spaced
/// positions over the input's index range. Not bandlimited.
pub fn resample_linear(
    samples: Vec<f32>,
    from_rate: u32,
    to_rate: u32,
) -> Result<Vec<f32>, AudioError> {
    if from_rate == to_rate {
        return Ok(samples);
    }
    if from_rate == 0 {
        return Err(AudioError::InvalidSampleRate(from_rate));
    }
    if to_rate == 0 {
        return Err(AudioError::InvalidSampleRate(to_rate));
    }
    if samples.is_empty() {
        return Ok(samples);
    }

    let new_len = (samples.len() as f64 * to_rate as f64 / from_rate as f64).round() as usize;
    if new_len == 0 {
        return Ok(Vec::new());
    }

    let last = samples.len() - 1;
    let step = if new_len > 1 {
        last as f64 / (new_len - 1) as f64
    } else {
        0.0
    };

    Ok((0..new_len)
        .map(|i| {
            let idx = (i as f64 * step).round() as usize;
            samples[idx.min(last)]
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(len: usize) -> Vec<f32> {
        (0..len).map(|i| i as f32 / len as f32).collect()
    }

    #[test]
    fn silence_rounds_to_nearest_sample() {
        let stitcher = AudioStitcher::new(22_050);
        // 22050 * 10 / 1000 = 220.5 → 221
        assert_eq!(stitcher.silence(10).len(), 221);
        assert!(stitcher.silence(10).iter().all(|&s| s == 0.0));
        assert_eq!(AudioStitcher::default().silence(500).len(), 12_000);
        assert!(AudioStitcher::default().silence(0).is_empty());
    }

    #[test]
    fn normalize_leaves_silence_alone() {
        let zeros = vec![0.0_f32; 64];
        assert_eq!(normalize(zeros.clone(), DEFAULT_TARGET_DB), zeros);
        assert!(normalize(Vec::new(), DEFAULT_TARGET_DB).is_empty());
    }

    #[test]
    fn normalize_hits_target_rms() {
        let quiet: Vec<f32> = (0..2400).map(|i| ((i as f32) * 0.1).sin() * 0.01).collect();
        let out = normalize(quiet, DEFAULT_TARGET_DB);
        let expected = 10f64.powf(-20.0 / 20.0);
        assert!((rms(&out) - expected).abs() < 1e-3, "rms = {}", rms(&out));
    }

    #[test]
    fn normalize_clips_to_unit_range() {
        let spiky: Vec<f32> = (0..1000)
            .map(|i| if i == 0 { 5.0 } else { 0.001 * (i % 7) as f32 - 0.003 })
            .collect();
        let out = normalize(spiky, 0.0);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
        assert_eq!(out[0], 1.0);
    }

    #[test]
    fn normalize_stays_in_range_for_degenerate_input() {
        let cases = [
            vec![1e-45_f32, 0.0, -1e-45],
            vec![f32::INFINITY, 0.5],
            vec![f32::NAN, 0.25, f32::NEG_INFINITY],
            vec![f32::NAN; 4],
        ];
        for case in cases {
            let out = normalize(case.clone(), DEFAULT_TARGET_DB);
            assert_eq!(out.len(), case.len());
            assert!(
                out.iter().all(|s| (-1.0..=1.0).contains(s)),
                "{case:?} -> {out:?}"
            );
        }

        let tiny = normalize(vec![1e-45_f32, 0.0, -1e-45], DEFAULT_TARGET_DB);
        assert_eq!(tiny[1], 0.0);
        assert!(tiny[0] > 0.0 && tiny[2] < 0.0);
        assert_eq!(normalize(vec![f32::NAN; 4], DEFAULT_TARGET_DB), vec![0.0; 4]);
    }

    #[test]
    fn resample_same_rate_is_identity() -> anyhow::Result<()> {
        let input = ramp(313);
        assert_eq!(resample_linear(input.clone(), 16_000, 16_000)?, input);
        assert_eq!(resample_linear(Vec::new(), 0, 0)?, Vec::<f32>::new());
        Ok(())
    }

    #[test]
    fn resample_length_and_values() -> anyhow::Result<()> {
        let input = ramp(1_000);
        let up = resample_linear(input.clone(), 16_000, 24_000)?;
        assert_eq!(up.len(), 1_500);
        assert_eq!(up.first(), input.first());
        assert_eq!(up.last(), input.last());
        assert!(up.iter().all(|s| input.contains(s)));

        let down = resample_linear(input.clone(), 44_100, 24_000)?;
        assert_eq!(down.len(), (1_000.0_f64 * 24_000.0 / 44_100.0).round() as usize);
        Ok(())
    }

    #[test]
    fn resample_rejects_zero_rate() {
        assert!(matches!(
            resample_linear(vec![0.1], 0, 24_000),
            Err(AudioError::InvalidSampleRate(0))
        ));
        assert!(matches!(
            resample_linear(vec![0.1], 24_000, 0),
            Err(AudioError::InvalidSampleRate(0))
        ));
    }

    #[test]
    fn crossfade_overlaps_when_both_long_enough() {
        let stitcher = AudioStitcher::new(1_000); // 1 sample per ms
        let a = vec![1.0_f32; 100];
        let b = vec![0.5_f32; 80];
        let out = stitcher.crossfade(&a, &b, 10);
        assert_eq!(out.len(), 100 + 80 - 10);
        // first overlapped sample is all `a`, last is all `b`
        assert_eq!(out[90], 1.0);
        assert_eq!(out[99], 0.5);
        assert!(out[90..100].windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn crossfade_concatenates_short_inputs() {
        let stitcher = AudioStitcher::new(1_000);
        let a = vec![1.0_f32; 5];
        let b = vec![0.5_f32; 80];
        let out = stitcher.crossfade(&a, &b, 10);
        assert_eq!(out.len(), 85);
        assert_eq!(&out[..5], &a[..]);
        assert_eq!(&out[5..], &b[..]);

        let untouched = stitcher.crossfade(&b, &b, 0);
        assert_eq!(untouched.len(), 160);
    }

    #[test]
    fn stitch_rejects_empty_input() {
        let err = AudioStitcher::default().stitch(Vec::new(), &StitchOptions::default());
        assert!(matches!(err, Err(AudioError::EmptyInput)));
    }

    #[test]
    fn stitch_inserts_one_pause_between_clips() -> anyhow::Result<()> {
        let stitcher = AudioStitcher::default();
        let a = AudioBuffer::new(vec![0.2; 24_000], 24_000);
        let b = AudioBuffer::new(vec![-0.2; 12_000], 24_000);

        let out = stitcher.stitch(vec![a, b], &StitchOptions::default().with_pause_ms(500))?;
        assert_eq!(out.sample_rate, 24_000);
        assert_eq!(out.len(), 24_000 + 12_000 + 12_000);
        assert!(out.samples[24_000..36_000].iter().all(|&s| s == 0.0));
        Ok(())
    }

    #[test]
    fn stitch_resamples_foreign_rates() -> anyhow::Result<()> {
        let stitcher = AudioStitcher::default();
        let clip = AudioBuffer::new(vec![0.3; 16_000], 16_000);
        let out = stitcher.stitch(vec![clip], &StitchOptions::default().with_normalize(false))?;
        assert_eq!(out.len(), 24_000);
        assert!(out.samples.iter().all(|&s| s == 0.3));
        Ok(())
    }

    #[test]
    fn stitch_writes_output_at_stitcher_rate() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("out").join("x.wav");
        let stitcher = AudioStitcher::new(22_050);
        let clips = vec![
            AudioBuffer::new(vec![0.1; 16_000], 16_000),
            AudioBuffer::new(vec![-0.1; 22_050], 22_050),
        ];

        let options = StitchOptions::default().with_pause_ms(100).with_output(&path);
        let out = stitcher.stitch(clips, &options)?;

        let written = read_wav(&path)?;
        assert_eq!(written.sample_rate, 22_050);
        // one second, a 100 ms pause (2205 samples), one second
        assert_eq!(written.len(), 22_050 + 2_205 + 22_050);
        assert_eq!(written.len(), out.len());
        Ok(())
    }
}
