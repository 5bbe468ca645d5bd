//! WAV I/O helpers – mono 16-bit PCM out, anything `hound` understands in.

use std::fs;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use voice_panel_domain::AudioBuffer;

use super::AudioError;

/// Write `buffer` (32-bit float, -1.0‥+1.0) to `path` as a mono 16-bit PCM
/// WAV. Missing parent directories are created.
///
/// Samples outside the nominal range are clipped before conversion.
pub fn write_wav(path: impl AsRef<Path>, buffer: &AudioBuffer) -> Result<(), AudioError> {
    let path = path.as_ref();
    if buffer.sample_rate == 0 {
        return Err(AudioError::InvalidSampleRate(0));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| AudioError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let spec = WavSpec {
        channels: 1,
        sample_rate: buffer.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec)?;
    for &s in &buffer.samples {
        writer.write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16)?;
    }
    writer.finalize()?;

    tracing::debug!(
        path = %path.display(),
        samples = buffer.len(),
        sample_rate = buffer.sample_rate,
        "wrote wav"
    );
    Ok(())
}

/// Read a WAV file into a mono `f32` buffer at its native rate.
///
/// Integer formats are scaled by their bit depth; multi-channel files are
/// down-mixed by averaging each frame.
pub fn read_wav(path: impl AsRef<Path>) -> Result<AudioBuffer, AudioError> {
    let mut reader = WavReader::open(path.as_ref())?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader.samples::<f32>().collect::<Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = 1.0 / (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 * scale))
                .collect::<Result<_, _>>()?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect()
    };

    Ok(AudioBuffer::new(samples, spec.sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_keeps_length_and_rate() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("clip.wav");

        let samples: Vec<f32> = (0..480).map(|i| ((i as f32) * 0.05).sin() * 0.8).collect();
        let original = AudioBuffer::new(samples, 24_000);
        write_wav(&path, &original)?;

        let loaded = read_wav(&path)?;
        assert_eq!(loaded.sample_rate, 24_000);
        assert_eq!(loaded.len(), original.len());
        for (a, b) in original.samples.iter().zip(&loaded.samples) {
            assert!((a - b).abs() < 1e-4, "{a} vs {b}");
        }
        Ok(())
    }

    #[test]
    fn stereo_input_is_downmixed() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stereo.wav");

        let spec = WavSpec {
            channels: 2,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec)?;
        for _ in 0..100 {
            writer.write_sample(16_384_i16)?;
            writer.write_sample(0_i16)?;
        }
        writer.finalize()?;

        let loaded = read_wav(&path)?;
        assert_eq!(loaded.sample_rate, 16_000);
        assert_eq!(loaded.len(), 100);
        assert!(loaded.samples.iter().all(|s| (s - 0.25).abs() < 1e-4));
        Ok(())
    }

    #[test]
    fn zero_rate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_wav(dir.path().join("x.wav"), &AudioBuffer::new(vec![0.0], 0));
        assert!(matches!(err, Err(AudioError::InvalidSampleRate(0))));
    }
}
