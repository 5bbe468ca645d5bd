//! Voice clone cache – one derived identity per character, reused for every
//! line that character speaks.

use std::collections::HashMap;
use std::path::Path;

use voice_panel_domain::{AudioBuffer, Language};

use super::{VoiceError, VoiceModel};
use crate::audio::write_wav;
use crate::utils::format_duration;

/// Reference-sample extensions accepted for cloning.
pub const SUPPORTED_SAMPLE_EXTENSIONS: [&str; 5] = ["wav", "mp3", "flac", "ogg", "m4a"];

/// Check that `path` is an existing file with a supported audio extension.
pub fn validate_reference_sample(path: &Path) -> Result<(), VoiceError> {
    let reject = |reason: &str| VoiceError::ReferenceSample {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if !path.is_file() {
        return Err(reject("file not found"));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| reject("missing file extension"))?;
    if !SUPPORTED_SAMPLE_EXTENSIONS.contains(&ext.as_str()) {
        return Err(reject(&format!("unsupported format '.{ext}'")));
    }
    Ok(())
}

/// Adapter that owns a [`VoiceModel`] and the identities derived from it.
///
/// Identities live for as long as the cloner does; pass the cloner to whoever
/// needs to synthesise instead of sharing it globally.
pub struct VoiceCloner<M: VoiceModel> {
    model: M,
    voices: HashMap<String, M::Identity>,
}

impl<M: VoiceModel> VoiceCloner<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            voices: HashMap::new(),
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Derive and cache the identity for `voice_id`.
    ///
    /// Loading the same id again replaces the cached identity; the replaced
    /// one is released on a best-effort basis.
    pub fn load_voice(
        &mut self,
        voice_id: &str,
        audio_path: impl AsRef<Path>,
        transcript: &str,
    ) -> Result<(), VoiceError> {
        let audio_path = audio_path.as_ref();
        validate_reference_sample(audio_path)?;

        tracing::info!(voice = voice_id, path = %audio_path.display(), "loading voice sample");
        let identity = self
            .model
            .derive_identity(voice_id, audio_path, transcript)?;

        if let Some(previous) = self.voices.insert(voice_id.to_string(), identity) {
            tracing::debug!(voice = voice_id, "replaced cached voice identity");
            if let Err(e) = self.model.release_identity(previous) {
                tracing::warn!(voice = voice_id, error = %e, "failed to release replaced voice");
            }
        }

        tracing::info!(voice = voice_id, "voice sample loaded");
        Ok(())
    }

    /// Speak `text` with a previously loaded voice.
    pub fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        language: &Language,
    ) -> Result<AudioBuffer, VoiceError> {
        let identity = self
            .voices
            .get(voice_id)
            .ok_or_else(|| VoiceError::VoiceNotLoaded(voice_id.to_string()))?;

        let preview: String = text.chars().take(50).collect();
        tracing::info!(voice = voice_id, %language, text = %preview, "generating speech");

        let audio = self.model.synthesize(identity, text, language)?;
        tracing::info!(
            voice = voice_id,
            duration = %format_duration(audio.duration_secs()),
            sample_rate = audio.sample_rate,
            "generated audio"
        );
        Ok(audio)
    }

    /// [`synthesize`](Self::synthesize), then save the clip at the model's
    /// native rate.
    pub fn synthesize_to_file(
        &self,
        voice_id: &str,
        text: &str,
        language: &Language,
        output_path: impl AsRef<Path>,
    ) -> Result<AudioBuffer, VoiceError> {
        let output_path = output_path.as_ref();
        let audio = self.synthesize(voice_id, text, language)?;
        write_wav(output_path, &audio)?;
        tracing::info!(voice = voice_id, path = %output_path.display(), "saved speech");
        Ok(audio)
    }

    /// Speak several `(text, language)` pairs with one voice, in order.
    ///
    /// With `output_dir`, clip `i` is also saved as `<voice_id>_<i>.wav`.
    /// The first failure aborts the batch.
    pub fn synthesize_batch<T: AsRef<str>>(
        &self,
        voice_id: &str,
        items: &[(T, Language)],
        output_dir: Option<&Path>,
    ) -> Result<Vec<AudioBuffer>, VoiceError> {
        if !self.is_loaded(voice_id) {
            return Err(VoiceError::VoiceNotLoaded(voice_id.to_string()));
        }

        items
            .iter()
            .enumerate()
            .map(|(i, (text, language))| match output_dir {
                Some(dir) => self.synthesize_to_file(
                    voice_id,
                    text.as_ref(),
                    language,
                    dir.join(format!("{voice_id}_{i}.wav")),
                ),
                None => self.synthesize(voice_id, text.as_ref(), language),
            })
            .collect()
    }

    pub fn is_loaded(&self, voice_id: &str) -> bool {
        self.voices.contains_key(voice_id)
    }

    pub fn loaded_voices(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.voices.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Release every cached identity. Failures are logged and skipped.
    pub fn release_all(&mut self) {
        for (voice_id, identity) in self.voices.drain() {
            if let Err(e) = self.model.release_identity(identity) {
                tracing::warn!(voice = %voice_id, error = %e, "failed to release voice");
            }
        }
    }
}
