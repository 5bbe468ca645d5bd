//! Capability boundary around a pretrained voice-cloning model.

use std::path::Path;

use voice_panel_domain::{AudioBuffer, Language};

use super::VoiceError;

/// What the panel needs from a voice-cloning model, and nothing more.
///
/// Implementations are free to run locally or remotely; calls are made one at
/// a time from a single thread and may block for seconds.
pub trait VoiceModel {
    /// Opaque speaker representation derived from a reference recording.
    type Identity;

    /// Derive a reusable identity from a short recording and its transcript.
    fn derive_identity(
        &self,
        voice_id: &str,
        audio_path: &Path,
        transcript: &str,
    ) -> Result<Self::Identity, VoiceError>;

    /// Speak `text` in the voice described by `identity`.
    fn synthesize(
        &self,
        identity: &Self::Identity,
        text: &str,
        language: &Language,
    ) -> Result<AudioBuffer, VoiceError>;

    /// Dispose of an identity the caller no longer needs.
    fn release_identity(&self, _identity: Self::Identity) -> Result<(), VoiceError> {
        Ok(())
    }
}
