//! ElevenLabs-compatible instant voice cloning over HTTP.
//!
//! Identities are remote voice ids: `derive_identity` uploads the reference
//! sample to `/v1/voices/add`, `synthesize` asks `/v1/text-to-speech/{id}`
//! for raw 16-bit PCM, and `release_identity` deletes the remote voice.

use reqwest::blocking::{Client, RequestBuilder, Response, multipart::Form};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use voice_panel_domain::{AudioBuffer, Language};

use super::{VoiceError, VoiceModel};
use crate::config::ModelSettings;

const XI_API_KEY_HEADER: &str = "xi-api-key";
const API_KEY_VARS: [&str; 3] = ["ELEVENLABS_API_KEY", "ELEVEN_API_KEY", "ELEVEN_LABS_API_KEY"];

/// PCM rates the text-to-speech endpoint can stream back.
pub const SUPPORTED_PCM_RATES: [u32; 4] = [16_000, 22_050, 24_000, 44_100];

#[derive(Debug, Deserialize)]
struct AddVoiceResponse {
    voice_id: String,
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    language_code: Option<String>,
}

/// Blocking client for an ElevenLabs-style voice cloning API.
pub struct ElevenLabsVoiceModel {
    client: Client,
    base_url: String,
    api_key: String,
    model_id: String,
    sample_rate: u32,
}

impl ElevenLabsVoiceModel {
    /// Build a client from settings, falling back to the usual API key
    /// environment variables when the settings carry none.
    pub fn from_settings(settings: &ModelSettings) -> Result<Self, VoiceError> {
        let api_key = match &settings.api_key {
            Some(key) if !key.trim().is_empty() => key.clone(),
            _ => API_KEY_VARS
                .iter()
                .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
                .ok_or_else(|| {
                    VoiceError::Configuration(format!(
                        "no API key found; set one of {}",
                        API_KEY_VARS.join(", ")
                    ))
                })?,
        };

        Self::new(
            &settings.api_url,
            api_key,
            &settings.model_id,
            settings.output_sample_rate,
            Duration::from_secs(settings.request_timeout_secs),
        )
    }

    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        model_id: &str,
        sample_rate: u32,
        timeout: Duration,
    ) -> Result<Self, VoiceError> {
        if !SUPPORTED_PCM_RATES.contains(&sample_rate) {
            return Err(VoiceError::Configuration(format!(
                "unsupported output sample rate {sample_rate} Hz (expected one of {SUPPORTED_PCM_RATES:?})"
            )));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model_id: model_id.to_string(),
            sample_rate,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, VoiceError> {
        let resp = request.header(XI_API_KEY_HEADER, &self.api_key).send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(VoiceError::Api {
                status: status.as_u16(),
                body,
            });
        }
        Ok(resp)
    }
}

impl VoiceModel for ElevenLabsVoiceModel {
    type Identity = String;

    fn derive_identity(
        &self,
        voice_id: &str,
        audio_path: &Path,
        transcript: &str,
    ) -> Result<String, VoiceError> {
        let form = Form::new()
            .text("name", voice_id.to_string())
            .text("description", transcript.to_string())
            .file("files", audio_path)?;

        let resp = self.send(self.client.post(self.url("/v1/voices/add")).multipart(form))?;
        let body: AddVoiceResponse = resp.json()?;
        tracing::debug!(voice = voice_id, remote_id = %body.voice_id, "registered remote voice");
        Ok(body.voice_id)
    }

    fn synthesize(
        &self,
        identity: &String,
        text: &str,
        language: &Language,
    ) -> Result<AudioBuffer, VoiceError> {
        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            language_code: language_code(language),
        };
        let request = self
            .client
            .post(self.url(&format!("/v1/text-to-speech/{identity}")))
            .query(&[("output_format", format!("pcm_{}", self.sample_rate))])
            .json(&body);

        let bytes = self.send(request)?.bytes()?;
        if bytes.is_empty() {
            return Err(VoiceError::Synthesis("model returned no audio".into()));
        }
        Ok(AudioBuffer::new(pcm_s16le_to_f32(&bytes), self.sample_rate))
    }

    fn release_identity(&self, identity: String) -> Result<(), VoiceError> {
        self.send(self.client.delete(self.url(&format!("/v1/voices/{identity}"))))?;
        tracing::debug!(remote_id = %identity, "deleted remote voice");
        Ok(())
    }
}

/// ISO-639-1 code for a language tag, or `None` to let the API detect it.
pub fn language_code(language: &Language) -> Option<String> {
    if language.is_auto() {
        return None;
    }

    let tag = language.tag().trim().to_lowercase();
    let code = match tag.as_str() {
        "english" => "en",
        "hindi" => "hi",
        "japanese" => "ja",
        "korean" => "ko",
        "chinese" | "mandarin" => "zh",
        "german" => "de",
        "french" => "fr",
        "spanish" => "es",
        "italian" => "it",
        "portuguese" => "pt",
        "russian" => "ru",
        t if t.len() == 2 && t.chars().all(|c| c.is_ascii_alphabetic()) => t,
        _ => {
            tracing::warn!(language = %language, "unknown language tag, using auto-detection");
            return None;
        }
    };
    Some(code.to_string())
}

/// Decode little-endian signed 16-bit PCM. A trailing odd byte is dropped.
pub fn pcm_s16le_to_f32(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|b| f32::from(i16::from_le_bytes([b[0], b[1]])) / 32768.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_language_names_to_codes() {
        assert_eq!(language_code(&Language::new("English")), Some("en".into()));
        assert_eq!(language_code(&Language::new("hindi")), Some("hi".into()));
        assert_eq!(language_code(&Language::new("KO")), Some("ko".into()));
        assert_eq!(language_code(&Language::auto()), None);
        assert_eq!(language_code(&Language::new("Klingon")), None);
    }

    #[test]
    fn decodes_pcm_bytes() {
        let bytes = [0x00, 0x00, 0xff, 0x7f, 0x00, 0x80, 0x01];
        let samples = pcm_s16le_to_f32(&bytes);
        assert_eq!(samples.len(), 3);
        assert_eq!(samples[0], 0.0);
        assert!((samples[1] - 32767.0 / 32768.0).abs() < f32::EPSILON);
        assert_eq!(samples[2], -1.0);
    }

    #[test]
    fn rejects_unsupported_rate() {
        let err = ElevenLabsVoiceModel::new(
            "http://localhost:1",
            "key",
            "eleven_multilingual_v2",
            48_000,
            Duration::from_secs(1),
        );
        assert!(matches!(err, Err(VoiceError::Configuration(_))));
    }

    #[test]
    fn trims_trailing_slash_from_base_url() -> anyhow::Result<()> {
        let model = ElevenLabsVoiceModel::new(
            "http://localhost:1/",
            "key",
            "eleven_multilingual_v2",
            24_000,
            Duration::from_secs(1),
        )?;
        assert_eq!(model.url("/v1/voices/add"), "http://localhost:1/v1/voices/add");
        Ok(())
    }
}
