//! Script-to-audio driver: generate the script, speak each line with its
//! character's cloned voice, and stitch the clips into one file.

use indicatif::ProgressBar;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use voice_panel_domain::{AudioBuffer, Language, ScriptLine};

use crate::audio::{self, AudioError, AudioStitcher, DEFAULT_PAUSE_MS, StitchOptions};
use crate::script::{ScriptError, ScriptGenerator};
use crate::utils::{get_voice_sample_path, validate_audio_file};
use crate::voice::{VoiceCloner, VoiceError, VoiceModel};

#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    #[error("no script lines were generated; check the character ids")]
    EmptyScript,

    #[error("no audio was generated for any script line")]
    NoAudioGenerated,

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Audio(#[from] AudioError),
}

/// Receives coarse progress while a panel renders.
///
/// Purely informational: implementations cannot influence rendering.
pub trait Progress {
    /// `fraction` runs from 0.0 to 1.0.
    fn update(&self, fraction: f32, message: &str);
}

impl Progress for ProgressBar {
    fn update(&self, fraction: f32, message: &str) {
        self.set_position((fraction.clamp(0.0, 1.0) * 100.0).round() as u64);
        self.set_message(message.to_string());
    }
}

impl Progress for () {
    fn update(&self, _fraction: f32, _message: &str) {}
}

/// Everything needed to render one panel.
#[derive(Debug, Clone)]
pub struct PanelRequest {
    pub topic: String,
    /// `None` uses the default panel order.
    pub characters: Option<Vec<String>>,
    pub pause_ms: u32,
    pub normalize: bool,
    pub intro: Option<PathBuf>,
    pub outro: Option<PathBuf>,
    pub output_path: PathBuf,
}

impl PanelRequest {
    pub fn new(topic: impl Into<String>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            topic: topic.into(),
            characters: None,
            pause_ms: DEFAULT_PAUSE_MS,
            normalize: true,
            intro: None,
            outro: None,
            output_path: output_path.into(),
        }
    }

    pub fn with_characters(mut self, characters: Vec<String>) -> Self {
        self.characters = Some(characters);
        self
    }

    pub fn with_pause_ms(mut self, pause_ms: u32) -> Self {
        self.pause_ms = pause_ms;
        self
    }
}

/// A script line that produced no audio.
#[derive(Debug, Clone)]
pub struct LineFailure {
    pub index: usize,
    pub character_id: String,
    pub error: String,
}

/// Result of a rendered panel.
#[derive(Debug, Clone)]
pub struct PanelOutcome {
    pub script: Vec<ScriptLine>,
    /// Indices into `script` that made it into the audio, in order.
    pub spoken: Vec<usize>,
    pub failed: Vec<LineFailure>,
    pub audio: AudioBuffer,
    pub output_path: PathBuf,
}

/// Which voices [`PanelRenderer::load_voices`] could prepare.
#[derive(Debug, Clone, Default)]
pub struct VoiceLoadReport {
    pub loaded: Vec<String>,
    /// Characters whose reference sample is absent or unsupported.
    pub missing: Vec<(String, PathBuf)>,
    /// Characters whose sample was rejected by the model.
    pub failed: Vec<(String, String)>,
}

impl VoiceLoadReport {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }
}

pub struct PanelRenderer<'a, M: VoiceModel> {
    generator: &'a ScriptGenerator,
    cloner: &'a mut VoiceCloner<M>,
    stitcher: &'a AudioStitcher,
    voices_dir: PathBuf,
}

impl<'a, M: VoiceModel> PanelRenderer<'a, M> {
    pub fn new(
        generator: &'a ScriptGenerator,
        cloner: &'a mut VoiceCloner<M>,
        stitcher: &'a AudioStitcher,
        voices_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            generator,
            cloner,
            stitcher,
            voices_dir: voices_dir.into(),
        }
    }

    /// Load the reference sample of every known character in `character_ids`.
    ///
    /// Unknown ids are ignored and voices that are already loaded are kept.
    /// A profile without `sample_file` uses the first `<id>.<ext>` found in
    /// the voices directory. A character whose sample cannot be used is
    /// reported, not fatal.
    pub fn load_voices<S: AsRef<str>>(&mut self, character_ids: &[S]) -> VoiceLoadReport {
        let mut report = VoiceLoadReport::default();
        let mut seen = BTreeSet::new();

        for id in character_ids {
            let id = id.as_ref();
            if !seen.insert(id) {
                continue;
            }
            let Some(profile) = self.generator.store().character(id) else {
                continue;
            };
            if self.cloner.is_loaded(id) {
                report.loaded.push(id.to_string());
                continue;
            }

            let sample = match &profile.sample_file {
                Some(file) => self.voices_dir.join(file),
                None => get_voice_sample_path(&self.voices_dir, id)
                    .unwrap_or_else(|| self.voices_dir.join(profile.sample_file_for(id))),
            };
            if !validate_audio_file(&sample) {
                tracing::warn!(
                    character = id,
                    path = %sample.display(),
                    "voice sample not found or unsupported"
                );
                report.missing.push((id.to_string(), sample));
                continue;
            }

            match self.cloner.load_voice(id, &sample, profile.transcript()) {
                Ok(()) => report.loaded.push(id.to_string()),
                Err(e) => {
                    tracing::warn!(character = id, error = %e, "failed to load voice");
                    report.failed.push((id.to_string(), e.to_string()));
                }
            }
        }

        report
    }

    /// Render a whole panel to `request.output_path`.
    ///
    /// A line whose synthesis fails is dropped; the request fails only when
    /// the script is empty or no line produced audio.
    pub fn render_panel(
        &self,
        request: &PanelRequest,
        progress: &dyn Progress,
    ) -> Result<PanelOutcome, PanelError> {
        progress.update(0.0, "Initializing…");

        progress.update(0.1, "Generating script…");
        let script = self
            .generator
            .generate_panel_script(&request.topic, request.characters.as_deref());
        if script.is_empty() {
            return Err(PanelError::EmptyScript);
        }
        tracing::info!(topic = %request.topic, lines = script.len(), "generated script");

        let total = script.len();
        let mut clips = Vec::with_capacity(total);
        let mut spoken = Vec::with_capacity(total);
        let mut failed = Vec::new();

        for (i, item) in script.iter().enumerate() {
            progress.update(
                0.1 + 0.7 * i as f32 / total as f32,
                &format!("Generating {}…", item.character_name),
            );

            match self
                .cloner
                .synthesize(&item.character_id, &item.line, &item.language)
            {
                Ok(clip) => {
                    clips.push(clip);
                    spoken.push(i);
                }
                Err(e) => {
                    tracing::warn!(
                        character = %item.character_id,
                        line = i,
                        error = %e,
                        "skipping line"
                    );
                    failed.push(LineFailure {
                        index: i,
                        character_id: item.character_id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        if clips.is_empty() {
            return Err(PanelError::NoAudioGenerated);
        }

        progress.update(0.9, "Combining audio…");
        let framed = request.intro.is_some() || request.outro.is_some();
        let mut options = StitchOptions::default()
            .with_pause_ms(request.pause_ms)
            .with_normalize(request.normalize);
        if !framed {
            options = options.with_output(&request.output_path);
        }
        let stitched = self.stitcher.stitch(clips, &options)?;

        let audio = if framed {
            let samples = self.stitcher.add_intro_outro(
                stitched.samples,
                request.intro.as_deref(),
                request.outro.as_deref(),
            )?;
            let audio = AudioBuffer::new(samples, self.stitcher.sample_rate());
            audio::write_wav(&request.output_path, &audio)?;
            tracing::info!(path = %request.output_path.display(), "saved framed panel audio");
            audio
        } else {
            stitched
        };

        progress.update(1.0, "Done!");
        Ok(PanelOutcome {
            script,
            spoken,
            failed,
            audio,
            output_path: request.output_path.clone(),
        })
    }

    /// Speak `text` as `character_id` and write the model output as is.
    ///
    /// `language` defaults to the character's own language.
    pub fn render_single(
        &self,
        character_id: &str,
        text: &str,
        language: Option<&Language>,
        output_path: &Path,
    ) -> Result<AudioBuffer, PanelError> {
        let profile = self
            .generator
            .store()
            .character(character_id)
            .ok_or_else(|| ScriptError::UnknownCharacter(character_id.to_string()))?;
        let language = language.unwrap_or(&profile.language);

        Ok(self
            .cloner
            .synthesize_to_file(character_id, text, language, output_path)?)
    }
}
