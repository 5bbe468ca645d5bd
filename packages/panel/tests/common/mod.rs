//! Shared fixtures: an in-process voice model and a small template store.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use voice_panel::script::{CharacterProfile, TemplateStore};
use voice_panel::{AudioBuffer, Language, VoiceError, VoiceModel};

/// Deterministic stand-in for a cloning backend.
///
/// Every synthesised clip is `clip_len` samples of 0.25 at `sample_rate`.
/// Text containing `FAIL` is rejected.
pub struct FakeVoiceModel {
    pub sample_rate: u32,
    pub clip_len: usize,
    derived: Cell<usize>,
    pub synth_calls: RefCell<Vec<(String, String, Language)>>,
    pub released: RefCell<Vec<String>>,
}

impl FakeVoiceModel {
    pub fn new(sample_rate: u32, clip_len: usize) -> Self {
        Self {
            sample_rate,
            clip_len,
            derived: Cell::new(0),
            synth_calls: RefCell::new(Vec::new()),
            released: RefCell::new(Vec::new()),
        }
    }

    pub fn derived(&self) -> usize {
        self.derived.get()
    }
}

impl VoiceModel for FakeVoiceModel {
    type Identity = String;

    fn derive_identity(
        &self,
        voice_id: &str,
        _audio_path: &Path,
        _transcript: &str,
    ) -> Result<String, VoiceError> {
        let n = self.derived.get() + 1;
        self.derived.set(n);
        Ok(format!("{voice_id}#{n}"))
    }

    fn synthesize(
        &self,
        identity: &String,
        text: &str,
        language: &Language,
    ) -> Result<AudioBuffer, VoiceError> {
        self.synth_calls
            .borrow_mut()
            .push((identity.clone(), text.to_string(), language.clone()));
        if text.contains("FAIL") {
            return Err(VoiceError::Synthesis(format!("refused: {text}")));
        }
        Ok(AudioBuffer::new(vec![0.25; self.clip_len], self.sample_rate))
    }

    fn release_identity(&self, identity: String) -> Result<(), VoiceError> {
        self.released.borrow_mut().push(identity);
        Ok(())
    }
}

pub fn profile(name: &str, topics: &[(&str, &str)]) -> CharacterProfile {
    CharacterProfile {
        name: name.to_string(),
        language: Language::new("English"),
        sample_file: None,
        sample_transcript: None,
        topics: topics
            .iter()
            .map(|(t, l)| (t.to_string(), l.to_string()))
            .collect(),
        intro_phrases: vec!["Well,".to_string()],
    }
}

/// Three characters; `bob` fails to speak about "trouble".
pub fn store() -> TemplateStore {
    let characters = BTreeMap::from([
        (
            "alice".to_string(),
            profile(
                "Alice",
                &[("rust", "Rust keeps me honest."), ("trouble", "No trouble here.")],
            ),
        ),
        (
            "bob".to_string(),
            profile(
                "Bob",
                &[("rust", "Borrowing is sharing."), ("trouble", "FAIL on purpose.")],
            ),
        ),
        (
            "carol".to_string(),
            profile("Carol", &[("rust", "Ship it."), ("trouble", "FAIL as well.")]),
        ),
    ]);
    TemplateStore::from_parts(characters, BTreeMap::new())
}

/// Write placeholder reference samples named `<id>.wav`.
pub fn write_samples(dir: &Path, ids: &[&str]) -> std::io::Result<Vec<PathBuf>> {
    ids.iter()
        .map(|id| {
            let path = dir.join(format!("{id}.wav"));
            fs::write(&path, b"RIFF")?;
            Ok(path)
        })
        .collect()
}
