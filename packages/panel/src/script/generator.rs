//! Turns a topic and a speaking order into panel lines.

use rand::Rng;
use rand::seq::IndexedRandom;
use std::fmt::Write as _;

use voice_panel_domain::ScriptLine;

use super::{CharacterProfile, ScriptError, TemplateStore};

/// Speaking order used when the caller does not pick one.
pub const DEFAULT_PANEL: [&str; 4] = ["modi", "amitabh", "srk", "trump"];

/// Generates character-appropriate lines from a [`TemplateStore`].
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    store: TemplateStore,
}

impl ScriptGenerator {
    pub fn new(store: TemplateStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TemplateStore {
        &self.store
    }

    /// Script for `topic` spoken by `character_order`, using thread-local
    /// randomness for fallback openers.
    pub fn generate<S: AsRef<str>>(&self, topic: &str, character_order: &[S]) -> Vec<ScriptLine> {
        self.generate_with_rng(topic, character_order, &mut rand::rng())
    }

    /// Like [`generate`](Self::generate) with an explicit randomness source.
    ///
    /// Unknown ids are skipped; an unknown topic never fails and yields the
    /// generic line that quotes `topic` as the caller wrote it.
    pub fn generate_with_rng<S, R>(
        &self,
        topic: &str,
        character_order: &[S],
        rng: &mut R,
    ) -> Vec<ScriptLine>
    where
        S: AsRef<str>,
        R: Rng + ?Sized,
    {
        let canonical = self.store.normalize_topic(topic);
        let mut script = Vec::with_capacity(character_order.len());

        for id in character_order {
            let id = id.as_ref();
            let Some(profile) = self.store.character(id) else {
                tracing::debug!(character = id, "skipping unknown character");
                continue;
            };

            let line = match profile.topic_line(&canonical) {
                Some(line) => line.to_string(),
                None => {
                    let intro = pick_intro(profile, rng);
                    with_intro(
                        intro,
                        &format!(
                            "{topic} is an important subject that deserves our attention and thoughtful discussion."
                        ),
                    )
                }
            };

            script.push(script_line(id, profile, line));
        }

        script
    }

    /// Full panel script; `None` uses [`DEFAULT_PANEL`].
    pub fn generate_panel_script(
        &self,
        topic: &str,
        character_order: Option<&[String]>,
    ) -> Vec<ScriptLine> {
        match character_order {
            Some(order) => self.generate(topic, order),
            None => self.generate(topic, &DEFAULT_PANEL),
        }
    }

    /// A single line for `character_id`: custom text wins, then the topic
    /// line, then a short generic opener.
    pub fn generate_custom_line(
        &self,
        character_id: &str,
        topic: &str,
        custom_text: Option<&str>,
    ) -> Result<ScriptLine, ScriptError> {
        self.generate_custom_line_with_rng(character_id, topic, custom_text, &mut rand::rng())
    }

    pub fn generate_custom_line_with_rng<R: Rng + ?Sized>(
        &self,
        character_id: &str,
        topic: &str,
        custom_text: Option<&str>,
        rng: &mut R,
    ) -> Result<ScriptLine, ScriptError> {
        let profile = self
            .store
            .character(character_id)
            .ok_or_else(|| ScriptError::UnknownCharacter(character_id.to_string()))?;
        let canonical = self.store.normalize_topic(topic);

        let custom = custom_text.filter(|t| !t.trim().is_empty());
        let line = match (custom, profile.topic_line(&canonical)) {
            (Some(text), _) => text.to_string(),
            (None, Some(line)) => line.to_string(),
            (None, None) => with_intro(
                pick_intro(profile, rng),
                &format!("Let me share my thoughts on {topic}."),
            ),
        };

        Ok(script_line(character_id, profile, line))
    }

    pub fn available_characters(&self) -> Vec<String> {
        self.store.character_ids()
    }

    pub fn available_topics(&self) -> Vec<String> {
        self.store.topics()
    }
}

fn pick_intro<'a, R: Rng + ?Sized>(profile: &'a CharacterProfile, rng: &mut R) -> &'a str {
    profile
        .intro_phrases
        .choose(rng)
        .map(String::as_str)
        .unwrap_or("")
}

fn with_intro(intro: &str, rest: &str) -> String {
    let intro = intro.trim();
    if intro.is_empty() {
        rest.to_string()
    } else {
        format!("{intro} {rest}")
    }
}

fn script_line(id: &str, profile: &CharacterProfile, line: String) -> ScriptLine {
    ScriptLine {
        character_id: id.to_string(),
        character_name: profile.name.clone(),
        language: profile.language.clone(),
        line,
        sample_file: profile.sample_file_for(id),
    }
}

/// Markdown rendering of a script, for previews.
pub fn preview_markdown(script: &[ScriptLine]) -> String {
    let mut out = String::from("## Generated Script\n\n");
    for item in script {
        // Writing into a String cannot fail.
        let _ = write!(
            out,
            "**{}** ({}):\n> {}\n\n",
            item.character_name, item.language, item.line
        );
    }
    out
}
