//! Character profiles and topic aliases, loaded once from JSON.

use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use voice_panel_domain::Language;

use super::ScriptError;

/// File holding `{"topic_aliases": {...}}`, looked up next to the characters
/// document.
pub const TOPIC_TEMPLATES_FILE: &str = "topic_templates.json";

const DEFAULT_TRANSCRIPT: &str = "Sample voice for cloning.";

/// Scripted persona with its reference voice sample.
#[derive(Debug, Clone, Deserialize)]
pub struct CharacterProfile {
    pub name: String,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub sample_file: Option<String>,
    #[serde(default)]
    pub sample_transcript: Option<String>,
    /// Canonical topic → prewritten line.
    #[serde(default)]
    pub topics: BTreeMap<String, String>,
    /// Openers for the generic fallback line.
    #[serde(default)]
    pub intro_phrases: Vec<String>,
}

impl CharacterProfile {
    /// Reference sample file name, `<id>.wav` when the profile omits it.
    pub fn sample_file_for(&self, id: &str) -> String {
        self.sample_file
            .clone()
            .unwrap_or_else(|| format!("{id}.wav"))
    }

    /// Transcript of the reference sample.
    pub fn transcript(&self) -> &str {
        self.sample_transcript
            .as_deref()
            .unwrap_or(DEFAULT_TRANSCRIPT)
    }

    pub fn topic_line(&self, canonical_topic: &str) -> Option<&str> {
        self.topics.get(canonical_topic).map(String::as_str)
    }
}

#[derive(Debug, Default, Deserialize)]
struct TopicTemplates {
    #[serde(default)]
    topic_aliases: BTreeMap<String, String>,
}

/// Read-only character and alias tables.
#[derive(Debug, Clone, Default)]
pub struct TemplateStore {
    characters: BTreeMap<String, CharacterProfile>,
    aliases: BTreeMap<String, String>,
}

fn canonical(key: &str) -> String {
    key.trim().to_lowercase()
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ScriptError> {
    let text = fs::read_to_string(path).map_err(|source| ScriptError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| ScriptError::Json {
        path: path.to_path_buf(),
        source,
    })
}

impl TemplateStore {
    /// Load the characters document and, when present, the sibling
    /// `topic_templates.json`.
    pub fn load(characters_path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let characters_path = characters_path.as_ref();
        let characters: BTreeMap<String, CharacterProfile> = read_json(characters_path)?;

        let aliases_path = characters_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(TOPIC_TEMPLATES_FILE);
        let aliases = if aliases_path.exists() {
            read_json::<TopicTemplates>(&aliases_path)?.topic_aliases
        } else {
            tracing::debug!(path = %aliases_path.display(), "no topic alias document");
            BTreeMap::new()
        };

        let store = Self::from_parts(characters, aliases);
        tracing::info!(
            characters = store.characters.len(),
            aliases = store.aliases.len(),
            path = %characters_path.display(),
            "loaded character templates"
        );
        Ok(store)
    }

    /// Build a store in memory. Topic keys and aliases are lower-cased and
    /// trimmed so lookups are case-insensitive.
    pub fn from_parts(
        characters: BTreeMap<String, CharacterProfile>,
        aliases: BTreeMap<String, String>,
    ) -> Self {
        let characters = characters
            .into_iter()
            .map(|(id, mut profile)| {
                profile.topics = profile
                    .topics
                    .into_iter()
                    .map(|(topic, line)| (canonical(&topic), line))
                    .collect();
                (id, profile)
            })
            .collect();
        let aliases = aliases
            .into_iter()
            .map(|(alias, topic)| (canonical(&alias), canonical(&topic)))
            .collect();

        Self {
            characters,
            aliases,
        }
    }

    pub fn character(&self, id: &str) -> Option<&CharacterProfile> {
        self.characters.get(id)
    }

    pub fn character_ids(&self) -> Vec<String> {
        self.characters.keys().cloned().collect()
    }

    /// Every topic that has at least one prewritten line.
    pub fn topics(&self) -> Vec<String> {
        self.characters
            .values()
            .flat_map(|c| c.topics.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    /// Lower-case and trim `topic`, then resolve it through the alias table.
    pub fn normalize_topic(&self, topic: &str) -> String {
        let lowered = canonical(topic);
        match self.aliases.get(&lowered) {
            Some(target) => target.clone(),
            None => lowered,
        }
    }
}
