//! One resolved line of a panel script.
use serde::{Deserialize, Serialize};

use crate::language::Language;

/// A line of dialogue bound to the character who speaks it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptLine {
    pub character_id: String,
    pub character_name: String,
    pub language: Language,
    pub line: String,
    /// Reference sample the character's voice is cloned from.
    pub sample_file: String,
}
