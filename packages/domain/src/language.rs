//! Free-form language tag passed through to the voice model.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Language requested for a line of speech, e.g. `"English"` or `"hi"`.
///
/// The tag is not validated here; each voice backend decides how to map it.
/// [`Language::AUTO`] asks the backend to detect the language itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Language(String);

impl Language {
    /// Tag meaning "let the model decide".
    pub const AUTO: &'static str = "Auto";

    /// Create a new language tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Automatic detection.
    pub fn auto() -> Self {
        Self(Self::AUTO.to_string())
    }

    /// Get the underlying tag.
    pub fn tag(&self) -> &str {
        &self.0
    }

    /// True for `"Auto"` in any casing, and for an empty tag.
    pub fn is_auto(&self) -> bool {
        let tag = self.0.trim();
        tag.is_empty() || tag.eq_ignore_ascii_case(Self::AUTO)
    }
}

impl Default for Language {
    fn default() -> Self {
        Self::auto()
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Language {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl From<String> for Language {
    fn from(tag: String) -> Self {
        Self(tag)
    }
}
