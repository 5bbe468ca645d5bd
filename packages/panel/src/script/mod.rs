//! Template-driven dialogue for the panel.

use std::path::PathBuf;

pub mod generator;
pub mod templates;

pub use generator::{DEFAULT_PANEL, ScriptGenerator, preview_markdown};
pub use templates::{CharacterProfile, TemplateStore};

/// Errors raised while loading templates or resolving characters.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown character: {0}")]
    UnknownCharacter(String),
}
