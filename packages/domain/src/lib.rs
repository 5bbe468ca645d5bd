//! # Voice Panel Domain
//!
//! Value types shared between the script, voice and audio layers of the
//! voice panel. Nothing in here talks to a model or the filesystem.

pub mod audio_buffer;
pub mod language;
pub mod script_line;

pub use audio_buffer::AudioBuffer;
pub use language::Language;
pub use script_line::ScriptLine;
