//! Render multi-speaker "panel discussion" audio: template-driven lines,
//! spoken one at a time by cloned voices and stitched into a single WAV.

pub mod audio;
pub mod cli;
pub mod config;
pub mod panel;
pub mod script;
pub mod setup;
pub mod utils;
pub mod voice;

pub use voice_panel_domain::{AudioBuffer, Language, ScriptLine};

pub use audio::{AudioError, AudioStitcher, StitchOptions};
pub use config::{ModelSettings, PanelConfig};
pub use panel::{
    LineFailure, PanelError, PanelOutcome, PanelRenderer, PanelRequest, Progress, VoiceLoadReport,
};
pub use script::{ScriptError, ScriptGenerator, TemplateStore};
pub use voice::{VoiceCloner, VoiceError, VoiceModel};
