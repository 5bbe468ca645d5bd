use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File name looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "voice-panel.json";

// ------------ Model -----------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Base URL of the voice-cloning API.
    pub api_url: String,
    /// Falls back to the `ELEVENLABS_API_KEY` family of env vars when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub model_id: String,
    /// PCM rate requested from the API (16000, 22050, 24000 or 44100).
    pub output_sample_rate: u32,
    pub request_timeout_secs: u64,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            api_url: "https://api.elevenlabs.io".to_string(),
            api_key: None,
            model_id: "eleven_multilingual_v2".to_string(),
            output_sample_rate: 24_000,
            request_timeout_secs: 120,
        }
    }
}

// ------------ PanelConfig (root) -------------
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Relative paths below resolve against this directory.
    pub base_dir: PathBuf,
    pub voices_dir: PathBuf,
    pub output_dir: PathBuf,
    pub characters_path: PathBuf,
    /// Rate of the stitched output.
    pub sample_rate: u32,
    pub pause_between_speakers_ms: u32,
    pub debug: bool,
    pub model: ModelSettings,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            voices_dir: PathBuf::from("voices/samples"),
            output_dir: PathBuf::from("outputs"),
            characters_path: PathBuf::from("prompts/character_prompts.json"),
            sample_rate: crate::audio::SAMPLE_RATE,
            pause_between_speakers_ms: crate::audio::DEFAULT_PAUSE_MS,
            debug: false,
            model: ModelSettings::default(),
        }
    }
}

impl PanelConfig {
    /// Load a JSON config from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let txt = fs::read_to_string(path)?;
        let cfg: PanelConfig = serde_json::from_str(&txt)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save to disk (pretty-printed).
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
    }

    pub fn validate(&self) -> io::Result<()> {
        if self.sample_rate == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "sample_rate must be > 0",
            ));
        }
        Ok(())
    }

    /// Resolve the effective config: `explicit`, then `./voice-panel.json`,
    /// then the per-user config file, then defaults. Environment overrides
    /// are applied last.
    pub fn discover(explicit: Option<&Path>) -> io::Result<Self> {
        let mut cfg = match explicit {
            Some(path) => Self::load(path)?,
            None => match Self::candidate_paths().into_iter().find(|p| p.is_file()) {
                Some(path) => {
                    tracing::debug!(path = %path.display(), "using config file");
                    Self::load(path)?
                }
                None => Self::default(),
            },
        };
        cfg.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    /// Implicit config locations, in lookup order.
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("voice-panel").join("config.json"));
        }
        paths
    }

    /// Apply `MODEL_NAME`, `VOICE_PANEL_API_URL` and `DEBUG` using `lookup`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("MODEL_NAME").filter(|v| !v.trim().is_empty()) {
            self.model.model_id = model;
        }
        if let Some(url) = lookup("VOICE_PANEL_API_URL").filter(|v| !v.trim().is_empty()) {
            self.model.api_url = url;
        }
        if let Some(debug) = lookup("DEBUG") {
            self.debug = debug.trim().eq_ignore_ascii_case("true");
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        // `join` keeps absolute paths as they are.
        self.base_dir.join(path)
    }

    pub fn voices_path(&self) -> PathBuf {
        self.resolve(&self.voices_dir)
    }

    pub fn output_path(&self) -> PathBuf {
        self.resolve(&self.output_dir)
    }

    pub fn characters_file(&self) -> PathBuf {
        self.resolve(&self.characters_path)
    }

    /// Directory generated files are written to.
    pub fn generated_dir(&self) -> PathBuf {
        self.output_path().join("generated")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn partial_documents_fill_defaults() -> anyhow::Result<()> {
        let cfg: PanelConfig =
            serde_json::from_str(r#"{ "base_dir": "/srv/panel", "model": { "model_id": "m1" } }"#)?;
        assert_eq!(cfg.sample_rate, 24_000);
        assert_eq!(cfg.pause_between_speakers_ms, 800);
        assert_eq!(cfg.model.model_id, "m1");
        assert_eq!(cfg.model.api_url, "https://api.elevenlabs.io");
        assert_eq!(
            cfg.voices_path(),
            PathBuf::from("/srv/panel").join("voices/samples")
        );
        Ok(())
    }

    #[test]
    fn env_overrides_win() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("MODEL_NAME", "custom-model"),
            ("VOICE_PANEL_API_URL", "http://localhost:8080"),
            ("DEBUG", "TRUE"),
        ]);
        let mut cfg = PanelConfig::default();
        cfg.apply_env_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.model.model_id, "custom-model");
        assert_eq!(cfg.model.api_url, "http://localhost:8080");
        assert!(cfg.debug);
    }

    #[test]
    fn save_then_load() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested/config.json");
        let mut cfg = PanelConfig::default();
        cfg.pause_between_speakers_ms = 250;
        cfg.save(&path)?;

        let loaded = PanelConfig::load(&path)?;
        assert_eq!(loaded.pause_between_speakers_ms, 250);
        assert!(loaded.model.api_key.is_none());
        Ok(())
    }

    #[test]
    fn zero_rate_is_rejected() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "sample_rate": 0 }"#)?;
        assert!(PanelConfig::load(&path).is_err());
        Ok(())
    }
}
