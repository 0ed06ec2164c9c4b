use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Model used for AI translation when the user hasn't picked one.
pub const DEFAULT_MODEL: &str = "moonshotai/kimi-k2-instruct-0905";

/// Errors from reading or writing the config file.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(err) => write!(f, "config I/O error: {err}"),
            ConfigError::Json(err) => write!(f, "config parse error: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(err) => Some(err),
            ConfigError::Json(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

/// The persisted configuration object.
///
/// Key names match the on-disk JSON exactly; unknown keys in an existing
/// file are ignored so older or hand-edited configs still load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(rename = "GROQ_API_KEY", default)]
    pub groq_api_key: String,
    #[serde(rename = "AI_MODEL_NAME", default = "default_model")]
    pub ai_model_name: String,
    #[serde(default = "default_interpreters")]
    pub interpreters: BTreeMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            groq_api_key: String::new(),
            ai_model_name: default_model(),
            interpreters: default_interpreters(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Conventional command per language, before auto-detection refines it.
pub fn default_interpreters() -> BTreeMap<String, String> {
    let defaults = [
        ("python", "python3"),
        ("javascript", "node"),
        ("java", "javac"),
        ("cpp", "g++"),
        ("c", "gcc"),
        ("rust", "rustc"),
        ("go", "go"),
        ("ruby", "ruby"),
        ("php", "php"),
        ("lua", "lua"),
    ];
    defaults
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Config {
    /// Load from `path`.
    ///
    /// A missing file is not an error — first launch gets the defaults. A
    /// file that exists but won't parse is reported via the log and also
    /// falls back to defaults rather than refusing to start.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                log::warn!("failed to read config {}: {e}", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("failed to parse config {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Persist to `path` as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Explicit update for one interpreter entry.
    pub fn set_interpreter(&mut self, language: &str, command: impl Into<String>) {
        self.interpreters
            .insert(language.to_string(), command.into());
    }

    /// Configured command for a language, defaulting to the language key
    /// itself when nothing is configured.
    pub fn interpreter(&self, language: &str) -> String {
        self.interpreters
            .get(language)
            .cloned()
            .unwrap_or_else(|| language.to_string())
    }
}

/// `<platform config dir>/glacier/config.json`, when the platform exposes a
/// config directory at all.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("glacier").join("config.json"))
}
