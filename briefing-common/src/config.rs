//! Configuration loading and root folder resolution
//!
//! Settings are resolved in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! A missing TOML file is not an error: a warning is logged and compiled
//! defaults are used.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable overriding the root folder
pub const ROOT_FOLDER_ENV: &str = "BRIEFING_ROOT_FOLDER";

/// Environment variables checked for the completion API key, in priority order
pub const API_KEY_ENV_VARS: [&str; 2] = ["BRIEFING_COMPLETION_API_KEY", "GROQ_API_KEY"];

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "briefings.db";

/// How the prompt treats information absent from the conversation
///
/// Validation of the model reply is strict under both policies; this only
/// changes what the model is asked to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldPolicy {
    /// Leave unknown fields empty; never fabricate business data
    #[default]
    Strict,
    /// Ask the model to infer realistic values from context
    Infer,
}

/// Completion endpoint settings (OpenAI-compatible chat completions API)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature (0.0 - 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token ceiling
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Bound on the whole completion call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// API key (lowest priority source, see [`resolve_api_key`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            api_key: None,
        }
    }
}

impl CompletionSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Reject settings the completion endpoint would refuse
    pub fn validate(&self) -> Result<()> {
        if self.model.trim().is_empty() {
            return Err(Error::Config("completion.model must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(Error::Config(format!(
                "completion.temperature must be within 0.0-2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(Error::Config("completion.max_tokens must be positive".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config("completion.timeout_secs must be positive".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "completion.base_url must be an http(s) URL, got {}",
                self.base_url
            )));
        }
        Ok(())
    }
}

/// Extraction behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    #[serde(default)]
    pub missing_field_policy: MissingFieldPolicy,
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Origins allowed by CORS
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            cors_origins: default_cors_origins(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup; changes require a restart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub completion: CompletionSettings,

    #[serde(default)]
    pub extraction: ExtractionConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}

fn default_model() -> String {
    "meta-llama/llama-4-scout-17b-16e-instruct".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

/// Default configuration file path for the platform
///
/// `~/.config/briefing/config.toml` on Linux, the platform config directory elsewhere.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("briefing").join("config.toml"))
}

/// Load the TOML configuration
///
/// An explicit `path` that does not exist is an error. When no path is given
/// the default location is tried; if that file is missing, defaults are used.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => match default_config_path() {
            Some(p) => (p, false),
            None => {
                warn!("Could not determine config directory; using defaults");
                return Ok(TomlConfig::default());
            }
        },
    };

    if !path.exists() {
        if explicit {
            return Err(Error::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        warn!(
            "No config file at {}; using compiled defaults",
            path.display()
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(&path)?;
    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Resolve the root folder
///
/// CLI argument → `BRIEFING_ROOT_FOLDER` → TOML `root_folder` → platform default.
pub fn resolve_root_folder(cli_arg: Option<&Path>, toml_config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &toml_config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// OS-dependent default root folder
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("briefing"))
        .unwrap_or_else(|| PathBuf::from("./briefing_data"))
}

/// Creates the root folder and locates files inside it
pub struct RootFolderInitializer {
    root: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Create the root folder if missing
    pub fn ensure_directory_exists(&self) -> Result<()> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root)?;
            info!("Created root folder: {}", self.root.display());
        }
        Ok(())
    }

    pub fn root_folder(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(DATABASE_FILE)
    }
}

/// Resolve the completion API key
///
/// **Priority:** `BRIEFING_COMPLETION_API_KEY` → `GROQ_API_KEY` → TOML `completion.api_key`
pub fn resolve_api_key(settings: &CompletionSettings) -> Result<String> {
    let mut found: Vec<(&str, String)> = Vec::new();

    for var in API_KEY_ENV_VARS {
        if let Ok(key) = std::env::var(var) {
            if is_valid_key(&key) {
                found.push((var, key));
            }
        }
    }

    if let Some(key) = &settings.api_key {
        if is_valid_key(key) {
            found.push(("TOML", key.clone()));
        }
    }

    if found.len() > 1 {
        let sources: Vec<&str> = found.iter().map(|(source, _)| *source).collect();
        warn!(
            "Completion API key found in multiple sources: {}. Using {}.",
            sources.join(", "),
            sources[0]
        );
    }

    match found.into_iter().next() {
        Some((source, key)) => {
            info!("Completion API key loaded from {}", source);
            Ok(key.trim().to_string())
        }
        None => Err(Error::Config(
            "Completion API key not configured. Please configure using one of:\n\
             1. Environment: BRIEFING_COMPLETION_API_KEY=your-key-here\n\
             2. Environment: GROQ_API_KEY=your-key-here\n\
             3. TOML config: [completion] api_key = \"your-key\""
                .to_string(),
        )),
    }
}

/// Validate API key (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}
