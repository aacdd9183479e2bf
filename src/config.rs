//! Configuration system for ScriptAI
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. Environment variables (SCRIPTAI_* prefix)
//! 2. Configuration file (TOML)
//! 3. Default values
//!
//! The API key itself is never stored here. Only the *name* of the
//! environment variable that holds it is configured, and it is read lazily by
//! the generative client on first use.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::storage::is_valid_key;

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptAiConfig {
    /// Generative-language API settings
    pub gemini: GeminiSettings,

    /// Local persistence settings
    pub storage: StorageSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Generative-language API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// API base URL, without the trailing `/models` segment
    pub base_url: String,

    /// Model identifier used for both analysis and generation
    pub model: String,

    /// Environment variable holding the API key
    pub api_key_env: String,

    /// Transport timeout in seconds (0 = none)
    pub timeout_secs: u64,
}

/// Storage path settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding one JSON file per storage slot
    pub data_dir: String,

    /// Slot name for the persona collection
    pub personas_key: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
            timeout_secs: 0,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.scriptai".to_string(),
            personas_key: "scriptai_personas".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl ScriptAiConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            config = Self::from_file(&path)?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Parse a TOML configuration file without applying overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound {
            path: path.to_path_buf(),
        })?;
        toml::from_str(&content).map_err(|e| Error::ConfigParse {
            message: format!("{}: {}", path.display(), e.message()),
            source: Some(e),
        })
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::ConfigNotFound { path });
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("scriptai.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("scriptai").join("config.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".scriptai").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if path.is_file() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Gemini settings
        if let Ok(val) = std::env::var("SCRIPTAI_BASE_URL") {
            self.gemini.base_url = val;
        }
        if let Ok(val) = std::env::var("SCRIPTAI_MODEL") {
            self.gemini.model = val;
        }
        if let Ok(val) = std::env::var("SCRIPTAI_API_KEY_ENV") {
            self.gemini.api_key_env = val;
        }
        if let Ok(val) = std::env::var("SCRIPTAI_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.gemini.timeout_secs = n;
            }
        }

        // Storage settings
        if let Ok(val) = std::env::var("SCRIPTAI_DATA_DIR") {
            self.storage.data_dir = val;
        }
        if let Ok(val) = std::env::var("SCRIPTAI_PERSONAS_KEY") {
            self.storage.personas_key = val;
        }

        // Logging settings
        if let Ok(val) = std::env::var("SCRIPTAI_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("SCRIPTAI_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("SCRIPTAI_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.storage.data_dir = expand_path(&self.storage.data_dir);

        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.gemini.base_url).map_err(|e| {
            Error::config_field_invalid("gemini.base_url", format!("Invalid URL: {}", e))
        })?;
        if base.scheme() != "https" && base.scheme() != "http" {
            return Err(Error::config_field_invalid(
                "gemini.base_url",
                "Base URL must start with http:// or https://",
            ));
        }

        if self.gemini.model.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "gemini.model",
                "Model identifier cannot be empty",
            ));
        }

        if self.gemini.api_key_env.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "gemini.api_key_env",
                "API key variable name cannot be empty",
            ));
        }

        if !is_valid_key(&self.storage.personas_key) {
            return Err(Error::config_field_invalid(
                "storage.personas_key",
                format!(
                    "Invalid storage key '{}'. Use letters, digits, '_', '-' or '.'",
                    self.storage.personas_key
                ),
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Data directory with `~` expanded
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(expand_path(&self.storage.data_dir))
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or(std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".scriptai")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::config_validation(format!(
            "Configuration file already exists: {}. Pass force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::config_io(parent, e))?;
    }

    fs::write(&config_path, generate_default_config())
        .map_err(|e| Error::config_io(&config_path, e))?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# ScriptAI Configuration

[gemini]
# API base URL (the model path is appended per request)
base_url = "https://generativelanguage.googleapis.com/v1beta"

# Model identifier used for persona analysis and script generation
model = "gemini-3-flash-preview"

# Environment variable that holds the API key
api_key_env = "API_KEY"

# Transport timeout in seconds (0 = no timeout)
timeout_secs = 0

[storage]
# Directory holding one JSON file per storage slot
data_dir = "~/.scriptai"

# Slot name for the persona collection
personas_key = "scriptai_personas"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.scriptai/logs/scriptai.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}
