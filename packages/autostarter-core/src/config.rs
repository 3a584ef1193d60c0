use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutostartConfig {
    pub defaults: DefaultsConfig,
    pub directories: DirectoriesConfig,
    /// Where the configuration came from
    #[serde(skip)]
    pub source: ConfigSource,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Interpreter used instead of the platform default (e.g. "bash")
    pub interpreter: Option<String>,
    /// Register entries for all users unless told otherwise
    pub system_wide: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoriesConfig {
    /// Replaces the per-user startup directory
    pub per_user: Option<PathBuf>,
    /// Replaces the system-wide startup directory
    pub system_wide: Option<PathBuf>,
}

impl AutostartConfig {
    /// Configured interpreter, ignoring blank values
    pub fn interpreter(&self) -> Option<&str> {
        self.defaults
            .interpreter
            .as_deref()
            .map(str::trim)
            .filter(|i| !i.is_empty())
    }
}

/// Where the configuration came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConfigSource {
    /// No config file, using built-in defaults
    #[default]
    Default,
    /// Loaded from config file
    ConfigFile,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::Default => write!(f, "default"),
            ConfigSource::ConfigFile => write!(f, "config file"),
        }
    }
}

/// Get the path to the configuration file
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .map(|p| p.join("autostarter").join("config.toml"))
}

/// Get the path to the config file for documentation purposes
pub fn config_file_path_string() -> String {
    config_file_path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "~/.config/autostarter/config.toml".to_string())
}

/// Load configuration from the default location (~/.config/autostarter/config.toml)
pub fn load_config() -> AutostartConfig {
    match config_file_path() {
        Some(path) => load_config_from(&path),
        None => {
            tracing::debug!("No config directory available, using defaults");
            AutostartConfig::default()
        }
    }
}

/// Load configuration from a specific file.
///
/// A missing, unreadable or malformed file yields the defaults.
pub fn load_config_from(path: &Path) -> AutostartConfig {
    if !path.exists() {
        tracing::debug!("No config file at {:?}, using defaults", path);
        return AutostartConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str::<AutostartConfig>(&content) {
            Ok(mut config) => {
                tracing::debug!("Loaded config from {:?}", path);
                config.source = ConfigSource::ConfigFile;
                config
            }
            Err(e) => {
                tracing::warn!("Failed to parse config file {:?}: {}", path, e);
                AutostartConfig::default()
            }
        },
        Err(e) => {
            tracing::warn!("Failed to read config file {:?}: {}", path, e);
            AutostartConfig::default()
        }
    }
}

/// Generate example config file content
pub fn generate_example_config() -> String {
    r#"# Autostarter Configuration
# Place this file at: ~/.config/autostarter/config.toml

[defaults]
# Program used to run registered scripts
# Default: "cmd" on Windows, "sh" elsewhere
# interpreter = "bash"

# Register entries for all users (requires root/administrator)
# system_wide = false

[directories]
# Override where startup entries are written
# per_user = "/home/me/.config/autostart"
# system_wide = "/etc/init.d"
"#
    .to_string()
}
