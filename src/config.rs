use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_path")]
    pub log_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

/// Action name -> key combination. Two keys are separated by a space ("g g").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub quit: String,
    pub save: String,
    pub help: String,
    pub row_up: String,
    pub row_down: String,
    pub column_left: String,
    pub column_right: String,
    pub first_row: String,
    pub last_row: String,
    pub next_tab: String,
    pub prev_tab: String,
    pub new_entry: String,
    pub delete_entry: String,
    pub edit_cell: String,
    pub increment: String,
    pub decrement: String,
    pub new_type: String,
    pub rename_type: String,
    pub delete_type: String,
    pub confirm: String,
    pub cancel: String,
    pub clear_input: String,
    pub yes: String,
    pub no: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub fg: String,
    pub bg: String,
    pub highlight_bg: String,
    pub highlight_fg: String,
    pub tab_bg: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_path: default_log_path(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            theme: Theme::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let key = |s: &str| s.to_string();
        Self {
            quit: key("q"),
            save: key("Ctrl+s"),
            help: key("?"),
            row_up: key("k"),
            row_down: key("j"),
            column_left: key("h"),
            column_right: key("l"),
            first_row: key("g g"),
            last_row: key("G"),
            next_tab: key("Tab"),
            prev_tab: key("BackTab"),
            new_entry: key("n"),
            delete_entry: key("d d"),
            edit_cell: key("Enter"),
            increment: key("+"),
            decrement: key("-"),
            new_type: key("t n"),
            rename_type: key("t r"),
            delete_type: key("t d"),
            confirm: key("Enter"),
            cancel: key("Esc"),
            clear_input: key("Ctrl+u"),
            yes: key("y"),
            no: key("n"),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: "white".to_string(),
            bg: "black".to_string(),
            highlight_bg: "blue".to_string(),
            highlight_fg: "white".to_string(),
            tab_bg: "gray".to_string(),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    Config::default_data_path_for_profile(utils::Profile::Prod, "media.db")
}

fn default_log_path() -> String {
    Config::default_data_path_for_profile(utils::Profile::Prod, "mtrack.log")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config dir, or create the
    /// default file if it is missing. Data paths always follow the profile.
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let mut config = Self::load_or_create(&config_path)?;

        // Ensure data paths match profile (in case config was manually edited)
        config.database_path = Self::default_data_path_for_profile(profile, "media.db");
        config.log_path = Self::default_data_path_for_profile(profile, "mtrack.log");

        Ok(config)
    }

    /// Load configuration from an explicit file, creating it with defaults
    /// if missing. Paths inside the file are honoured as written.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        Self::load_or_create(path)
    }

    fn load_or_create(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to(config_path)?;
            Ok(config)
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile).ok_or_else(|| {
            ConfigError::ConfigDirError("Could not determine config directory".to_string())
        })?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default path of a data file for a specific profile
    fn default_data_path_for_profile(profile: utils::Profile, file_name: &str) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join(file_name).to_string_lossy().to_string()
        } else {
            let app_dir = profile.app_name();
            #[cfg(target_os = "macos")]
            {
                format!("~/Library/Application Support/{}/{}", app_dir, file_name)
            }
            #[cfg(not(target_os = "macos"))]
            {
                format!("~/.local/share/{}/{}", app_dir, file_name)
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Get the expanded log file path (with ~ expansion)
    pub fn get_log_path(&self) -> PathBuf {
        utils::expand_path(&self.log_path)
    }
}
