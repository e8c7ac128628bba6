//! Configuration management
//!
//! This module handles loading, saving, and migrating the gdc configuration file.
//! The configuration file is stored in TOML format at ~/.config/gdc/config.toml,
//! or under `$GDC_CONFIG_DIR` when that is set.
//!
//! PROTECTED FILE: Changes to schema_version require migration support.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Current configuration schema version
///
/// IMPORTANT: Bumping this version requires:
/// 1. Adding a migration in `ConfigManager::migrate`
/// 2. Updating migration tests
/// 3. Marking the change as BREAKING
pub const SCHEMA_VERSION: u32 = 1;

/// Overrides the configuration directory
pub const CONFIG_DIR_ENV: &str = "GDC_CONFIG_DIR";

/// Overrides the OAuth client secrets location
pub const CREDENTIALS_ENV: &str = "GD_CONNECT_CREDENTIALS";

/// Overrides the authorized-user token location
pub const TOKEN_ENV: &str = "GD_CONNECT_TOKEN";

const DEFAULT_OUTPUT: &str = "human";
const DEFAULT_COLOR: &str = "auto";
const DEFAULT_LIST_LIMIT: usize = 100;
const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v3";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Schema version for migration support
    pub schema_version: u32,

    /// Default settings
    #[serde(default)]
    pub defaults: Defaults,

    /// Drive connection settings
    #[serde(default)]
    pub drive: DriveSettings,
}

/// Default settings for CLI behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defaults {
    /// Output format: "human" or "json"
    #[serde(default = "default_output")]
    pub output: String,

    /// Color mode: "auto", "always", or "never"
    #[serde(default = "default_color")]
    pub color: String,

    /// Show progress spinners
    #[serde(default = "default_true")]
    pub progress: bool,

    /// Maximum number of entries `ls` shows
    #[serde(default = "default_list_limit")]
    pub list_limit: usize,
}

/// Where the drive lives and how to authenticate against it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveSettings {
    /// OAuth client secrets file (Desktop client)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,

    /// Authorized-user token file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// Metadata API base URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Media upload API base URL
    #[serde(default = "default_upload_base_url")]
    pub upload_base_url: String,

    /// Per-request timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_output() -> String {
    DEFAULT_OUTPUT.to_string()
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

fn default_true() -> bool {
    true
}

fn default_list_limit() -> usize {
    DEFAULT_LIST_LIMIT
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_upload_base_url() -> String {
    DEFAULT_UPLOAD_BASE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            progress: true,
            list_limit: default_list_limit(),
        }
    }
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            credentials_path: None,
            token_path: None,
            api_base_url: default_api_base_url(),
            upload_base_url: default_upload_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DriveSettings {
    /// Token file: `$GD_CONNECT_TOKEN`, then the configured path, then `token.json`
    /// in the configuration directory
    pub fn effective_token_path(&self, config_dir: &Path) -> PathBuf {
        std::env::var_os(TOKEN_ENV)
            .map(PathBuf::from)
            .or_else(|| self.token_path.clone())
            .unwrap_or_else(|| config_dir.join("token.json"))
    }

    /// Client secrets file, resolved the same way as the token file
    pub fn effective_credentials_path(&self, config_dir: &Path) -> PathBuf {
        std::env::var_os(CREDENTIALS_ENV)
            .map(PathBuf::from)
            .or_else(|| self.credentials_path.clone())
            .unwrap_or_else(|| config_dir.join("credentials.json"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            defaults: Defaults::default(),
            drive: DriveSettings::default(),
        }
    }
}

/// The gdc configuration directory
pub fn config_dir() -> Result<PathBuf> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    let base = dirs::config_dir()
        .ok_or_else(|| Error::Config("Could not determine config directory".into()))?;
    Ok(base.join("gdc"))
}

/// Configuration manager handles loading and saving config
#[derive(Debug)]
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the default config path
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: config_dir()?.join("config.toml"),
        })
    }

    /// Create a ConfigManager with a custom path (useful for testing)
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the configuration file path
    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }

    /// Directory holding the config file, token and working-directory state
    pub fn config_dir(&self) -> PathBuf {
        self.config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    /// Location of the persisted working directory
    pub fn state_path(&self) -> PathBuf {
        self.config_dir().join("state.json")
    }

    /// Load configuration from disk
    ///
    /// If the configuration file doesn't exist, returns a default configuration.
    /// If the schema version doesn't match, attempts migration.
    pub fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&self.config_path)?;
        let mut config: Config = toml::from_str(&content)?;

        if config.schema_version < SCHEMA_VERSION {
            config = self.migrate(config)?;
        } else if config.schema_version > SCHEMA_VERSION {
            return Err(Error::Config(format!(
                "Configuration file version {} is newer than supported version {}. Please upgrade gdc.",
                config.schema_version, SCHEMA_VERSION
            )));
        }

        if config.defaults.list_limit == 0 {
            return Err(Error::Config("defaults.list_limit must be at least 1".into()));
        }

        Ok(config)
    }

    /// Save configuration to disk
    ///
    /// Creates parent directories if they don't exist.
    /// Sets file permissions to 600 (owner read/write only).
    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(config)?;
        std::fs::write(&self.config_path, content)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let permissions = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.config_path, permissions)?;
        }

        Ok(())
    }

    /// Migrate configuration from older schema version
    fn migrate(&self, config: Config) -> Result<Config> {
        let mut config = config;

        // Add migration logic here when schema version is bumped

        config.schema_version = SCHEMA_VERSION;
        Ok(config)
    }
}
