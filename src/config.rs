//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::library::DEFAULT_TOP_SEQUENCES;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which entry store backs the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Entries live in process memory only
    Memory,
    /// Local SQLite database under `data_dir`
    #[default]
    Sqlite,
    /// Hosted Supabase project
    Supabase,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Sqlite => "sqlite",
            StoreBackend::Supabase => "supabase",
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            "supabase" => Ok(StoreBackend::Supabase),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Entry store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default)]
    pub supabase: SupabaseConfig,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("yoga-journal").to_string_lossy().to_string())
        .unwrap_or_else(|| "./yoga_journal_data".to_string())
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: default_data_dir(),
            supabase: SupabaseConfig::default(),
        }
    }
}

/// Supabase project settings
#[derive(Debug, Clone, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. "https://abcd.supabase.co"
    #[serde(default)]
    pub url: String,

    /// Public anon key, sent as `apikey`
    #[serde(default)]
    pub anon_key: String,

    /// Signed-in user's JWT; the anon key is used when absent
    #[serde(default)]
    pub access_token: Option<String>,

    /// Owner written to the `user_id` column on insert
    #[serde(default)]
    pub user_id: Option<String>,

    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_photo_bucket")]
    pub photo_bucket: String,

    #[serde(default = "default_supabase_timeout")]
    pub request_timeout_ms: u64,
}

fn default_table() -> String {
    "journal_entries".to_string()
}

fn default_photo_bucket() -> String {
    "journal-photos".to_string()
}

fn default_supabase_timeout() -> u64 {
    10_000
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            access_token: None,
            user_id: None,
            table: default_table(),
            photo_bucket: default_photo_bucket(),
            request_timeout_ms: default_supabase_timeout(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8090
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_body_size() -> usize {
    // photos are referenced by URL, entries stay small
    2 * 1024 * 1024
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![
                "http://localhost:5173".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
            request_timeout_secs: default_request_timeout(),
            max_body_size: default_max_body_size(),
        }
    }
}

/// Analytics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsConfig {
    /// How many frequent sequences to surface
    #[serde(default = "default_top_sequences")]
    pub top_sequences: usize,
}

fn default_top_sequences() -> usize {
    DEFAULT_TOP_SEQUENCES
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            top_sequences: default_top_sequences(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("yoga-journal").join("config.toml")),
            Some(PathBuf::from("/etc/yoga-journal/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Store overrides
        if let Some(data_dir) = lookup("YOGA_JOURNAL_DATA_DIR") {
            self.store.data_dir = data_dir;
        }
        if let Some(backend) = lookup("YOGA_JOURNAL_STORE") {
            match backend.parse() {
                Ok(b) => self.store.backend = b,
                Err(e) => tracing::warn!("Ignoring YOGA_JOURNAL_STORE: {}", e),
            }
        }
        if let Some(url) = lookup("YOGA_JOURNAL_SUPABASE_URL") {
            self.store.supabase.url = url;
        }
        if let Some(key) = lookup("YOGA_JOURNAL_SUPABASE_KEY") {
            self.store.supabase.anon_key = key;
        }
        if let Some(token) = lookup("YOGA_JOURNAL_ACCESS_TOKEN") {
            self.store.supabase.access_token = Some(token);
        }

        // API overrides
        if let Some(host) = lookup("YOGA_JOURNAL_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("YOGA_JOURNAL_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("YOGA_JOURNAL_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("YOGA_JOURNAL_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Yoga Journal Configuration
#
# Environment variables override these settings:
# - YOGA_JOURNAL_DATA_DIR
# - YOGA_JOURNAL_STORE
# - YOGA_JOURNAL_SUPABASE_URL
# - YOGA_JOURNAL_SUPABASE_KEY
# - YOGA_JOURNAL_ACCESS_TOKEN
# - YOGA_JOURNAL_API_HOST
# - YOGA_JOURNAL_API_PORT
# - YOGA_JOURNAL_LOG_LEVEL
# - YOGA_JOURNAL_LOG_FORMAT

[store]
# Entry store backend: memory, sqlite or supabase
backend = "sqlite"

# Directory holding journal.db for the sqlite backend
data_dir = "~/.local/share/yoga-journal"

[store.supabase]
# Project URL and public anon key
url = ""
anon_key = ""

# Signed-in user's access token (JWT); falls back to the anon key
# access_token = ""

# Owner id written to new rows
# user_id = ""

# Table and storage bucket names
table = "journal_entries"
photo_bucket = "journal-photos"

# Request timeout in milliseconds
request_timeout_ms = 10000

[api]
# API server host
host = "127.0.0.1"

# API server port
port = 8090

# Allowed CORS origins
cors_origins = ["http://localhost:5173", "http://127.0.0.1:5173"]

# Request timeout in seconds
request_timeout_secs = 30

# Largest accepted request body (bytes)
max_body_size = 2097152

[analytics]
# Number of frequent pose sequences to show
top_sequences = 3

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/yoga-journal/yoga-journal.log"
"#
    .to_string()
}
