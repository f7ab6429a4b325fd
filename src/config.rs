//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::protocol::{Endpoints, DEFAULT_HTTP_BASE};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub client: ClientConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the client finds the chat backend
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_url")]
    pub http_url: String,

    /// Derived from `http_url` when unset
    #[serde(default)]
    pub ws_url: Option<String>,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_http_url() -> String {
    DEFAULT_HTTP_BASE.to_string()
}

fn default_request_timeout() -> u64 {
    30
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_url: default_http_url(),
            ws_url: None,
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ServerConfig {
    /// Backend URLs described by this section
    pub fn endpoints(&self) -> Endpoints {
        match &self.ws_url {
            Some(ws_url) => Endpoints::new(&self.http_url, ws_url),
            None => Endpoints::from_http_base(&self.http_url),
        }
    }
}

/// Terminal client settings
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// File holding the last created room/conversation
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

fn default_state_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("mmchat").join("state.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./mmchat_state.json".to_string())
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

/// Development backend settings
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory holding `index.html` and the web client bundle
    #[serde(default = "default_static_dir")]
    pub static_dir: String,

    /// Model of single-mode rooms and the first comparison conversation
    #[serde(default = "default_model1")]
    pub model1: String,

    /// Second model of comparison rooms
    #[serde(default = "default_model2")]
    pub model2: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_static_dir() -> String {
    "./interface".to_string()
}

fn default_model1() -> String {
    "echo-small".to_string()
}

fn default_model2() -> String {
    "echo-large".to_string()
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: default_static_dir(),
            model1: default_model1(),
            model2: default_model2(),
        }
    }
}

impl BackendConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
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
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
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
            dirs::config_dir().map(|p| p.join("mmchat").join("config.toml")),
            Some(PathBuf::from("./mmchat.toml")),
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

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Server overrides
        if let Some(url) = var("MMCHAT_SERVER_URL") {
            self.server.http_url = url;
        }
        if let Some(url) = var("MMCHAT_WS_URL") {
            self.server.ws_url = Some(url);
        }

        // Client overrides
        if let Some(path) = var("MMCHAT_STATE_FILE") {
            self.client.state_file = path;
        }

        // Backend overrides
        if let Some(host) = var("MMCHAT_HOST") {
            self.backend.host = host;
        }
        if let Some(port) = var("MMCHAT_PORT") {
            if let Ok(p) = port.parse() {
                self.backend.port = p;
            }
        }
        if let Some(dir) = var("MMCHAT_STATIC_DIR") {
            self.backend.static_dir = dir;
        }
        if let Some(model) = var("MODEL1") {
            self.backend.model1 = model;
        }
        if let Some(model) = var("MODEL2") {
            self.backend.model2 = model;
        }

        // Logging overrides
        if let Some(level) = var("MMCHAT_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("MMCHAT_LOG_FORMAT") {
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
    r#"# mmchat Configuration
#
# Environment variables override these settings:
# - MMCHAT_SERVER_URL, MMCHAT_WS_URL
# - MMCHAT_STATE_FILE
# - MMCHAT_HOST, MMCHAT_PORT, MMCHAT_STATIC_DIR
# - MODEL1, MODEL2
# - MMCHAT_LOG_LEVEL, MMCHAT_LOG_FORMAT

[server]
# Chat backend base URL
http_url = "http://localhost:8000"

# WebSocket base URL (default: derived from http_url)
# ws_url = "ws://localhost:8000"

# Request timeout in seconds
request_timeout_secs = 30

[client]
# Where the last created room/conversation is remembered
state_file = "~/.local/share/mmchat/state.json"

[backend]
# Development backend host
host = "0.0.0.0"

# Development backend port
port = 8000

# Directory with index.html and the web client bundle
static_dir = "./interface"

# Models answering single (model1) and comparison (model1 + model2) rooms.
# An empty name disables the rooms that need it.
model1 = "echo-small"
model2 = "echo-large"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
