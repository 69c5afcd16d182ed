//! Configuration loading and management.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Server identity.
    #[serde(default)]
    pub server: ServerConfig,
    /// Network listen configuration.
    #[serde(default)]
    pub listen: ListenConfig,
    /// Relay behavior (echo policy, line limits, throttling).
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

/// Server identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Server name (e.g., "chat.example.net").
    #[serde(default = "default_server_name")]
    pub name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
        }
    }
}

/// Network listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind (IP literal).
    #[serde(default = "default_address")]
    pub address: String,
    /// Port to listen on. The CLI port argument overrides this.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

/// Relay behavior configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayConfig {
    /// Whether a broadcast is echoed back to its sender.
    #[serde(default = "default_true")]
    pub echo_to_sender: bool,
    /// Maximum accepted line length in bytes, terminator included.
    #[serde(default = "default_max_line_len")]
    pub max_line_len: usize,
    /// Messages per second a single connection may sustain.
    #[serde(default = "default_message_rate")]
    pub message_rate: f64,
    /// Burst capacity on top of the sustained rate.
    #[serde(default = "default_message_burst")]
    pub message_burst: f64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            echo_to_sender: default_true(),
            max_line_len: default_max_line_len(),
            message_rate: default_message_rate(),
            message_burst: default_message_burst(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_server_name() -> String {
    "parley.local".to_string()
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5555
}

fn default_max_line_len() -> usize {
    512
}

fn default_message_rate() -> f64 {
    10.0
}

fn default_message_burst() -> f64 {
    20.0
}
