//! Configuration management for TamperChain

use crate::blockchain::GENESIS_TIMESTAMP;
use crate::crypto::DISPLAY_HASH_LEN;
use crate::error::{ChainError, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "tamperchain.toml";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LedgerConfig {
    #[serde(default = "default_genesis_timestamp")]
    pub genesis_timestamp: String,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            genesis_timestamp: default_genesis_timestamp(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_hash_prefix_len")]
    pub hash_prefix_len: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            hash_prefix_len: default_hash_prefix_len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

/// Loads `tamperchain.toml` from the working directory, falling back to
/// defaults when the file is absent.
pub fn load_config() -> Result<Config> {
    load_config_from(DEFAULT_CONFIG_FILE)
}

pub fn load_config_from(path: impl AsRef<Path>) -> Result<Config> {
    let config = match fs::read_to_string(path.as_ref()) {
        Ok(contents) => parse_config(&contents)?,
        Err(e) if e.kind() == ErrorKind::NotFound => Config::default(),
        Err(e) => return Err(e.into()),
    };
    config.validate()?;
    Ok(config)
}

pub fn parse_config(contents: &str) -> Result<Config> {
    let config: Config = toml::from_str(contents)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.display.hash_prefix_len == 0 || self.display.hash_prefix_len > 64 {
            return Err(ChainError::Config(format!(
                "display.hash_prefix_len must be between 1 and 64, got {}",
                self.display.hash_prefix_len
            )));
        }

        if self.logging.filter.trim().is_empty() {
            return Err(ChainError::Config("logging.filter must not be empty".to_string()));
        }

        Ok(())
    }
}

fn default_genesis_timestamp() -> String {
    GENESIS_TIMESTAMP.to_string()
}

fn default_hash_prefix_len() -> usize {
    DISPLAY_HASH_LEN
}

fn default_log_filter() -> String {
    "info".to_string()
}
