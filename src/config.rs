//! Configuration for the listener binaries.
//!
//! Supports both command-line arguments and an optional TOML file.
//! CLI arguments take precedence over config file values.

use clap::{Args, Parser};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Options shared by both listener binaries.
#[derive(Args, Debug)]
pub struct CommonArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

/// Command-line arguments for `echo-listener`
#[derive(Parser, Debug)]
#[command(name = "echo-listener")]
#[command(version = "0.1.0")]
#[command(about = "Accept one TCP connection on <PORT> and echo one read to stdout", long_about = None)]
pub struct EchoArgs {
    /// Port to listen on (all interfaces)
    pub port: u16,

    #[command(flatten)]
    pub common: CommonArgs,
}

/// Command-line arguments for `ephemeral-listener`
#[derive(Parser, Debug)]
#[command(name = "ephemeral-listener")]
#[command(version = "0.1.0")]
#[command(
    about = "Listen on an OS-assigned port, print it, then echo one read to stdout",
    long_about = None
)]
pub struct EphemeralArgs {
    #[command(flatten)]
    pub common: CommonArgs,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Port to bind; 0 asks the OS for an ephemeral port.
    pub port: u16,
    pub log_level: String,
}

impl Config {
    /// Resolve configuration for `echo-listener`.
    pub fn from_echo_args(args: EchoArgs) -> Result<Self, ConfigError> {
        Self::resolve(args.port, args.common)
    }

    /// Resolve configuration for `ephemeral-listener`.
    pub fn from_ephemeral_args(args: EphemeralArgs) -> Result<Self, ConfigError> {
        Self::resolve(0, args.common)
    }

    fn resolve(port: u16, common: CommonArgs) -> Result<Self, ConfigError> {
        let toml_config = match common.config {
            Some(ref path) => load_toml(path)?,
            None => TomlConfig::default(),
        };

        Ok(Config {
            port,
            log_level: if common.log_level != "info" {
                common.log_level
            } else {
                toml_config.logging.level
            },
        })
    }
}

fn load_toml(path: &Path) -> Result<TomlConfig, ConfigError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead(path.to_path_buf(), e))?;
    toml::from_str(&contents).map_err(|e| ConfigError::TomlParse(path.to_path_buf(), e))
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_echo_args_port() {
        let args = EchoArgs::try_parse_from(["echo-listener", "5555"]).unwrap();
        let config = Config::from_echo_args(args).unwrap();
        assert_eq!(config.port, 5555);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_echo_args_require_port() {
        assert!(EchoArgs::try_parse_from(["echo-listener"]).is_err());
        assert!(EchoArgs::try_parse_from(["echo-listener", "65536"]).is_err());
        assert!(EchoArgs::try_parse_from(["echo-listener", "abc"]).is_err());
    }

    #[test]
    fn test_ephemeral_uses_port_zero() {
        let args =
            EphemeralArgs::try_parse_from(["ephemeral-listener", "--log-level", "warn"]).unwrap();
        let config = Config::from_ephemeral_args(args).unwrap();
        assert_eq!(config.port, 0);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_missing_config_file() {
        let args = EphemeralArgs::try_parse_from([
            "ephemeral-listener",
            "--config",
            "/nonexistent/oneshot-listener.toml",
        ])
        .unwrap();
        match Config::from_ephemeral_args(args) {
            Err(ConfigError::FileRead(path, _)) => {
                assert!(path.ends_with("oneshot-listener.toml"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}
