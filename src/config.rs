//! Configuration management for tinyftp
//!
//! Both binaries layer their settings the same way: built-in defaults, then
//! an optional TOML file, then environment variables, then command-line
//! overrides applied by the binary itself.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Default config file stem, looked up in the working directory.
const DEFAULT_CONFIG_NAME: &str = "tinyftp";

/// Server settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    /// IP address to bind the control listener
    /// Environment: TINYFTPD_BIND_ADDRESS
    pub bind_address: String,

    /// Port for the control connection
    /// Environment: TINYFTPD_CONTROL_PORT
    pub control_port: u16,

    /// Directory RETR paths are resolved against
    pub server_root: PathBuf,

    /// `username:password` list, re-read on every login
    pub credentials_file: PathBuf,

    /// Chunk size for data channel writes
    pub buffer_size: usize,

    /// Longest accepted command line, terminator included
    pub max_command_length: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            control_port: 2121,
            server_root: PathBuf::from("."),
            credentials_file: PathBuf::from("./ftpusers"),
            buffer_size: 512,
            max_command_length: 512,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file with `TINYFTPD_*` environment overrides.
    ///
    /// With no explicit path, `tinyftp.toml` in the working directory is used
    /// when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: ServerConfig = build(path, "TINYFTPD")?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Get bind address and control port as socket address
    pub fn control_socket(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.bind_address, self.control_port)
            .parse()
            .map_err(|e| {
                ConfigError::Message(format!("invalid bind address {:?}: {e}", self.bind_address))
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_command_length < 8 {
            return Err(ConfigError::Message(
                "max_command_length must be at least 8".into(),
            ));
        }

        if self.server_root.as_os_str().is_empty() {
            return Err(ConfigError::Message("server_root cannot be empty".into()));
        }

        self.control_socket().map(|_| ())
    }
}

/// Client settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Where retrieved files are written
    pub download_dir: PathBuf,

    /// Chunk size for data channel reads
    pub buffer_size: usize,

    /// Longest accepted reply line, terminator included. Replies echo the
    /// requested path, so this must exceed the server's `max_command_length`.
    pub max_response_length: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("."),
            buffer_size: 512,
            max_response_length: 1024,
        }
    }
}

impl ClientConfig {
    /// Load configuration from a TOML file with `TINYFTP_*` environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config: ClientConfig = build(path, "TINYFTP")?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.buffer_size == 0 {
            return Err(ConfigError::Message(
                "buffer_size must be greater than 0".into(),
            ));
        }

        if self.max_response_length < 8 {
            return Err(ConfigError::Message(
                "max_response_length must be at least 8".into(),
            ));
        }

        Ok(())
    }
}

fn build(path: Option<&Path>, env_prefix: &str) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_NAME).required(false),
    };

    Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix(env_prefix).try_parsing(true))
        .build()
}
