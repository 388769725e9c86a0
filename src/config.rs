//! Configuration management for the log-vision service

use crate::error::{Result, VisionError};
use crate::reader::MAX_CHUNK_SIZE;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/vision/config.yaml";

/// Location used by older JSON deployments, tried when the default is absent
pub const LEGACY_CONFIG_PATH: &str = "/etc/vision/config.json";

/// Smallest chunk size accepted from a configuration file (512 bytes)
pub const MIN_CONFIG_CHUNK_SIZE: usize = 512;

/// Configuration for the service
///
/// Loaded once at startup and shared read-only afterwards. JSON is valid
/// YAML, so configuration written as JSON with `Port` / `Aliases` /
/// `AliasName` / `AliasTo` keys loads as well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisionConfig {
    /// Port to listen on (default: 8080)
    #[serde(default = "default_port", alias = "Port")]
    pub port: u16,

    /// Address to bind to (default: 0.0.0.0)
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Short names standing in for full resource paths
    #[serde(default, alias = "Aliases")]
    pub aliases: Vec<AliasConfig>,

    /// Bytes per backward read in tail mode (default: 64KB)
    /// Valid range: 512 bytes to 16MB
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Largest `limit` a caller may ask for (default: unbounded)
    #[serde(default)]
    pub max_limit: Option<u64>,

    /// Seconds a single read may take before it is abandoned (default: 30)
    #[serde(default = "default_read_timeout")]
    pub read_timeout_secs: u64,
}

/// One alias entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AliasConfig {
    #[serde(alias = "AliasName")]
    pub name: String,

    #[serde(alias = "AliasTo")]
    pub target: String,
}

impl AliasConfig {
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        AliasConfig {
            name: name.into(),
            target: target.into(),
        }
    }
}

// Default value functions for serde
fn default_port() -> u16 {
    8080
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_chunk_size() -> usize {
    64 * 1024 // 64KB
}

fn default_read_timeout() -> u64 {
    30
}

impl Default for VisionConfig {
    fn default() -> Self {
        VisionConfig {
            port: default_port(),
            bind_address: default_bind_address(),
            aliases: Vec::new(),
            chunk_size: default_chunk_size(),
            max_limit: None,
            read_timeout_secs: default_read_timeout(),
        }
    }
}

/// Config file to load when none is given on the command line
pub fn default_config_path() -> PathBuf {
    locate_config(Path::new(DEFAULT_CONFIG_PATH), Path::new(LEGACY_CONFIG_PATH))
}

/// `primary`, unless it is missing and `legacy` exists
fn locate_config(primary: &Path, legacy: &Path) -> PathBuf {
    if !primary.exists() && legacy.is_file() {
        legacy.to_path_buf()
    } else {
        primary.to_path_buf()
    }
}

impl VisionConfig {
    /// Load configuration from a YAML (or JSON) file
    ///
    /// # Returns
    /// * `Ok(VisionConfig)` if loading and validation succeed
    /// * `Err(VisionError::ConfigError)` if the file cannot be read or is invalid
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            VisionError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_yaml_str(&content)
    }

    /// Parse and validate configuration text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: VisionConfig = serde_yaml::from_str(content).map_err(|e| {
            VisionError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// # Validation Rules
    /// - bind_address must be an IP address
    /// - chunk_size must be between 512 bytes and 16MB
    /// - read_timeout_secs must be > 0
    /// - max_limit, when set, must be > 0
    /// - alias names and targets must be non-empty, names unique
    pub fn validate(&self) -> Result<()> {
        if self.bind_address.parse::<IpAddr>().is_err() {
            return Err(VisionError::ConfigError(format!(
                "bind_address must be an IP address, got '{}'",
                self.bind_address
            )));
        }

        if self.chunk_size < MIN_CONFIG_CHUNK_SIZE || self.chunk_size > MAX_CHUNK_SIZE {
            return Err(VisionError::ConfigError(format!(
                "chunk_size must be between {} bytes and {}MB, got {} bytes",
                MIN_CONFIG_CHUNK_SIZE,
                MAX_CHUNK_SIZE / (1024 * 1024),
                self.chunk_size
            )));
        }

        if self.read_timeout_secs == 0 {
            return Err(VisionError::ConfigError(
                "read_timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.max_limit == Some(0) {
            return Err(VisionError::ConfigError(
                "max_limit must be greater than 0 when set".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for alias in &self.aliases {
            if alias.name.is_empty() {
                return Err(VisionError::ConfigError(
                    "alias name must not be empty".to_string(),
                ));
            }
            if alias.target.is_empty() {
                return Err(VisionError::ConfigError(format!(
                    "alias '{}' must have a non-empty target",
                    alias.name
                )));
            }
            if !seen.insert(alias.name.as_str()) {
                return Err(VisionError::ConfigError(format!(
                    "alias '{}' is defined more than once",
                    alias.name
                )));
            }
        }

        Ok(())
    }

    /// Socket address built from `bind_address` and `port`
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind_address.parse().map_err(|_| {
            VisionError::ConfigError(format!("Invalid bind_address '{}'", self.bind_address))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}
