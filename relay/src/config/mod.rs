//! Configuration module for the AudioWS relay
//!
//! This module handles relay configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use audiows_relay::config::RelayConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = RelayConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = RelayConfig::from_file(&config_path)?;
//!
//! println!("Registered as {}", config.app_name);
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use env::ENV_VARS;

use crate::core::relay::{RelayMode, RelaySettings};
use crate::core::transport::TransportSettings;

/// Name the application registers under when none is configured
pub const DEFAULT_APP_NAME: &str = "AudioWS";

/// WebSocket subprotocol requested when none is configured
pub const DEFAULT_SUBPROTOCOL: &str = "echo";

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;

/// Relay configuration
///
/// Contains everything needed to register the application and run relay
/// sessions:
/// - Registration name
/// - Default WebSocket target and handshake settings
/// - Relay loop behavior (hang-up digit, mode, timeouts, limits)
/// - Frame size for byte-stream call legs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub app_name: String,
    /// Default target used when the invocation does not name one
    pub url: Option<String>,
    /// `None` sends no subprotocol header
    pub subprotocol: Option<String>,
    pub hangup_digit: char,
    pub mode: RelayMode,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: Option<u64>,
    pub max_forward_failures: Option<u32>,
    pub channel_capacity: usize,
    pub frame_bytes: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            app_name: DEFAULT_APP_NAME.to_string(),
            url: None,
            subprotocol: Some(DEFAULT_SUBPROTOCOL.to_string()),
            hangup_digit: crate::core::leg::DEFAULT_HANGUP_DIGIT,
            mode: RelayMode::default(),
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            read_timeout_ms: None,
            max_forward_failures: None,
            channel_capacity: crate::core::relay::DEFAULT_CHANNEL_CAPACITY,
            frame_bytes: crate::core::leg::DEFAULT_FRAME_BYTES,
        }
    }
}

impl RelayConfig {
    /// Load configuration from environment variables and defaults
    ///
    /// # Errors
    /// Returns an error if a variable has an invalid format or validation
    /// fails.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // Note: .env file is loaded in main.rs at application startup
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;

        validation::validate_config(&config)?;

        Ok(config)
    }

    /// Settings for the relay loop
    pub fn relay_settings(&self) -> RelaySettings {
        RelaySettings {
            hangup_digit: self.hangup_digit,
            mode: self.mode,
            read_timeout: self.read_timeout_ms.map(Duration::from_millis),
            max_forward_failures: self.max_forward_failures,
            channel_capacity: self.channel_capacity,
        }
    }

    /// Handshake settings for a session against `url`
    pub fn transport_settings(&self, url: impl Into<String>) -> TransportSettings {
        TransportSettings {
            url: url.into(),
            subprotocol: self.subprotocol.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
        }
    }
}
