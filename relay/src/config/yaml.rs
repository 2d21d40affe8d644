use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// relay:
///   app_name: "AudioWS"
///   url: "wss://media.example.com/audio"
///   subprotocol: "echo"
///   hangup_digit: "#"
///   mode: "lock-step"
///   connect_timeout_ms: 10000
///   read_timeout_ms: 5000
///   max_forward_failures: 50
///   channel_capacity: 64
///
/// audio:
///   frame_bytes: 320
/// ```
///
/// `#` starts a YAML comment, so the hang-up digit must be quoted.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub relay: Option<RelayYaml>,
    pub audio: Option<AudioYaml>,
}

/// Relay settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RelayYaml {
    pub app_name: Option<String>,
    pub url: Option<String>,
    /// An empty string disables the subprotocol header
    pub subprotocol: Option<String>,
    pub hangup_digit: Option<String>,
    pub mode: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub max_forward_failures: Option<u32>,
    pub channel_capacity: Option<usize>,
}

/// Call leg audio settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AudioYaml {
    /// Bytes per frame read from a byte-stream call leg
    pub frame_bytes: Option<usize>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}
