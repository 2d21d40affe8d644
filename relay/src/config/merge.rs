//! Merging YAML and environment configuration.

use super::env::EnvConfig;
use super::utils::{parse_hangup_digit, parse_mode};
use super::yaml::YamlConfig;
use super::{
    DEFAULT_APP_NAME, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_SUBPROTOCOL, RelayConfig,
};
use crate::core::leg::{DEFAULT_FRAME_BYTES, DEFAULT_HANGUP_DIGIT};
use crate::core::relay::DEFAULT_CHANNEL_CAPACITY;

/// Build the final configuration: YAML values win, then environment, then
/// defaults.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<RelayConfig, Box<dyn std::error::Error>> {
    let env = EnvConfig::load()?;
    let yaml = yaml.unwrap_or_default();
    let relay = yaml.relay.unwrap_or_default();
    let audio = yaml.audio.unwrap_or_default();

    let hangup_digit = match relay.hangup_digit.as_deref() {
        Some(raw) => Some(parse_hangup_digit(raw)?),
        None => env.hangup_digit,
    };

    let mode = match relay.mode.as_deref() {
        Some(raw) => Some(parse_mode(raw)?),
        None => env.mode,
    };

    // Absent means the default protocol; present but empty means none.
    let subprotocol = match relay.subprotocol.or(env.subprotocol) {
        Some(value) if value.trim().is_empty() => None,
        Some(value) => Some(value.trim().to_string()),
        None => Some(DEFAULT_SUBPROTOCOL.to_string()),
    };

    Ok(RelayConfig {
        app_name: relay
            .app_name
            .or(env.app_name)
            .unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
        url: relay.url.or(env.url),
        subprotocol,
        hangup_digit: hangup_digit.unwrap_or(DEFAULT_HANGUP_DIGIT),
        mode: mode.unwrap_or_default(),
        connect_timeout_ms: relay
            .connect_timeout_ms
            .or(env.connect_timeout_ms)
            .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
        read_timeout_ms: relay.read_timeout_ms.or(env.read_timeout_ms),
        max_forward_failures: relay.max_forward_failures.or(env.max_forward_failures),
        channel_capacity: relay
            .channel_capacity
            .or(env.channel_capacity)
            .unwrap_or(DEFAULT_CHANNEL_CAPACITY),
        frame_bytes: audio
            .frame_bytes
            .or(env.frame_bytes)
            .unwrap_or(DEFAULT_FRAME_BYTES),
    })
}

#[cfg(test)]
mod tests {
    use super::super::env::ENV_VARS;
    use super::super::yaml::RelayYaml;
    use super::*;
    use crate::core::relay::RelayMode;
    use serial_test::serial;
    use std::env;

    fn cleanup_env_vars() {
        unsafe {
            for name in ENV_VARS {
                env::remove_var(name);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        cleanup_env_vars();

        let config = merge_config(None).unwrap();
        assert_eq!(config.app_name, "AudioWS");
        assert_eq!(config.url, None);
        assert_eq!(config.subprotocol, Some("echo".to_string()));
        assert_eq!(config.hangup_digit, '#');
        assert_eq!(config.mode, RelayMode::LockStep);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.read_timeout_ms, None);
        assert_eq!(config.max_forward_failures, None);
        assert_eq!(config.channel_capacity, 64);
        assert_eq!(config.frame_bytes, 320);
    }

    #[test]
    #[serial]
    fn test_yaml_overrides_env() {
        cleanup_env_vars();

        unsafe {
            env::set_var("AUDIOWS_WS_URL", "ws://env.example.com");
            env::set_var("AUDIOWS_MODE", "pipelined");
            env::set_var("AUDIOWS_READ_TIMEOUT_MS", "900");
        }

        let yaml = YamlConfig {
            relay: Some(RelayYaml {
                url: Some("ws://yaml.example.com".to_string()),
                ..Default::default()
            }),
            audio: None,
        };

        let config = merge_config(Some(yaml)).unwrap();
        // YAML value
        assert_eq!(config.url, Some("ws://yaml.example.com".to_string()));
        // ENV values where YAML is silent
        assert_eq!(config.mode, RelayMode::Pipelined);
        assert_eq!(config.read_timeout_ms, Some(900));

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_empty_subprotocol_disables_header() {
        cleanup_env_vars();

        let yaml = YamlConfig {
            relay: Some(RelayYaml {
                subprotocol: Some(String::new()),
                ..Default::default()
            }),
            audio: None,
        };

        let config = merge_config(Some(yaml)).unwrap();
        assert_eq!(config.subprotocol, None);
    }

    #[test]
    #[serial]
    fn test_invalid_yaml_mode() {
        cleanup_env_vars();

        let yaml = YamlConfig {
            relay: Some(RelayYaml {
                mode: Some("sideways".to_string()),
                ..Default::default()
            }),
            audio: None,
        };

        let result = merge_config(Some(yaml));
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("sideways"));
    }
}
