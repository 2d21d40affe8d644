//! Validation of the merged configuration.

use super::RelayConfig;
use crate::utils::validate_ws_url;

/// Run every check against a merged configuration.
pub(super) fn validate_config(config: &RelayConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_app_name(&config.app_name)?;
    validate_url(config.url.as_deref())?;
    validate_sizes(config.channel_capacity, config.frame_bytes)?;
    validate_timeouts(config.connect_timeout_ms, config.read_timeout_ms)?;
    validate_forward_limit(config.max_forward_failures)?;
    Ok(())
}

pub(super) fn validate_app_name(app_name: &str) -> Result<(), String> {
    if app_name.trim().is_empty() {
        return Err("app_name must not be empty".to_string());
    }
    if app_name.contains(char::is_whitespace) {
        return Err(format!("app_name '{app_name}' must not contain whitespace"));
    }
    Ok(())
}

/// A default URL is optional; when present it must be a WebSocket URL.
pub(super) fn validate_url(url: Option<&str>) -> Result<(), String> {
    match url {
        Some(url) => validate_ws_url(url)
            .map(|_| ())
            .map_err(|e| format!("Invalid relay url '{url}': {e}")),
        None => Ok(()),
    }
}

pub(super) fn validate_sizes(channel_capacity: usize, frame_bytes: usize) -> Result<(), String> {
    if channel_capacity == 0 {
        return Err("channel_capacity must be greater than zero".to_string());
    }
    if frame_bytes == 0 {
        return Err("frame_bytes must be greater than zero".to_string());
    }
    Ok(())
}

pub(super) fn validate_timeouts(
    connect_timeout_ms: u64,
    read_timeout_ms: Option<u64>,
) -> Result<(), String> {
    if connect_timeout_ms == 0 {
        return Err("connect_timeout_ms must be greater than zero".to_string());
    }
    if read_timeout_ms == Some(0) {
        return Err("read_timeout_ms must be greater than zero when set".to_string());
    }
    Ok(())
}

pub(super) fn validate_forward_limit(max_forward_failures: Option<u32>) -> Result<(), String> {
    if max_forward_failures == Some(0) {
        return Err("max_forward_failures must be greater than zero when set".to_string());
    }
    Ok(())
}
