//! Environment variable loading.
//!
//! `.env` is read into the process environment by `main` before any of this
//! runs, so real environment variables win over `.env` values.

use super::utils::{env_parse, env_string, parse_hangup_digit, parse_mode};
use crate::core::relay::RelayMode;

pub(super) const APP_NAME: &str = "AUDIOWS_APP_NAME";
/// Distinct from the `AUDIOWS_URL` call variable the application exports
pub(super) const URL: &str = "AUDIOWS_WS_URL";
pub(super) const SUBPROTOCOL: &str = "AUDIOWS_SUBPROTOCOL";
pub(super) const HANGUP_DIGIT: &str = "AUDIOWS_HANGUP_DIGIT";
pub(super) const MODE: &str = "AUDIOWS_MODE";
pub(super) const CONNECT_TIMEOUT_MS: &str = "AUDIOWS_CONNECT_TIMEOUT_MS";
pub(super) const READ_TIMEOUT_MS: &str = "AUDIOWS_READ_TIMEOUT_MS";
pub(super) const MAX_FORWARD_FAILURES: &str = "AUDIOWS_MAX_FORWARD_FAILURES";
pub(super) const CHANNEL_CAPACITY: &str = "AUDIOWS_CHANNEL_CAPACITY";
pub(super) const FRAME_BYTES: &str = "AUDIOWS_FRAME_BYTES";

/// Every variable the loader reads
pub const ENV_VARS: [&str; 10] = [
    APP_NAME,
    URL,
    SUBPROTOCOL,
    HANGUP_DIGIT,
    MODE,
    CONNECT_TIMEOUT_MS,
    READ_TIMEOUT_MS,
    MAX_FORWARD_FAILURES,
    CHANNEL_CAPACITY,
    FRAME_BYTES,
];

/// Values found in the environment. Unset variables are `None`.
#[derive(Debug, Clone, Default)]
pub(super) struct EnvConfig {
    pub app_name: Option<String>,
    pub url: Option<String>,
    pub subprotocol: Option<String>,
    pub hangup_digit: Option<char>,
    pub mode: Option<RelayMode>,
    pub connect_timeout_ms: Option<u64>,
    pub read_timeout_ms: Option<u64>,
    pub max_forward_failures: Option<u32>,
    pub channel_capacity: Option<usize>,
    pub frame_bytes: Option<usize>,
}

impl EnvConfig {
    pub(super) fn load() -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self {
            app_name: env_string(APP_NAME),
            url: env_string(URL),
            subprotocol: std::env::var(SUBPROTOCOL).ok().map(|s| s.trim().to_string()),
            hangup_digit: env_string(HANGUP_DIGIT)
                .map(|raw| parse_hangup_digit(&raw))
                .transpose()?,
            mode: env_string(MODE).map(|raw| parse_mode(&raw)).transpose()?,
            connect_timeout_ms: env_parse(CONNECT_TIMEOUT_MS)?,
            read_timeout_ms: env_parse(READ_TIMEOUT_MS)?,
            max_forward_failures: env_parse(MAX_FORWARD_FAILURES)?,
            channel_capacity: env_parse(CHANNEL_CAPACITY)?,
            frame_bytes: env_parse(FRAME_BYTES)?,
        })
    }
}
