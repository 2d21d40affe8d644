//! Parsing helpers shared by the environment and YAML loaders.

use std::env;
use std::str::FromStr;

use crate::core::leg::parse_digit;
use crate::core::relay::RelayMode;

/// Read an environment variable, treating unset and blank values alike.
pub(super) fn env_string(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Read and parse an environment variable.
///
/// Returns `Ok(None)` when the variable is unset or blank.
pub(super) fn env_parse<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_string(name) {
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: '{raw}' ({e})")),
        None => Ok(None),
    }
}

pub(super) fn parse_hangup_digit(raw: &str) -> Result<char, String> {
    parse_digit(raw).ok_or_else(|| {
        format!("Invalid hang-up digit '{raw}': expected one of 0-9, *, #, A-D")
    })
}

pub(super) fn parse_mode(raw: &str) -> Result<RelayMode, String> {
    RelayMode::parse(raw)
        .ok_or_else(|| format!("Invalid relay mode '{raw}': expected lock-step or pipelined"))
}
