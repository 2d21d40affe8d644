//! WebSocket URL validation
//!
//! Relay targets must be absolute `ws://` or `wss://` URLs with a host.
//! Credentials embedded in the URL are stripped before it is logged.

use thiserror::Error;
use url::Url;

/// Errors that can occur during URL validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlValidationError {
    #[error("URL is empty")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(#[from] url::ParseError),

    #[error("URL scheme must be ws or wss, got: {0}")]
    WebSocketSchemeRequired(String),

    #[error("URL must have a host")]
    MissingHost,
}

/// Validate a WebSocket target URL.
///
/// Surrounding whitespace is ignored. Returns the parsed URL on success.
pub fn validate_ws_url(raw: &str) -> Result<Url, UrlValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlValidationError::Empty);
    }

    let url = Url::parse(raw)?;

    match url.scheme() {
        "ws" | "wss" => {}
        other => return Err(UrlValidationError::WebSocketSchemeRequired(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(url),
        _ => Err(UrlValidationError::MissingHost),
    }
}

/// Whether the URL uses TLS
#[inline]
pub fn is_secure(url: &Url) -> bool {
    url.scheme() == "wss"
}

/// Render a URL for logs with any username and password removed.
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    if !redacted.username().is_empty() {
        let _ = redacted.set_username("");
    }
    if redacted.password().is_some() {
        let _ = redacted.set_password(None);
    }
    redacted.to_string()
}
