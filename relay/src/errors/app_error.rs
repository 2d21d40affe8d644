use thiserror::Error;

use crate::core::transport::TransportError;
use crate::utils::UrlValidationError;

/// Errors raised while bringing a relay session up or registering the
/// application. Failures inside a running session are reported as
/// [`crate::core::relay::RelayOutcome`] values instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing argument: {0}")]
    MissingArgument(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] UrlValidationError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Application '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("Application '{0}' is not registered")]
    NotRegistered(String),

    #[error("Application '{0}' is stopped")]
    Stopped(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<Box<dyn std::error::Error>> for AppError {
    fn from(err: Box<dyn std::error::Error>) -> Self {
        AppError::Config(err.to_string())
    }
}
