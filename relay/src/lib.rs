pub mod config;
pub mod core;
pub mod errors;
pub mod host;
pub mod utils;

// Re-export commonly used items for convenience
pub use config::RelayConfig;
pub use crate::core::*;
pub use errors::app_error::{AppError, AppResult};
pub use host::{ApplicationRegistry, AudioWsApp, HostApplication};
