pub mod url_validation;
pub use url_validation::{UrlValidationError, is_secure, redact_url, validate_ws_url};
