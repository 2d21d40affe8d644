//! Host adapter: named applications invoked once per call.
//!
//! - `lifecycle`: application states and the [`HostApplication`] trait
//! - `audiows`: the WebSocket audio relay application
//! - `registry`: name to application lookup

pub mod audiows;
pub mod lifecycle;
pub mod registry;

pub use audiows::{AudioWsApp, URL_VARIABLE, parse_url_argument};
pub use lifecycle::{AppEntry, AppState, HostApplication};
pub use registry::{ApplicationRegistry, SharedApplication};
