//! Transport session abstractions.
//!
//! - `base`: the [`TransportSession`] trait, messages and errors
//! - `websocket`: tokio-tungstenite client implementation
//! - `connector`: per-call transport factories

pub mod base;
pub mod connector;
pub mod websocket;

pub use base::{
    Opcode, TransportError, TransportMessage, TransportResult, TransportSession, TransportSettings,
};
pub use connector::{BoxedTransport, TransportConnector, WebSocketConnector};
pub use websocket::WebSocketTransport;
