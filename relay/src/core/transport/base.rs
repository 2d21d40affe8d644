//! Base traits and types for message transports.
//!
//! A transport session wraps one established, duplex, message-oriented
//! connection. Connection establishment and wire framing belong to the
//! implementation; the relay only sees whole [`TransportMessage`]s.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur on a transport session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Connecting to the remote endpoint failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The target address could not be used
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Sending a message failed
    #[error("Send failed: {0}")]
    Send(String),

    /// Receiving a message failed
    #[error("Receive failed: {0}")]
    Receive(String),

    /// Operation timed out
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// The connection is no longer open
    #[error("Connection closed")]
    Closed,
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

// =============================================================================
// Messages
// =============================================================================

/// Opcode of a transport message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Binary,
    Text,
    Close,
    Ping,
    Pong,
    /// A raw continuation fragment of a larger message
    Continuation,
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Binary => write!(f, "binary"),
            Opcode::Text => write!(f, "text"),
            Opcode::Close => write!(f, "close"),
            Opcode::Ping => write!(f, "ping"),
            Opcode::Pong => write!(f, "pong"),
            Opcode::Continuation => write!(f, "continuation"),
        }
    }
}

/// One framed unit received from or sent to a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportMessage {
    pub opcode: Opcode,
    pub payload: Bytes,
    /// Whether this is only a fragment of a larger logical message
    pub is_fragment: bool,
}

impl TransportMessage {
    pub fn new(opcode: Opcode, payload: impl Into<Bytes>) -> Self {
        Self {
            opcode,
            payload: payload.into(),
            is_fragment: false,
        }
    }

    pub fn binary(payload: impl Into<Bytes>) -> Self {
        Self::new(Opcode::Binary, payload)
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(Opcode::Text, Bytes::from(text.into()))
    }

    pub fn close() -> Self {
        Self::new(Opcode::Close, Bytes::new())
    }

    pub fn ping(payload: impl Into<Bytes>) -> Self {
        Self::new(Opcode::Ping, payload)
    }

    pub fn pong(payload: impl Into<Bytes>) -> Self {
        Self::new(Opcode::Pong, payload)
    }

    /// Mark this message as a partial fragment.
    pub fn fragment(mut self) -> Self {
        self.is_fragment = true;
        self
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// Settings used to open a transport session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportSettings {
    /// Target address, e.g. `wss://media.example.com/stream`
    pub url: String,
    /// Subprotocol requested during the handshake
    pub subprotocol: Option<String>,
    /// Upper bound on connection establishment
    pub connect_timeout: Duration,
}

impl TransportSettings {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            subprotocol: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

// =============================================================================
// Base Trait
// =============================================================================

/// One established duplex message connection.
///
/// # Cancel Safety
///
/// [`TransportSession::receive`] may be raced against other futures in
/// `tokio::select!`; dropping the future must not lose a message.
#[async_trait]
pub trait TransportSession: Send {
    /// Send one message.
    async fn send(&mut self, message: TransportMessage) -> TransportResult<()>;

    /// Wait for the next message.
    async fn receive(&mut self) -> TransportResult<TransportMessage>;

    /// Close the session. Calling this more than once is harmless.
    async fn close(&mut self) -> TransportResult<()>;
}

#[async_trait]
impl<T: TransportSession + ?Sized> TransportSession for Box<T> {
    async fn send(&mut self, message: TransportMessage) -> TransportResult<()> {
        (**self).send(message).await
    }

    async fn receive(&mut self) -> TransportResult<TransportMessage> {
        (**self).receive().await
    }

    async fn close(&mut self) -> TransportResult<()> {
        (**self).close().await
    }
}
