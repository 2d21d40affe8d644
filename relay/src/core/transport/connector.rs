//! Transport factories.
//!
//! The host adapter opens one transport per call through a
//! [`TransportConnector`], so a different transport can be substituted without
//! touching the relay.

use async_trait::async_trait;

use super::base::{TransportResult, TransportSession, TransportSettings};
use super::websocket::WebSocketTransport;

/// Boxed transport session returned by connectors
pub type BoxedTransport = Box<dyn TransportSession>;

#[async_trait]
pub trait TransportConnector: Send + Sync {
    /// Open a session using `settings`.
    async fn connect(&self, settings: &TransportSettings) -> TransportResult<BoxedTransport>;
}

/// Opens [`WebSocketTransport`] sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl TransportConnector for WebSocketConnector {
    async fn connect(&self, settings: &TransportSettings) -> TransportResult<BoxedTransport> {
        let transport = WebSocketTransport::connect(settings).await?;
        Ok(Box::new(transport))
    }
}
