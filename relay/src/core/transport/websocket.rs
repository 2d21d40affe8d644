//! WebSocket transport implementation.
//!
//! Connects with tokio-tungstenite and exposes the connection as a
//! [`TransportSession`]. Handshake, framing, masking and ping replies are
//! handled by tungstenite; this module only maps messages.
//!
//! # Example
//!
//! ```rust,ignore
//! use audiows_relay::core::transport::{TransportSettings, WebSocketTransport};
//!
//! let mut settings = TransportSettings::new("wss://media.example.com/stream");
//! settings.subprotocol = Some("echo".to_string());
//! let transport = WebSocketTransport::connect(&settings).await?;
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use http::HeaderValue;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info};

use super::base::{
    Opcode, TransportError, TransportMessage, TransportResult, TransportSession, TransportSettings,
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket client session.
pub struct WebSocketTransport {
    stream: WsStream,
    url: String,
    closed: bool,
}

impl WebSocketTransport {
    /// Open a WebSocket connection using the given settings.
    ///
    /// # Errors
    /// - [`TransportError::InvalidUrl`] if the URL or subprotocol cannot form a request
    /// - [`TransportError::Timeout`] if the handshake exceeds `connect_timeout`
    /// - [`TransportError::ConnectionFailed`] for any other handshake failure
    pub async fn connect(settings: &TransportSettings) -> TransportResult<Self> {
        let mut request = settings
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| TransportError::InvalidUrl(e.to_string()))?;

        if let Some(ref protocol) = settings.subprotocol {
            let value = HeaderValue::from_str(protocol)
                .map_err(|e| TransportError::InvalidUrl(format!("bad subprotocol: {e}")))?;
            request
                .headers_mut()
                .insert(http::header::SEC_WEBSOCKET_PROTOCOL, value);
        }

        debug!("Connecting WebSocket server at {}", settings.url);

        let (stream, response) = tokio::time::timeout(
            settings.connect_timeout,
            tokio_tungstenite::connect_async(request),
        )
        .await
        .map_err(|_| {
            TransportError::Timeout(format!(
                "connect to {} exceeded {}ms",
                settings.url,
                settings.connect_timeout.as_millis()
            ))
        })?
        .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;

        info!(
            url = %settings.url,
            status = %response.status(),
            "Connected to WebSocket server"
        );

        Ok(Self {
            stream,
            url: settings.url.clone(),
            closed: false,
        })
    }
}

#[async_trait]
impl TransportSession for WebSocketTransport {
    async fn send(&mut self, message: TransportMessage) -> TransportResult<()> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let message = to_ws_message(message)?;
        self.stream
            .send(message)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))
    }

    async fn receive(&mut self) -> TransportResult<TransportMessage> {
        // StreamExt::next on a WebSocketStream is cancel safe
        match self.stream.next().await {
            Some(Ok(message)) => Ok(from_ws_message(message)),
            Some(Err(e)) => Err(TransportError::Receive(e.to_string())),
            None => Err(TransportError::Closed),
        }
    }

    async fn close(&mut self) -> TransportResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        match self.stream.close(None).await {
            Ok(()) => {
                debug!("WebSocket to {} closed", self.url);
                Ok(())
            }
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(TransportError::Send(e.to_string())),
        }
    }
}

/// Map a tungstenite message onto a transport message.
pub(crate) fn from_ws_message(message: Message) -> TransportMessage {
    match message {
        Message::Binary(data) => TransportMessage::binary(data),
        Message::Text(text) => {
            TransportMessage::new(Opcode::Text, Bytes::copy_from_slice(text.as_bytes()))
        }
        Message::Ping(data) => TransportMessage::ping(data),
        Message::Pong(data) => TransportMessage::pong(data),
        Message::Close(frame) => {
            let reason = frame
                .map(|f| Bytes::copy_from_slice(f.reason.as_bytes()))
                .unwrap_or_default();
            TransportMessage::new(Opcode::Close, reason)
        }
        Message::Frame(frame) => {
            TransportMessage::new(Opcode::Continuation, Bytes::copy_from_slice(frame.payload()))
                .fragment()
        }
    }
}

/// Map a transport message onto a tungstenite message.
pub(crate) fn to_ws_message(message: TransportMessage) -> TransportResult<Message> {
    match message.opcode {
        Opcode::Binary => Ok(Message::Binary(message.payload)),
        Opcode::Text => {
            let text = String::from_utf8(message.payload.to_vec())
                .map_err(|e| TransportError::Send(format!("text payload is not UTF-8: {e}")))?;
            Ok(Message::Text(text.into()))
        }
        Opcode::Close => Ok(Message::Close(None)),
        Opcode::Ping => Ok(Message::Ping(message.payload)),
        Opcode::Pong => Ok(Message::Pong(message.payload)),
        Opcode::Continuation => Err(TransportError::Send(
            "raw fragments cannot be sent".to_string(),
        )),
    }
}
