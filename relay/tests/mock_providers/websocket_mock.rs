//! WebSocket Mock Server
//!
//! Binds an ephemeral local port and speaks plain `ws://`. The handshake
//! accepts the first subprotocol the client offers, as a real media server
//! configured for that protocol would.

use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::SEC_WEBSOCKET_PROTOCOL;

/// How the server treats each connection
#[derive(Debug, Clone)]
pub enum ServerBehavior {
    /// Echo every binary message back
    Echo,
    /// Echo the first `n` binary messages, then send a close frame
    CloseAfter(usize),
    /// Send these binary payloads right after the handshake, then close
    Greet(Vec<Vec<u8>>),
    /// Answer each binary message with a text message followed by the echo
    TextThenEcho,
}

/// What the server observed
#[derive(Debug, Default)]
pub struct ServerRecord {
    pub connections: usize,
    /// Subprotocol header offered on each handshake
    pub protocols: Vec<Option<String>>,
    pub binary_received: Vec<Vec<u8>>,
    pub text_received: usize,
}

pub struct MockServer {
    pub addr: SocketAddr,
    pub record: Arc<Mutex<ServerRecord>>,
    handle: JoinHandle<()>,
}

impl MockServer {
    pub async fn start(behavior: ServerBehavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let record = Arc::new(Mutex::new(ServerRecord::default()));

        let server_record = record.clone();
        let handle = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let record = server_record.clone();
                let behavior = behavior.clone();
                tokio::spawn(async move {
                    let _ = handle_connection(stream, behavior, record).await;
                });
            }
        });

        Self {
            addr,
            record,
            handle,
        }
    }

    pub fn url(&self) -> String {
        format!("ws://{}/audio", self.addr)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle_connection(
    stream: TcpStream,
    behavior: ServerBehavior,
    record: Arc<Mutex<ServerRecord>>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handshake_record = record.clone();
    let callback = move |request: &Request, mut response: Response| -> Result<Response, ErrorResponse> {
        let offered = request
            .headers()
            .get(SEC_WEBSOCKET_PROTOCOL)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        if let Some(ref offered) = offered {
            let first = offered.split(',').next().unwrap_or_default().trim();
            if let Ok(value) = first.parse::<HeaderValue>() {
                response.headers_mut().insert(SEC_WEBSOCKET_PROTOCOL, value);
            }
        }

        let mut record = handshake_record.lock();
        record.connections += 1;
        record.protocols.push(offered);
        Ok(response)
    };

    let ws_stream = accept_hdr_async(stream, callback).await?;
    let (mut write, mut read) = ws_stream.split();

    if let ServerBehavior::Greet(payloads) = &behavior {
        for payload in payloads {
            write.send(Message::Binary(payload.clone().into())).await?;
        }
        write.send(Message::Close(None)).await?;
        while let Some(Ok(_)) = read.next().await {}
        return Ok(());
    }

    let mut echoed = 0usize;
    let mut closing = false;

    while let Some(message) = read.next().await {
        match message? {
            Message::Binary(data) => {
                record.lock().binary_received.push(data.to_vec());
                if closing {
                    continue;
                }
                if let ServerBehavior::TextThenEcho = behavior {
                    write.send(Message::Text(String::from("not audio").into())).await?;
                }
                write.send(Message::Binary(data)).await?;
                echoed += 1;

                if let ServerBehavior::CloseAfter(limit) = behavior {
                    if echoed >= limit {
                        write.send(Message::Close(None)).await?;
                        closing = true;
                    }
                }
            }
            Message::Text(_) => {
                record.lock().text_received += 1;
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    Ok(())
}
