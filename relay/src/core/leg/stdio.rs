//! Byte-stream call leg.
//!
//! Treats any `AsyncRead` as a source of fixed-size raw audio frames and any
//! `AsyncWrite` as the sink for delivered audio. The CLI uses it over
//! stdin/stdout so a relay can be driven by a pipe of signed-linear samples.

use async_trait::async_trait;
use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, warn};

use super::base::{CallLeg, CallLegResult, MediaFrame, Readiness};

/// 20 ms of 8 kHz 16-bit mono signed-linear audio.
pub const DEFAULT_FRAME_BYTES: usize = 320;

/// Call leg over a pair of byte streams.
pub struct StdioCallLeg<R, W> {
    reader: R,
    writer: W,
    frame_bytes: usize,
    buffer: BytesMut,
    eof: bool,
}

impl<R, W> StdioCallLeg<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Create a leg that cuts the input into `frame_bytes`-sized frames.
    ///
    /// A zero frame size is treated as [`DEFAULT_FRAME_BYTES`].
    pub fn new(reader: R, writer: W, frame_bytes: usize) -> Self {
        let frame_bytes = if frame_bytes == 0 {
            DEFAULT_FRAME_BYTES
        } else {
            frame_bytes
        };
        Self {
            reader,
            writer,
            frame_bytes,
            buffer: BytesMut::with_capacity(frame_bytes * 2),
            eof: false,
        }
    }

    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Consume the leg and return the writer, e.g. to inspect delivered audio.
    pub fn into_writer(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<R, W> CallLeg for StdioCallLeg<R, W>
where
    R: AsyncRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn wait_ready(&mut self) -> Readiness {
        // read_buf is cancel safe: bytes already read stay in `buffer`
        while self.buffer.len() < self.frame_bytes && !self.eof {
            match self.reader.read_buf(&mut self.buffer).await {
                Ok(0) => {
                    debug!("Audio input reached end of stream");
                    self.eof = true;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("Audio input read error: {}", e);
                    self.eof = true;
                }
            }
        }

        if self.buffer.is_empty() {
            Readiness::Ended
        } else {
            Readiness::Ready
        }
    }

    async fn read_frame(&mut self) -> Option<MediaFrame> {
        if self.wait_ready().await == Readiness::Ended {
            return None;
        }
        // A short trailing chunk at end of input is still delivered
        let take = self.buffer.len().min(self.frame_bytes);
        Some(MediaFrame::audio(self.buffer.split_to(take).freeze()))
    }

    async fn write_frame(&mut self, frame: MediaFrame) -> CallLegResult<()> {
        if !frame.is_audio() {
            return Ok(());
        }
        self.writer.write_all(&frame.payload).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
