//! Channel-backed call leg.
//!
//! Lets an embedding host (or a test) drive the relay by pushing frames into
//! a tokio channel and collecting the audio the relay writes back.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::base::{CallLeg, CallLegError, CallLegResult, MediaFrame, Readiness};

/// Call leg fed from an mpsc receiver and delivering to an mpsc sender.
///
/// The leg ends when the inbound channel is closed and drained. Writes fail
/// with [`CallLegError::Closed`] once the outbound receiver is dropped.
pub struct ChannelCallLeg {
    inbound: mpsc::Receiver<MediaFrame>,
    outbound: mpsc::Sender<MediaFrame>,
    /// Frame pulled off the channel by `wait_ready`, handed out by `read_frame`
    pending: Option<MediaFrame>,
    variables: Vec<(String, String)>,
}

impl ChannelCallLeg {
    pub fn new(inbound: mpsc::Receiver<MediaFrame>, outbound: mpsc::Sender<MediaFrame>) -> Self {
        Self {
            inbound,
            outbound,
            pending: None,
            variables: Vec::new(),
        }
    }

    /// Create a leg together with the host-side ends of both channels.
    ///
    /// Returns `(leg, frames_in, frames_out)`: push frames into `frames_in`,
    /// read delivered audio from `frames_out`.
    pub fn pair(
        capacity: usize,
    ) -> (
        Self,
        mpsc::Sender<MediaFrame>,
        mpsc::Receiver<MediaFrame>,
    ) {
        let (in_tx, in_rx) = mpsc::channel(capacity);
        let (out_tx, out_rx) = mpsc::channel(capacity);
        (Self::new(in_rx, out_tx), in_tx, out_rx)
    }

    /// Look up a variable previously exported with `set_variable`.
    pub fn variable(&self, name: &str) -> Option<&str> {
        self.variables
            .iter()
            .rev()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[async_trait]
impl CallLeg for ChannelCallLeg {
    async fn wait_ready(&mut self) -> Readiness {
        if self.pending.is_some() {
            return Readiness::Ready;
        }
        // mpsc::Receiver::recv is cancel safe, and the frame is parked in
        // `pending` before this future can be dropped again.
        match self.inbound.recv().await {
            Some(frame) => {
                self.pending = Some(frame);
                Readiness::Ready
            }
            None => Readiness::Ended,
        }
    }

    async fn read_frame(&mut self) -> Option<MediaFrame> {
        match self.pending.take() {
            Some(frame) => Some(frame),
            None => self.inbound.recv().await,
        }
    }

    async fn write_frame(&mut self, frame: MediaFrame) -> CallLegResult<()> {
        self.outbound
            .send(frame)
            .await
            .map_err(|_| CallLegError::Closed)
    }

    fn set_variable(&mut self, name: &str, value: &str) {
        self.variables.push((name.to_string(), value.to_string()));
    }
}
