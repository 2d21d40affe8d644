//! The frame relay between one call leg and one transport session.
//!
//! [`FrameRelay::run`] owns both endpoints for the life of the session and
//! returns a [`RelayReport`] once a terminal condition occurs. The transport
//! is closed on every exit path.

pub mod classify;
mod lockstep;
pub mod outcome;
mod pipelined;
pub mod settings;

pub use classify::{FrameAction, MessageAction, classify_frame, classify_message};
pub use outcome::{RelayOutcome, RelayReport, RelayStats};
pub use settings::{DEFAULT_CHANNEL_CAPACITY, RelayMode, RelaySettings};

use std::time::Duration;

use bytes::Bytes;
use tracing::{Instrument, debug, info, trace, warn};
use uuid::Uuid;

use crate::core::leg::{CallLeg, MediaFrame};
use crate::core::transport::{TransportError, TransportMessage, TransportResult, TransportSession};

/// Relays audio between a call leg and a transport session until one of them
/// ends, delivery fails, or the caller presses the hang-up digit.
pub struct FrameRelay<L, T> {
    leg: L,
    transport: T,
    settings: RelaySettings,
    session_id: Uuid,
}

impl<L, T> FrameRelay<L, T>
where
    L: CallLeg,
    T: TransportSession + 'static,
{
    pub fn new(leg: L, transport: T, settings: RelaySettings) -> Self {
        Self {
            leg,
            transport,
            settings,
            session_id: Uuid::new_v4(),
        }
    }

    /// Identifier attached to every log line of this session
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Run the session to completion.
    pub async fn run(self) -> RelayReport {
        let span = tracing::info_span!(
            "relay",
            session_id = %self.session_id,
            mode = %self.settings.mode
        );
        self.run_session().instrument(span).await
    }

    async fn run_session(self) -> RelayReport {
        let FrameRelay {
            mut leg,
            mut transport,
            settings,
            ..
        } = self;
        let mut stats = RelayStats::default();

        info!(hangup_digit = %settings.hangup_digit, "Relay session started");

        let outcome = match settings.mode {
            RelayMode::LockStep => {
                let outcome = lockstep::run(&mut leg, &mut transport, &settings, &mut stats).await;
                close_transport(&mut transport).await;
                outcome
            }
            RelayMode::Pipelined => pipelined::run(&mut leg, transport, &settings, &mut stats).await,
        };

        if outcome.is_success() {
            info!(
                outcome = %outcome,
                frames_read = stats.frames_read,
                audio_forwarded = stats.audio_forwarded,
                audio_delivered = stats.audio_delivered,
                "Relay session finished"
            );
        } else {
            warn!(
                outcome = %outcome,
                frames_read = stats.frames_read,
                audio_forwarded = stats.audio_forwarded,
                audio_delivered = stats.audio_delivered,
                forward_failures = stats.forward_failures,
                "Relay session failed"
            );
        }

        RelayReport { outcome, stats }
    }
}

// =============================================================================
// Shared steps
// =============================================================================

/// Counts consecutive forward failures against an optional limit.
#[derive(Debug)]
pub(crate) struct ForwardTracker {
    limit: Option<u32>,
    consecutive: u32,
}

impl ForwardTracker {
    pub(crate) fn new(limit: Option<u32>) -> Self {
        Self {
            limit,
            consecutive: 0,
        }
    }

    pub(crate) fn record_success(&mut self) {
        self.consecutive = 0;
    }

    /// Returns `true` once the limit has been reached.
    pub(crate) fn record_failure(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.limit.is_some_and(|limit| self.consecutive >= limit)
    }
}

/// Send one audio payload as a binary message.
///
/// A failed send is logged and counted but does not end the session unless
/// the consecutive failure limit is reached.
pub(crate) async fn forward_audio<T: TransportSession>(
    transport: &mut T,
    payload: Bytes,
    tracker: &mut ForwardTracker,
    stats: &mut RelayStats,
) -> Option<RelayOutcome> {
    let len = payload.len();
    match transport.send(TransportMessage::binary(payload)).await {
        Ok(()) => {
            stats.audio_forwarded += 1;
            tracker.record_success();
            trace!(len, "Forwarded audio frame");
            None
        }
        Err(e) => {
            stats.forward_failures += 1;
            warn!("Could not write audio frame to transport: {}", e);
            if tracker.record_failure() {
                warn!(
                    failures = stats.forward_failures,
                    "Too many consecutive forward failures"
                );
                Some(RelayOutcome::ForwardFailureLimit)
            } else {
                None
            }
        }
    }
}

/// Write one transport payload into the call leg as an audio frame.
pub(crate) async fn deliver_audio<L: CallLeg>(
    leg: &mut L,
    payload: Bytes,
    stats: &mut RelayStats,
) -> Option<RelayOutcome> {
    match leg.write_frame(MediaFrame::audio(payload)).await {
        Ok(()) => {
            stats.audio_delivered += 1;
            None
        }
        Err(e) => {
            warn!("Could not write audio to call leg: {}", e);
            Some(RelayOutcome::DeliveryFailed)
        }
    }
}

/// Act on one transport message in lock-step mode.
pub(crate) async fn handle_message<L: CallLeg>(
    leg: &mut L,
    message: TransportMessage,
    stats: &mut RelayStats,
) -> Option<RelayOutcome> {
    stats.messages_received += 1;
    match classify_message(&message) {
        MessageAction::Deliver => {
            debug!(len = message.payload_len(), "Binary message from transport");
            deliver_audio(leg, message.payload, stats).await
        }
        MessageAction::Terminate(outcome) => {
            warn!("Transport closed by remote end");
            Some(outcome)
        }
        MessageAction::IgnoreText => {
            stats.text_ignored += 1;
            debug!(len = message.payload_len(), "Ignoring text message");
            None
        }
        MessageAction::IgnoreControl => {
            stats.control_ignored += 1;
            trace!(opcode = %message.opcode, "Ignoring control message");
            None
        }
    }
}

/// Read one message, bounded by `limit` when set.
pub(crate) async fn receive_with_timeout<T: TransportSession>(
    transport: &mut T,
    limit: Option<Duration>,
) -> TransportResult<TransportMessage> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, transport.receive())
            .await
            .unwrap_or_else(|_| {
                Err(TransportError::Timeout(format!(
                    "no message within {}ms",
                    limit.as_millis()
                )))
            }),
        None => transport.receive().await,
    }
}

pub(crate) async fn close_transport<T: TransportSession>(transport: &mut T) {
    if let Err(e) = transport.close().await {
        debug!("Transport close failed: {}", e);
    }
}
