//! Lock-step relay loop.
//!
//! One sequential loop per session. Each iteration waits on the call leg,
//! reads one frame, and for audio frames forwards the payload and then
//! performs exactly one transport read. A silent call leg therefore drains
//! nothing from the transport.

use tracing::{info, trace, warn};

use crate::core::leg::{CallLeg, MediaFrame, Readiness};
use crate::core::transport::TransportSession;

use super::classify::{FrameAction, classify_frame};
use super::outcome::{RelayOutcome, RelayStats};
use super::settings::RelaySettings;
use super::{ForwardTracker, forward_audio, handle_message, receive_with_timeout};

/// Run the loop until a terminal condition occurs.
///
/// Every frame read is released exactly once before this function returns or
/// moves on to the next iteration.
pub(super) async fn run<L, T>(
    leg: &mut L,
    transport: &mut T,
    settings: &RelaySettings,
    stats: &mut RelayStats,
) -> RelayOutcome
where
    L: CallLeg,
    T: TransportSession,
{
    let mut tracker = ForwardTracker::new(settings.max_forward_failures);

    loop {
        if leg.wait_ready().await == Readiness::Ended {
            info!("Call leg ended");
            return RelayOutcome::CallEnded;
        }

        let Some(frame) = leg.read_frame().await else {
            info!("Call leg returned no frame");
            return RelayOutcome::CallEnded;
        };
        stats.frames_read += 1;

        let outcome = process_frame(leg, transport, &frame, settings, &mut tracker, stats).await;

        leg.release_frame(frame);
        stats.frames_released += 1;

        if let Some(outcome) = outcome {
            return outcome;
        }
    }
}

/// Steps 2 to 4 of one iteration. Never consumes the frame.
async fn process_frame<L, T>(
    leg: &mut L,
    transport: &mut T,
    frame: &MediaFrame,
    settings: &RelaySettings,
    tracker: &mut ForwardTracker,
    stats: &mut RelayStats,
) -> Option<RelayOutcome>
where
    L: CallLeg,
    T: TransportSession,
{
    trace!(kind = %frame.kind, len = frame.payload_len(), "Frame from call leg");

    match classify_frame(frame, settings.hangup_digit) {
        FrameAction::Forward => {
            if let Some(outcome) =
                forward_audio(transport, frame.payload.clone(), tracker, stats).await
            {
                return Some(outcome);
            }

            match receive_with_timeout(transport, settings.read_timeout).await {
                Ok(message) => handle_message(leg, message, stats).await,
                Err(e) => {
                    warn!("Transport read error: {}", e);
                    Some(RelayOutcome::TransportReadFailed)
                }
            }
        }
        FrameAction::Hangup => {
            info!(digit = %settings.hangup_digit, "Hang-up digit received");
            Some(RelayOutcome::UserHangupDigit)
        }
        FrameAction::Pass => {
            stats.other_frames += 1;
            None
        }
    }
}
