//! Pipelined relay.
//!
//! The transport is moved into its own task which forwards uplink audio and
//! reads the transport concurrently. The call leg loop stays on the calling
//! task. The two talk over bounded channels:
//!
//! ```text
//!  call leg loop --(uplink: audio payloads)--> transport task --> remote
//!  call leg loop <--(downlink: audio | terminal)-- transport task <-- remote
//! ```
//!
//! Transport audio is delivered as soon as it arrives instead of waiting for
//! the next call leg frame. Outbound frames that find the uplink full are
//! dropped and counted as forward failures; blocking there could deadlock
//! against a full downlink. Consecutive drops count toward the same forward
//! failure limit as failed sends.
//!
//! Teardown depends on which side fixed the outcome. When the call leg ends
//! the session, audio it already queued is still forwarded before the
//! transport is closed. When the transport side ends it, the task stops at
//! once, abandoning any pending send, and queued audio is counted as failed.

use bytes::Bytes;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, trace, warn};

use crate::core::leg::{CallLeg, Readiness};
use crate::core::transport::TransportSession;

use super::classify::{FrameAction, MessageAction, classify_frame, classify_message};
use super::outcome::{RelayOutcome, RelayStats};
use super::settings::RelaySettings;
use super::{ForwardTracker, close_transport, deliver_audio, forward_audio};

/// Events sent from the transport task to the call leg loop.
#[derive(Debug)]
enum Downlink {
    Audio(Bytes),
    Terminal(RelayOutcome),
}

/// Run both halves until a terminal condition occurs, then stop the transport
/// task and close the transport.
pub(super) async fn run<L, T>(
    leg: &mut L,
    transport: T,
    settings: &RelaySettings,
    stats: &mut RelayStats,
) -> RelayOutcome
where
    L: CallLeg,
    T: TransportSession + 'static,
{
    let capacity = settings.channel_capacity.max(1);
    let (uplink_tx, uplink_rx) = mpsc::channel::<Bytes>(capacity);
    let (downlink_tx, mut downlink_rx) = mpsc::channel::<Downlink>(capacity);
    let (stop_tx, stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(
        transport_task(transport, uplink_rx, downlink_tx, stop_rx, settings.clone())
            .in_current_span(),
    );

    let outcome = call_leg_loop(leg, &uplink_tx, &mut downlink_rx, settings, stats).await;

    // No frame is queued after this point. The task drains the closed uplink
    // unless told to stop.
    drop(uplink_tx);
    drop(downlink_rx);
    if drains_uplink(outcome) {
        debug!(outcome = %outcome, "Draining queued audio before close");
    } else {
        drop(stop_tx);
    }

    match task.await {
        Ok((mut transport, task_stats)) => {
            stats.merge(&task_stats);
            close_transport(&mut transport).await;
        }
        Err(e) => error!("Transport task failed: {}", e),
    }

    outcome
}

/// Outcomes fixed by the call leg side, after which audio already queued is
/// still worth sending.
fn drains_uplink(outcome: RelayOutcome) -> bool {
    matches!(
        outcome,
        RelayOutcome::UserHangupDigit | RelayOutcome::CallEnded | RelayOutcome::DeliveryFailed
    )
}

async fn call_leg_loop<L: CallLeg>(
    leg: &mut L,
    uplink: &mpsc::Sender<Bytes>,
    downlink: &mut mpsc::Receiver<Downlink>,
    settings: &RelaySettings,
    stats: &mut RelayStats,
) -> RelayOutcome {
    let mut drops = ForwardTracker::new(settings.max_forward_failures);

    loop {
        tokio::select! {
            biased;

            event = downlink.recv() => match event {
                Some(Downlink::Audio(payload)) => {
                    if let Some(outcome) = deliver_audio(leg, payload, stats).await {
                        return outcome;
                    }
                }
                Some(Downlink::Terminal(outcome)) => return outcome,
                None => {
                    error!("Transport task stopped without a terminal condition");
                    return RelayOutcome::TransportReadFailed;
                }
            },

            readiness = leg.wait_ready() => {
                if readiness == Readiness::Ended {
                    info!("Call leg ended");
                    return RelayOutcome::CallEnded;
                }
                let Some(frame) = leg.read_frame().await else {
                    info!("Call leg returned no frame");
                    return RelayOutcome::CallEnded;
                };
                stats.frames_read += 1;
                trace!(kind = %frame.kind, len = frame.payload_len(), "Frame from call leg");

                let outcome = match classify_frame(&frame, settings.hangup_digit) {
                    FrameAction::Forward => match uplink.try_send(frame.payload.clone()) {
                        Ok(()) => {
                            drops.record_success();
                            None
                        }
                        Err(e) => {
                            stats.forward_failures += 1;
                            match e {
                                TrySendError::Full(_) => warn!("Uplink queue full, dropping audio frame"),
                                TrySendError::Closed(_) => debug!("Uplink closed, dropping audio frame"),
                            }
                            if drops.record_failure() {
                                warn!(
                                    failures = stats.forward_failures,
                                    "Too many consecutive forward failures"
                                );
                                Some(RelayOutcome::ForwardFailureLimit)
                            } else {
                                None
                            }
                        }
                    },
                    FrameAction::Hangup => {
                        info!(digit = %settings.hangup_digit, "Hang-up digit received");
                        Some(RelayOutcome::UserHangupDigit)
                    }
                    FrameAction::Pass => {
                        stats.other_frames += 1;
                        None
                    }
                };

                leg.release_frame(frame);
                stats.frames_released += 1;

                if let Some(outcome) = outcome {
                    return outcome;
                }
            }
        }
    }
}

/// Owns the transport for the session and hands it back when stopped.
async fn transport_task<T: TransportSession>(
    mut transport: T,
    mut uplink: mpsc::Receiver<Bytes>,
    downlink: mpsc::Sender<Downlink>,
    mut stop: oneshot::Receiver<()>,
    settings: RelaySettings,
) -> (T, RelayStats) {
    let mut stats = RelayStats::default();
    let mut tracker = ForwardTracker::new(settings.max_forward_failures);
    let idle_limit = settings.read_timeout;
    let mut deadline = idle_limit.map(|limit| Instant::now() + limit);

    loop {
        let terminal = tokio::select! {
            biased;

            _ = &mut stop => break,

            payload = uplink.recv() => match payload {
                Some(payload) => tokio::select! {
                    biased;

                    _ = &mut stop => {
                        stats.forward_failures += 1;
                        debug!("Stopped during a pending send, audio frame abandoned");
                        break;
                    }
                    outcome = forward_audio(&mut transport, payload, &mut tracker, &mut stats) => outcome,
                },
                None => break,
            },

            result = transport.receive() => match result {
                Ok(message) => {
                    if let Some(limit) = idle_limit {
                        deadline = Some(Instant::now() + limit);
                    }
                    stats.messages_received += 1;

                    match classify_message(&message) {
                        MessageAction::Deliver => {
                            debug!(len = message.payload_len(), "Binary message from transport");
                            // The uplink may still be draining after the call
                            // leg loop has gone.
                            if downlink.send(Downlink::Audio(message.payload)).await.is_err() {
                                debug!("Call leg loop gone, dropping transport audio");
                            }
                            None
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
                Err(e) => {
                    warn!("Transport read error: {}", e);
                    Some(RelayOutcome::TransportReadFailed)
                }
            },

            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                warn!(
                    "No transport message within {}ms",
                    idle_limit.map(|d| d.as_millis()).unwrap_or_default()
                );
                Some(RelayOutcome::TransportReadFailed)
            }
        };

        if let Some(outcome) = terminal {
            let _ = downlink.send(Downlink::Terminal(outcome)).await;
            break;
        }
    }

    uplink.close();
    let mut discarded = 0u64;
    while uplink.try_recv().is_ok() {
        discarded += 1;
    }
    if discarded > 0 {
        stats.forward_failures += discarded;
        warn!(discarded, "Queued audio frames not forwarded");
    }

    (transport, stats)
}
