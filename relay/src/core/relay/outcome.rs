//! Termination states and per-session counters.

use std::fmt;

/// Why a relay session ended.
///
/// Exactly one outcome is fixed per session, at the moment the first terminal
/// condition is detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    /// The call leg hung up or stopped producing frames
    CallEnded,
    /// Reading from the transport failed or timed out
    TransportReadFailed,
    /// The remote end sent a close message
    TransportClosed,
    /// Writing audio back into the call leg failed
    DeliveryFailed,
    /// The caller pressed the hang-up digit
    UserHangupDigit,
    /// Consecutive forward failures reached the configured limit
    ForwardFailureLimit,
}

impl RelayOutcome {
    /// Only a caller-initiated hang-up counts as success.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, RelayOutcome::UserHangupDigit)
    }

    /// Integer status surfaced to the host: `0` on success, `-1` otherwise.
    #[inline]
    pub fn exit_status(&self) -> i32 {
        if self.is_success() { 0 } else { -1 }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelayOutcome::CallEnded => "call_ended",
            RelayOutcome::TransportReadFailed => "transport_read_failed",
            RelayOutcome::TransportClosed => "transport_closed",
            RelayOutcome::DeliveryFailed => "delivery_failed",
            RelayOutcome::UserHangupDigit => "user_hangup_digit",
            RelayOutcome::ForwardFailureLimit => "forward_failure_limit",
        }
    }
}

impl fmt::Display for RelayOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected over one relay session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Frames obtained from the call leg
    pub frames_read: u64,
    /// Frames handed back to the call leg
    pub frames_released: u64,
    /// Audio frames successfully sent to the transport
    pub audio_forwarded: u64,
    /// Audio frames that could not be sent (logged, not fatal)
    pub forward_failures: u64,
    /// Messages received from the transport
    pub messages_received: u64,
    /// Binary payloads written back into the call leg
    pub audio_delivered: u64,
    pub text_ignored: u64,
    pub control_ignored: u64,
    /// Non-audio, non-DTMF frames passed over
    pub other_frames: u64,
}

impl RelayStats {
    /// Fold counters collected by another task into this set.
    pub fn merge(&mut self, other: &RelayStats) {
        self.frames_read += other.frames_read;
        self.frames_released += other.frames_released;
        self.audio_forwarded += other.audio_forwarded;
        self.forward_failures += other.forward_failures;
        self.messages_received += other.messages_received;
        self.audio_delivered += other.audio_delivered;
        self.text_ignored += other.text_ignored;
        self.control_ignored += other.control_ignored;
        self.other_frames += other.other_frames;
    }
}

/// Final result of a relay session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayReport {
    pub outcome: RelayOutcome,
    pub stats: RelayStats,
}

impl RelayReport {
    #[inline]
    pub fn exit_status(&self) -> i32 {
        self.outcome.exit_status()
    }
}
