//! Classification of call leg frames and transport messages.
//!
//! Pure decision functions; the relay loops act on the returned actions.

use crate::core::leg::{FrameKind, MediaFrame};
use crate::core::transport::{Opcode, TransportMessage};

use super::outcome::RelayOutcome;

/// What to do with a frame read from the call leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameAction {
    /// Forward the payload as a binary message, then drain the transport
    Forward,
    /// The caller pressed the hang-up digit
    Hangup,
    /// Neither forwarded nor re-delivered
    Pass,
}

/// What to do with a message received from the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageAction {
    /// Write the payload into the call leg as audio
    Deliver,
    /// End the session with the given outcome
    Terminate(RelayOutcome),
    /// Text is accepted but not interpreted
    IgnoreText,
    /// Ping, pong and raw fragments
    IgnoreControl,
}

/// Classify a call leg frame against the configured hang-up digit.
pub fn classify_frame(frame: &MediaFrame, hangup_digit: char) -> FrameAction {
    match frame.kind {
        FrameKind::Audio => FrameAction::Forward,
        FrameKind::Dtmf(digit) if digit == hangup_digit => FrameAction::Hangup,
        FrameKind::Dtmf(_) | FrameKind::Other => FrameAction::Pass,
    }
}

/// Classify a transport message by opcode.
pub fn classify_message(message: &TransportMessage) -> MessageAction {
    match message.opcode {
        Opcode::Close => MessageAction::Terminate(RelayOutcome::TransportClosed),
        Opcode::Binary => MessageAction::Deliver,
        Opcode::Text => MessageAction::IgnoreText,
        Opcode::Ping | Opcode::Pong | Opcode::Continuation => MessageAction::IgnoreControl,
    }
}
