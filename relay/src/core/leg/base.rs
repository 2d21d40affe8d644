//! Base traits and types for call legs.
//!
//! A call leg is the live, audio-carrying side of a telephony session. The
//! relay reads media frames from it (audio, DTMF digits, everything else) and
//! writes audio back to it.
//!
//! # Frame Ownership
//!
//! Every frame handed out by [`CallLeg::read_frame`] is owned by the caller
//! until it is handed back through [`CallLeg::release_frame`]. Callers must
//! release each frame exactly once, on every exit path.

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while talking to a call leg.
#[derive(Debug, Error)]
pub enum CallLegError {
    /// The call leg has hung up or was torn down by the host
    #[error("Call leg closed")]
    Closed,

    /// Writing a frame to the call leg failed
    #[error("Write failed: {0}")]
    WriteFailed(String),

    /// Underlying I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for call leg operations.
pub type CallLegResult<T> = Result<T, CallLegError>;

// =============================================================================
// Media Frames
// =============================================================================

/// Classification of a media frame read from a call leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind {
    /// Decoded voice payload
    Audio,
    /// A DTMF digit event carrying the digit character
    Dtmf(char),
    /// Anything else the leg produces (control, text, video, null frames)
    Other,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Audio => write!(f, "audio"),
            FrameKind::Dtmf(digit) => write!(f, "dtmf({digit})"),
            FrameKind::Other => write!(f, "other"),
        }
    }
}

/// One discrete unit of call leg data.
///
/// The payload is only meaningful for [`FrameKind::Audio`]; other kinds carry
/// an empty payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFrame {
    pub kind: FrameKind,
    pub payload: Bytes,
}

impl MediaFrame {
    /// Create an audio frame from raw payload bytes.
    pub fn audio(payload: impl Into<Bytes>) -> Self {
        Self {
            kind: FrameKind::Audio,
            payload: payload.into(),
        }
    }

    /// Create a DTMF digit frame.
    pub fn dtmf(digit: char) -> Self {
        Self {
            kind: FrameKind::Dtmf(digit),
            payload: Bytes::new(),
        }
    }

    /// Create a frame of a kind the relay does not interpret.
    pub fn other() -> Self {
        Self {
            kind: FrameKind::Other,
            payload: Bytes::new(),
        }
    }

    #[inline]
    pub fn is_audio(&self) -> bool {
        matches!(self.kind, FrameKind::Audio)
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// Result of waiting on a call leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// A frame can be read without blocking
    Ready,
    /// The leg is gone; no more frames will arrive
    Ended,
}

// =============================================================================
// Base Trait
// =============================================================================

/// Frame-level access to one active, audio-capable call session.
///
/// # Cancel Safety
///
/// [`CallLeg::wait_ready`] may be raced against other futures in
/// `tokio::select!`, so implementations must not lose frames when the future
/// is dropped before completion.
#[async_trait]
pub trait CallLeg: Send {
    /// Wait indefinitely until a frame is available or the leg ends.
    async fn wait_ready(&mut self) -> Readiness;

    /// Read one frame. `None` signals end of session.
    async fn read_frame(&mut self) -> Option<MediaFrame>;

    /// Write one frame back into the call.
    async fn write_frame(&mut self, frame: MediaFrame) -> CallLegResult<()>;

    /// Hand a frame obtained from [`CallLeg::read_frame`] back to the leg.
    fn release_frame(&mut self, frame: MediaFrame) {
        drop(frame);
    }

    /// Export a variable into the call session.
    fn set_variable(&mut self, _name: &str, _value: &str) {}
}

#[async_trait]
impl<L: CallLeg + ?Sized> CallLeg for Box<L> {
    async fn wait_ready(&mut self) -> Readiness {
        (**self).wait_ready().await
    }

    async fn read_frame(&mut self) -> Option<MediaFrame> {
        (**self).read_frame().await
    }

    async fn write_frame(&mut self, frame: MediaFrame) -> CallLegResult<()> {
        (**self).write_frame(frame).await
    }

    fn release_frame(&mut self, frame: MediaFrame) {
        (**self).release_frame(frame)
    }

    fn set_variable(&mut self, name: &str, value: &str) {
        (**self).set_variable(name, value)
    }
}
