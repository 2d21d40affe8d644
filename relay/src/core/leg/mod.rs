//! Call leg abstractions.
//!
//! - `base`: the [`CallLeg`] trait, media frames and errors
//! - `channel`: mpsc-driven leg for embedding hosts
//! - `stdio`: raw audio over byte streams (used by the CLI)
//! - `dtmf`: digit validation

pub mod base;
pub mod channel;
pub mod dtmf;
pub mod stdio;

pub use base::{CallLeg, CallLegError, CallLegResult, FrameKind, MediaFrame, Readiness};
pub use channel::ChannelCallLeg;
pub use dtmf::{DEFAULT_HANGUP_DIGIT, normalize_digit, parse_digit};
pub use stdio::{DEFAULT_FRAME_BYTES, StdioCallLeg};
