pub mod leg;
pub mod relay;
pub mod transport;

// Re-export commonly used types for convenience
pub use leg::{
    CallLeg, CallLegError, CallLegResult, ChannelCallLeg, FrameKind, MediaFrame, Readiness,
    StdioCallLeg,
};

pub use transport::{
    BoxedTransport, Opcode, TransportConnector, TransportError, TransportMessage, TransportResult,
    TransportSession, TransportSettings, WebSocketConnector, WebSocketTransport,
};

pub use relay::{FrameRelay, RelayMode, RelayOutcome, RelayReport, RelaySettings, RelayStats};
