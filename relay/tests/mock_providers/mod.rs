//! Mock endpoints for relay tests
//!
//! - `scripted_leg`: call leg replaying a fixed list of frames
//! - `scripted_transport`: transport replaying a fixed list of receive results
//! - `websocket_mock`: real WebSocket server for end-to-end runs
//!
//! Both scripted endpoints record what the relay did to them in a shared
//! record that stays readable after the relay has consumed the endpoint.

// Not every test binary uses every helper
#![allow(dead_code, unused_imports)]

pub mod scripted_leg;
pub mod scripted_transport;
pub mod websocket_mock;

use bytes::Bytes;

pub use scripted_leg::{LegRecord, LegStep, ScriptedCallLeg};
pub use scripted_transport::{ReceiveStep, ScriptedConnector, ScriptedTransport, TransportRecord};
pub use websocket_mock::{MockServer, ServerBehavior};

/// A recognizable audio payload: `len` bytes of `fill`
pub fn audio(fill: u8, len: usize) -> Bytes {
    Bytes::from(vec![fill; len])
}
