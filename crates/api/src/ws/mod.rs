//! Live telemetry and alert stream over WebSocket.
//!
//! Each connection subscribes to the [`LiveHub`](guardian_events::LiveHub)
//! for one device, or for every device when the path segment is `all`.

mod handler;
mod heartbeat;

pub use handler::ws_handler;
pub use heartbeat::HEARTBEAT_INTERVAL;
