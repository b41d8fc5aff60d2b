//! Guardian live broadcast infrastructure.
//!
//! - [`LiveHub`]: in-process fan-out of live events to per-viewer bounded
//!   buffers, keyed by device or the "all devices" group.
//! - [`LiveEvent`]: the envelope pushed to viewers.

pub mod event;
pub mod hub;

pub use event::{AlertData, LiveEvent, TelemetryData};
pub use hub::{LiveHub, LiveScope, RecvError, Subscription, SubscriptionId};
