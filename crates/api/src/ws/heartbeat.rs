use std::time::Duration;

use tokio::time::{interval_at, Instant, Interval, MissedTickBehavior};

/// Interval between heartbeat pings sent to each viewer.
pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// Ticker for one connection's pings. The first tick fires one full
/// interval after the connection opens.
pub(crate) fn heartbeat_ticker(period: Duration) -> Interval {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}
