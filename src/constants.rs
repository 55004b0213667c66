/// Shared constants for the notification core
///
/// Keepalive and retention values mirror the server-side contract:
/// the server expects a ping frame every 30 seconds and the UI keeps
/// a toast visible for 5 seconds.
use std::time::Duration;

/// Path of the OCS event endpoint on the configured host
pub const WS_ENDPOINT_PATH: &str = "/ws/ocs/";

/// Interval between keepalive ping frames while the channel is open
pub const KEEPALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// The only outbound frame this core ever sends
pub const PING_FRAME: &str = "{\"type\":\"ping\"}";

/// How long a notification stays live before automatic removal
pub const NOTIFICATION_TTL: Duration = Duration::from_millis(5000);

/// Maximum number of live notifications retained at once
pub const MAX_LIVE_NOTIFICATIONS: usize = 10;

/// Maximum number of raw payload bytes echoed into decode-failure logs
pub const FRAME_SAMPLE_LEN: usize = 120;
