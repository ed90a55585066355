use std::time::Duration;

pub const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(45);
pub const HEARTBEAT_TIMEOUT: Duration = Duration::from_secs(90);

/// Liveness settings for joined `/live` connections.
///
/// The server pings every `interval` and drops a member that has sent no
/// frame (pongs included) for `timeout`. A single socket write that takes
/// longer than `timeout` drops the member too.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Heartbeat {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for Heartbeat {
    fn default() -> Self {
        Self {
            interval: HEARTBEAT_INTERVAL,
            timeout: HEARTBEAT_TIMEOUT,
        }
    }
}
