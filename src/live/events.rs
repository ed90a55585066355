use serde::{Deserialize, Serialize};

/// Close codes sent when a connection is dropped before joining.
pub mod close_code {
    pub const DECODE_ERROR: u16 = 4002;
    pub const JOIN_TIMED_OUT: u16 = 4009;
}

/// Shared chart configuration of a session. Both fields are opaque bitfields
/// owned by the front end; the relay never looks inside them.
///
/// Serializes as the join acknowledgement and deserializes from an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub conf: i64,
    pub area: i64,
}

/// First message of every connection.
#[derive(Debug, Deserialize)]
pub struct JoinRequest {
    pub sid: String,
    pub conf: i64,
    pub area: i64,
}

impl JoinRequest {
    pub fn proposed_state(&self) -> SessionState {
        SessionState {
            conf: self.conf,
            area: self.area,
        }
    }
}

/// Fan-out frame delivered to every member after an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionBroadcast {
    pub conf: i64,
    pub area: i64,
    pub num_clients: usize,
}
