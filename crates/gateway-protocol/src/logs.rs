//! Log streaming wire format.

use serde::{Deserialize, Serialize};

/// One line of service output, attributed to the instance it came from.
///
/// Serialized as a single WebSocket text frame:
/// `{"name": "...", "message": "..."}`. Lines from the same `name` arrive
/// in the order the instance produced them; no ordering is promised across
/// distinct names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceLogLine {
    pub name: String,
    pub message: String,
}

/// Application close codes, in the range the WebSocket RFC reserves for
/// private use (4000-4999) so they cannot collide with protocol-level
/// codes.
pub mod close_code {
    /// The backing provider failed to produce log sources for the lease.
    pub const LOGS_FETCH_FAILED: u16 = 4000;

    /// The service exists but has no running instances to stream from.
    pub const NO_RUNNING_SERVICE: u16 = 4001;
}
