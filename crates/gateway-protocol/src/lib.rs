//! Lease gateway protocol types.
//!
//! Shared vocabulary for the gateway server and its clients: structured
//! identifiers parsed out of URL paths, the status bodies served by the
//! plain request/response endpoints, the log-line wire format carried over
//! WebSocket text frames, and the URL path builders both sides agree on.

pub mod ids;
pub mod logs;
pub mod paths;
pub mod status;

pub use ids::{DeploymentId, LeaseId, ParseIdError};
pub use logs::{close_code, ServiceLogLine};
pub use status::{LeaseStatus, ProviderStatus, ServiceStatus, SubmitManifestRequest};
