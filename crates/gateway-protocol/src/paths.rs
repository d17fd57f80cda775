//! URL path builders shared by the gateway server and its clients.
//!
//! Paths are relative (no leading slash); callers join them onto a host
//! URI.

use crate::ids::{DeploymentId, LeaseId};

fn lease_path(id: &LeaseId) -> String {
    format!(
        "lease/{}/{}/{}/{}/{}",
        id.owner, id.dseq, id.gseq, id.oseq, id.provider
    )
}

/// Provider status endpoint.
pub fn status_path() -> String {
    "status".to_string()
}

/// Status of every service under a lease.
pub fn lease_status_path(id: &LeaseId) -> String {
    format!("{}/status", lease_path(id))
}

/// Status of one named service under a lease.
pub fn service_status_path(id: &LeaseId, service: &str) -> String {
    format!("{}/service/{}/status", lease_path(id), service)
}

/// Log stream endpoint for one named service under a lease.
pub fn service_logs_path(id: &LeaseId, service: &str) -> String {
    format!("{}/service/{}/logs", lease_path(id), service)
}

/// Manifest submission endpoint for a deployment.
pub fn submit_manifest_path(id: &DeploymentId) -> String {
    format!("deployment/{}/{}/manifest", id.owner, id.dseq)
}
