//! Status and manifest bodies for the plain request/response endpoints.
//!
//! These are served as `application/json` with no streaming involved. The
//! shapes are the gateway's contract; how the values are computed belongs
//! to the backing provider.

use serde::{Deserialize, Serialize};

use crate::ids::DeploymentId;

/// Top-level provider status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderStatus {
    /// Provider account address.
    pub address: String,
    /// Number of leases currently being served.
    pub active_leases: u32,
}

/// Status of one service under a lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStatus {
    pub name: String,
    /// Instances currently available.
    pub available: i32,
    /// Instances requested by the deployment.
    pub total: i32,
    /// Externally reachable URIs, if the service is exposed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uris: Vec<String>,
}

/// Status of every service under a lease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseStatus {
    pub services: Vec<ServiceStatus>,
}

/// Body of a manifest submission.
///
/// The deployment identifier must match the one in the request path. The
/// manifest payload itself is opaque to the gateway and handed to the
/// provider as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitManifestRequest {
    pub deployment: DeploymentId,
    pub manifest: serde_json::Value,
}
