//! Gateway client over HTTP and WebSocket.

use gateway_protocol::paths;
use gateway_protocol::{LeaseId, LeaseStatus, ProviderStatus, ServiceStatus, SubmitManifestRequest};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio_tungstenite::connect_async;
use tracing::debug;

use crate::error::ClientError;
use crate::stream::LogStream;

/// Client for a lease gateway.
///
/// Cheap to clone; the underlying HTTP connection pool is shared. The
/// `host` argument of every call is the gateway's base URI, e.g.
/// `http://provider.example.com:8443`.
#[derive(Debug, Clone, Default)]
pub struct Client {
    http: reqwest::Client,
}

impl Client {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level provider status.
    pub async fn status(&self, host: &str) -> Result<ProviderStatus, ClientError> {
        self.get_json(host, &paths::status_path()).await
    }

    /// Status of every service under a lease.
    pub async fn lease_status(&self, host: &str, id: &LeaseId) -> Result<LeaseStatus, ClientError> {
        self.get_json(host, &paths::lease_status_path(id)).await
    }

    /// Status of one named service under a lease.
    pub async fn service_status(
        &self,
        host: &str,
        id: &LeaseId,
        service: &str,
    ) -> Result<ServiceStatus, ClientError> {
        self.get_json(host, &paths::service_status_path(id, service))
            .await
    }

    /// Submit a deployment manifest to the provider.
    pub async fn submit_manifest(
        &self,
        host: &str,
        req: &SubmitManifestRequest,
    ) -> Result<(), ClientError> {
        let uri = make_uri(host, &paths::submit_manifest_path(&req.deployment))?;
        let resp = self.http.put(uri).json(req).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::ServerResponse(resp.status()));
        }
        Ok(())
    }

    /// Open the live log stream for one service under a lease.
    ///
    /// `follow` is always sent explicitly; `tail_lines` only when given.
    /// Returns as soon as the WebSocket handshake completes — lines are
    /// then pulled lazily from the returned [`LogStream`].
    pub async fn service_logs(
        &self,
        host: &str,
        id: &LeaseId,
        service: &str,
        follow: bool,
        tail_lines: Option<u32>,
    ) -> Result<LogStream, ClientError> {
        let mut uri = websocket_uri(host, &paths::service_logs_path(id, service))?;
        uri.query_pairs_mut()
            .append_pair("follow", if follow { "true" } else { "false" });
        if let Some(tail) = tail_lines {
            uri.query_pairs_mut().append_pair("tail", &tail.to_string());
        }

        debug!(%uri, "dialing log stream");
        let (socket, _) = connect_async(uri.as_str()).await?;

        Ok(LogStream::spawn(socket))
    }

    async fn get_json<T: DeserializeOwned>(&self, host: &str, path: &str) -> Result<T, ClientError> {
        let uri = make_uri(host, path)?;
        let resp = self.http.get(uri).send().await?;
        if !resp.status().is_success() {
            return Err(ClientError::ServerResponse(resp.status()));
        }
        Ok(resp.json().await?)
    }
}

fn make_uri(host: &str, path: &str) -> Result<Url, ClientError> {
    format!("{}/{path}", host.trim_end_matches('/'))
        .parse()
        .map_err(|e| ClientError::InvalidEndpoint(format!("{host}: {e}")))
}

/// Map the endpoint onto the matching WebSocket scheme: `http`/`ws` dial
/// plain, `https`/`wss` dial TLS, anything else is unusable.
fn websocket_uri(host: &str, path: &str) -> Result<Url, ClientError> {
    let mut uri = make_uri(host, path)?;
    let scheme = match uri.scheme() {
        "ws" | "http" => "ws",
        "wss" | "https" => "wss",
        other => {
            return Err(ClientError::InvalidEndpoint(format!(
                "unsupported scheme \"{other}\""
            )));
        }
    };
    uri.set_scheme(scheme)
        .map_err(|_| ClientError::InvalidEndpoint(host.to_string()))?;
    Ok(uri)
}
