//! Contracts for the cluster backend the gateway fronts.
//!
//! The gateway never talks to workloads directly. A [`Provider`]
//! implementation answers status queries, accepts manifests, and hands out
//! [`LogSource`]s for log streaming. How any of that is obtained (pod
//! logs, journald, a test fixture) is invisible here.

use std::pin::Pin;
use std::sync::Arc;

use gateway_protocol::{
    LeaseId, LeaseStatus, ProviderStatus, ServiceStatus, SubmitManifestRequest,
};
use thiserror::Error;

/// Backend failure surfaced to gateway callers.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("lease {0} not found")]
    LeaseNotFound(LeaseId),
    #[error("manifest rejected: {0}")]
    ManifestRejected(String),
    #[error("{0}")]
    Internal(String),
}

/// The cluster backend behind the gateway.
///
/// Status methods follow a plain call-and-encode pattern. `service_logs`
/// returns zero or more live sources; zero means the service has nothing
/// currently running, which is not an error.
pub trait Provider: Send + Sync + 'static {
    fn status(&self) -> impl std::future::Future<Output = Result<ProviderStatus, ProviderError>> + Send;

    fn lease_status(
        &self,
        id: &LeaseId,
    ) -> impl std::future::Future<Output = Result<LeaseStatus, ProviderError>> + Send;

    fn service_status(
        &self,
        id: &LeaseId,
        service: &str,
    ) -> impl std::future::Future<Output = Result<ServiceStatus, ProviderError>> + Send;

    fn submit_manifest(
        &self,
        req: SubmitManifestRequest,
    ) -> impl std::future::Future<Output = Result<(), ProviderError>> + Send;

    /// Acquire log sources for every running instance of `service`.
    ///
    /// With `follow` the sources keep producing until closed; otherwise
    /// they end at the current tail. `tail_lines` limits how far back each
    /// source starts.
    fn service_logs(
        &self,
        id: &LeaseId,
        service: &str,
        follow: bool,
        tail_lines: Option<u32>,
    ) -> impl std::future::Future<Output = Result<Vec<BoxedLogSource>, ProviderError>> + Send;
}

/// Cloneable handle that terminates a log source's line stream early.
///
/// Implementations must tolerate being invoked from a task other than the
/// one consuming the source, and more than once.
#[derive(Clone)]
pub struct SourceCloser(Arc<dyn Fn() + Send + Sync>);

impl SourceCloser {
    pub fn new(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn close(&self) {
        (self.0)()
    }
}

impl std::fmt::Debug for SourceCloser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SourceCloser")
    }
}

/// One named, lazy, possibly-infinite sequence of log lines.
///
/// A source is owned by exactly one streaming session, which consumes it
/// from a single task and closes it exactly once during teardown. After
/// `closer().close()` has been invoked, pending and subsequent
/// `next_line` calls must resolve to `None` promptly.
pub trait LogSource: Send + 'static {
    /// Service/instance name attached to every line from this source.
    fn name(&self) -> &str;

    /// Pull the next line; `None` once exhausted or closed.
    fn next_line(&mut self) -> impl std::future::Future<Output = Option<String>> + Send;

    /// Detached close handle for this source.
    fn closer(&self) -> SourceCloser;

    fn boxed(self) -> BoxedLogSource
    where
        Self: Sized,
    {
        Box::new(self)
    }
}

/// Object-safe wrapper for [`LogSource`], so a session can hold sources of
/// different concrete types.
pub trait LogSourceDyn: Send {
    fn name_dyn(&self) -> &str;
    fn next_line_dyn(&mut self)
        -> Pin<Box<dyn std::future::Future<Output = Option<String>> + Send + '_>>;
    fn closer_dyn(&self) -> SourceCloser;
}

impl<T: LogSource> LogSourceDyn for T {
    fn name_dyn(&self) -> &str {
        self.name()
    }

    fn next_line_dyn(
        &mut self,
    ) -> Pin<Box<dyn std::future::Future<Output = Option<String>> + Send + '_>> {
        Box::pin(self.next_line())
    }

    fn closer_dyn(&self) -> SourceCloser {
        self.closer()
    }
}

pub type BoxedLogSource = Box<dyn LogSourceDyn>;
