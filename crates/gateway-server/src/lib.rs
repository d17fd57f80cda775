//! Lease gateway server.
//!
//! Exposes a provider's runtime state over HTTP and WebSocket:
//! - plain JSON request/response endpoints for provider, lease, and
//!   service status plus manifest submission;
//! - a live log streaming endpoint that multiplexes every running
//!   instance of a service into one WebSocket connection.
//!
//! The server is decoupled from the cluster backend via the [`Provider`]
//! trait; log sources satisfy the [`LogSource`] contract and are owned by
//! the streaming session that acquired them.

pub mod cluster;
pub mod fanin;
pub mod params;
pub mod router;
pub mod streamer;

pub use cluster::{BoxedLogSource, LogSource, LogSourceDyn, Provider, ProviderError, SourceCloser};
pub use params::{LogQuery, ParamRejection};
pub use router::{GatewayConfig, GatewayServer};
pub use streamer::KeepaliveConfig;
