//! Client for the lease gateway.
//!
//! Plain HTTP for the status and manifest endpoints, WebSocket for live
//! log streaming. [`Client::service_logs`] returns a [`LogStream`] that
//! yields typed log lines until the server closes the connection; the
//! terminal close code and reason are surfaced through
//! [`LogStream::close_reason`].

mod client;
mod error;
mod stream;

pub use client::Client;
pub use error::ClientError;
pub use stream::{LogStream, StreamEnd};
