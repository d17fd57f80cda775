//! Client error surface.

use thiserror::Error;

/// Failure talking to a gateway.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The gateway answered with a non-2xx status.
    #[error("server response: {0}")]
    ServerResponse(reqwest::StatusCode),

    /// The endpoint could not be parsed, or its scheme is unusable.
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    /// The WebSocket dial or handshake failed.
    #[error("connect: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    /// The HTTP request could not be performed.
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
}
