//! HTTP routes and server lifecycle.
//!
//! Binds the status, manifest, and log streaming endpoints to a
//! [`Provider`] and manages the listener: bind (port 0 for
//! OS-assigned), serve, graceful shutdown.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::rejection::JsonRejection;
use axum::extract::{State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, put};
use gateway_protocol::SubmitManifestRequest;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::cluster::Provider;
use crate::params::{DeploymentPath, LeasePath, LogQuery, ServiceTarget};
use crate::streamer::{KeepaliveConfig, stream_service_logs};

/// Gateway server configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Port to listen on (0 for OS-assigned)
    pub port: u16,
    /// Hostname to bind to
    pub hostname: String,
    /// Enable CORS
    pub enable_cors: bool,
    /// Keepalive timings for log streaming sessions
    pub keepalive: KeepaliveConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 8443,
            hostname: "127.0.0.1".into(),
            enable_cors: false,
            keepalive: KeepaliveConfig::default(),
        }
    }
}

/// Shared state for the route handlers.
struct AppState<P> {
    provider: Arc<P>,
    keepalive: KeepaliveConfig,
}

/// The gateway server — routes status, manifest, and log streaming
/// requests to the backing provider.
pub struct GatewayServer {
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<tokio::task::JoinHandle<()>>,
    port: u16,
}

impl GatewayServer {
    /// Start the gateway with the given provider.
    pub async fn start<P: Provider>(
        config: GatewayConfig,
        provider: P,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        Self::start_shared(config, Arc::new(provider)).await
    }

    /// Start the gateway with a provider shared with other subsystems.
    pub async fn start_shared<P: Provider>(
        config: GatewayConfig,
        provider: Arc<P>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let (shutdown_tx, mut shutdown_rx) = mpsc::channel(1);

        let state = Arc::new(AppState {
            provider,
            keepalive: config.keepalive,
        });

        let mut app = Router::new()
            .route("/status", get(status_handler::<P>))
            .route(
                "/deployment/{owner}/{dseq}/manifest",
                put(manifest_handler::<P>),
            )
            .route(
                "/lease/{owner}/{dseq}/{gseq}/{oseq}/{provider}/status",
                get(lease_status_handler::<P>),
            )
            .route(
                "/lease/{owner}/{dseq}/{gseq}/{oseq}/{provider}/service/{serviceName}/status",
                get(service_status_handler::<P>),
            )
            .route(
                "/lease/{owner}/{dseq}/{gseq}/{oseq}/{provider}/service/{serviceName}/logs",
                get(service_logs_handler::<P>),
            )
            .with_state(state)
            .layer(TraceLayer::new_for_http());

        if config.enable_cors {
            app = app.layer(CorsLayer::permissive());
        }

        let addr: SocketAddr = format!("{}:{}", config.hostname, config.port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        let actual_port = listener.local_addr()?.port();

        info!(
            "gateway listening on http://{}:{}",
            config.hostname, actual_port
        );

        let handle = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.recv().await;
                })
                .await
                .ok();
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
            port: actual_port,
        })
    }

    /// Get the actual bound port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Gracefully stop the server.
    pub async fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(()).await;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        info!("gateway server stopped");
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTTP Handlers
// ─────────────────────────────────────────────────────────────────────────────

async fn status_handler<P: Provider>(State(state): State<Arc<AppState<P>>>) -> Response {
    match state.provider.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn lease_status_handler<P: Provider>(
    State(state): State<Arc<AppState<P>>>,
    LeasePath(lease): LeasePath,
) -> Response {
    match state.provider.lease_status(&lease).await {
        Ok(status) => Json(status).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn service_status_handler<P: Provider>(
    State(state): State<Arc<AppState<P>>>,
    target: ServiceTarget,
) -> Response {
    match state
        .provider
        .service_status(&target.lease, &target.service)
        .await
    {
        Ok(status) => Json(status).into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn manifest_handler<P: Provider>(
    State(state): State<Arc<AppState<P>>>,
    DeploymentPath(deployment): DeploymentPath,
    body: Result<Json<SubmitManifestRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(e) => return (StatusCode::UNPROCESSABLE_ENTITY, e.to_string()).into_response(),
    };
    if req.deployment != deployment {
        return (StatusCode::BAD_REQUEST, "deployment id mismatch").into_response();
    }
    match state.provider.submit_manifest(req).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

async fn service_logs_handler<P: Provider>(
    State(state): State<Arc<AppState<P>>>,
    target: ServiceTarget,
    query: LogQuery,
    ws: WebSocketUpgrade,
) -> Response {
    let provider = state.provider.clone();
    let keepalive = state.keepalive;
    // The handler answers with the upgrade response immediately; the
    // session runs detached for the lifetime of the connection.
    ws.on_upgrade(move |socket| {
        stream_service_logs(
            socket,
            provider,
            target.lease,
            target.service,
            query,
            keepalive,
        )
    })
    .into_response()
}
