//! WebSocket log streaming session.
//!
//! One session per upgraded connection: acquires log sources from the
//! provider, fans their lines into the socket as JSON text frames,
//! keeps the connection alive with pings, and tears everything down
//! without leaking a task or a source, whichever side ends the stream.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::ws::{CloseFrame, Message, WebSocket, close_code};
use futures_util::stream::SplitStream;
use futures_util::{SinkExt, StreamExt};
use gateway_protocol::{LeaseId, close_code as app_close};
use tokio::sync::oneshot;
use tokio::time::timeout;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::cluster::Provider;
use crate::fanin::FanIn;
use crate::params::LogQuery;

/// Keepalive timings for a streaming session.
#[derive(Debug, Clone, Copy)]
pub struct KeepaliveConfig {
    /// Ping interval. Must be shorter than `pong_wait`.
    pub ping_period: Duration,
    /// How long the peer may stay silent before the connection is
    /// considered dead.
    pub pong_wait: Duration,
}

impl Default for KeepaliveConfig {
    fn default() -> Self {
        Self {
            ping_period: Duration::from_secs(10),
            pong_wait: Duration::from_secs(15),
        }
    }
}

/// Run one log streaming session to completion.
///
/// Owns the socket. Returns once every task it spawned has finished
/// and every acquired source is closed.
pub async fn stream_service_logs<P: Provider>(
    mut socket: WebSocket,
    provider: Arc<P>,
    lease: LeaseId,
    service: String,
    query: LogQuery,
    keepalive: KeepaliveConfig,
) {
    let session = Uuid::new_v4();
    debug!(%session, %lease, service, follow = query.follow, tail = ?query.tail, "log stream opened");

    let sources = match provider
        .service_logs(&lease, &service, query.follow, query.tail)
        .await
    {
        Ok(sources) => sources,
        Err(e) => {
            warn!(%session, "couldn't fetch logs: {e}");
            send_close(&mut socket, app_close::LOGS_FETCH_FAILED, &e.to_string()).await;
            return;
        }
    };

    if sources.is_empty() {
        send_close(
            &mut socket,
            app_close::NO_RUNNING_SERVICE,
            &format!("service {service} has no running instances"),
        )
        .await;
        return;
    }

    let (mut sink, stream) = socket.split();

    let (watchdog_done, mut peer_gone) = oneshot::channel();
    let watchdog = tokio::spawn(watch_inbound(stream, keepalive.pong_wait, watchdog_done));

    let mut fanin = FanIn::spawn(sources).await;

    let mut ping = tokio::time::interval_at(
        tokio::time::Instant::now() + keepalive.ping_period,
        keepalive.ping_period,
    );

    // Sole writer to the socket. Ends on any write failure, when every
    // source is exhausted, or when the watchdog gives up on the peer.
    loop {
        tokio::select! {
            line = fanin.recv() => {
                let Some(line) = line else { break };
                let frame = match serde_json::to_string(&line) {
                    Ok(json) => json,
                    Err(e) => {
                        warn!(%session, "couldn't encode log line: {e}");
                        break;
                    }
                };
                if sink.send(Message::Text(frame.into())).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if sink.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
            _ = &mut peer_gone => break,
        }
    }

    // Sources first: producers must be stopped before the socket is
    // closed under the watchdog.
    fanin.shutdown().await;

    let _ = sink
        .send(Message::Close(Some(CloseFrame {
            code: close_code::NORMAL,
            reason: "".into(),
        })))
        .await;
    let _ = sink.close().await;

    // Bounded by the watchdog's own read deadline.
    let _ = watchdog.await;

    debug!(%session, "log stream closed");
}

/// Sole reader of the socket.
///
/// The log-viewing peer is not expected to send payload; everything
/// received is discarded, but receipt alone proves liveness and resets
/// the deadline. Exits on peer close, read error, or a silent window
/// longer than `pong_wait`. Dropping `done` is the exit signal the
/// write loop selects on.
async fn watch_inbound(
    mut stream: SplitStream<WebSocket>,
    pong_wait: Duration,
    done: oneshot::Sender<()>,
) {
    loop {
        match timeout(pong_wait, stream.next()).await {
            Ok(Some(Ok(Message::Close(_)))) | Ok(None) => break,
            Ok(Some(Ok(_))) => {}
            Ok(Some(Err(_))) => break,
            Err(_) => {
                debug!("peer silent past pong deadline");
                break;
            }
        }
    }
    drop(done);
}

async fn send_close(socket: &mut WebSocket, code: u16, reason: &str) {
    let frame = CloseFrame {
        code,
        reason: reason.to_string().into(),
    };
    if let Err(e) = socket.send(Message::Close(Some(frame))).await {
        debug!("couldn't push close frame through websocket: {e}");
    }
}
