//! WebSocket log stream reader.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use gateway_protocol::ServiceLogLine;
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::debug;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long the server may stay silent before the stream is declared
/// dead. The server pings well inside this window, so any frame at all
/// resets the clock.
const READ_WAIT: Duration = Duration::from_secs(15);

/// Terminal state of a [`LogStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The server sent a close frame; `code` distinguishes normal
    /// closure from the application close conditions.
    Closed { code: u16, reason: String },
    /// The transport failed, or the server went silent past the read
    /// deadline.
    Dropped,
}

/// Lazy, single-pass sequence of log lines from one streaming session.
///
/// Lines from the same source name arrive in the order the service
/// produced them. The sequence ends when the server closes the
/// connection or the transport dies; [`close_reason`](Self::close_reason)
/// tells the two apart once [`recv`](Self::recv) has returned `None`.
pub struct LogStream {
    rx: mpsc::Receiver<ServiceLogLine>,
    end: Arc<Mutex<Option<StreamEnd>>>,
}

impl LogStream {
    pub(crate) fn spawn(socket: Socket) -> Self {
        let (tx, rx) = mpsc::channel(1);
        let end = Arc::new(Mutex::new(None));
        tokio::spawn(read_frames(socket, tx, end.clone()));
        Self { rx, end }
    }

    /// Next log line; `None` once the session has ended.
    pub async fn recv(&mut self) -> Option<ServiceLogLine> {
        self.rx.recv().await
    }

    /// Why the stream ended. `None` while lines may still arrive.
    pub fn close_reason(&self) -> Option<StreamEnd> {
        self.end.lock().clone()
    }
}

/// Sole task touching the socket: answers pings, decodes text frames
/// into log lines, ignores everything else. Exits on a peer close, a
/// read or write error, an undecodable payload, or a silent window
/// longer than [`READ_WAIT`]; the outward channel closing behind it is
/// the end-of-sequence signal.
async fn read_frames(
    mut socket: Socket,
    tx: mpsc::Sender<ServiceLogLine>,
    end: Arc<Mutex<Option<StreamEnd>>>,
) {
    let outcome = loop {
        let frame = match timeout(READ_WAIT, socket.next()).await {
            Ok(Some(Ok(frame))) => frame,
            Ok(Some(Err(e))) => {
                debug!("log stream read failed: {e}");
                break StreamEnd::Dropped;
            }
            Ok(None) => break StreamEnd::Dropped,
            Err(_) => {
                debug!("server silent past read deadline");
                break StreamEnd::Dropped;
            }
        };

        match frame {
            Message::Ping(payload) => {
                if socket.send(Message::Pong(payload)).await.is_err() {
                    break StreamEnd::Dropped;
                }
            }
            Message::Text(text) => {
                let line: ServiceLogLine = match serde_json::from_str(text.as_str()) {
                    Ok(line) => line,
                    Err(e) => {
                        debug!("undecodable log frame: {e}");
                        break StreamEnd::Dropped;
                    }
                };
                if tx.send(line).await.is_err() {
                    // Consumer dropped the stream.
                    break StreamEnd::Dropped;
                }
            }
            Message::Close(frame) => {
                break match frame {
                    Some(f) => StreamEnd::Closed {
                        code: f.code.into(),
                        reason: f.reason.to_string(),
                    },
                    None => StreamEnd::Closed {
                        code: 1000,
                        reason: String::new(),
                    },
                };
            }
            _ => {}
        }
    };

    // The reason must be readable before the consumer can observe the
    // channel closing.
    *end.lock() = Some(outcome);
    let _ = socket.close(None).await;
}
