//! Multi-source log fan-in.
//!
//! Merges the line streams of an arbitrary number of log sources into
//! one channel consumed by a single writer. The number of producers is
//! only known at runtime, so the lifecycle is pinned down by three
//! explicit synchronization points:
//!
//! 1. every producer has **started** before [`FanIn::spawn`] returns;
//! 2. a drain consumer is confirmed **running** before producers are
//!    joined during shutdown, so one blocked mid-send can always
//!    complete;
//! 3. every producer has **finished** before shutdown returns.
//!
//! Without these a producer can block forever on a send nobody will
//! receive, or the channel can be torn down with a send still in
//! flight.

use std::sync::Arc;

use gateway_protocol::ServiceLogLine;
use tokio::sync::{Barrier, mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::debug;

use crate::cluster::{BoxedLogSource, SourceCloser};

/// Channel capacity between producers and the write loop. Small on
/// purpose: producers must block once the writer stops draining, which
/// is what the shutdown contract is built around.
const LINE_BUFFER: usize = 1;

/// One writer's view of N producing log sources.
///
/// Owns the sources for the duration of the session; every source is
/// closed exactly once during [`shutdown`](Self::shutdown), regardless
/// of why the session ends.
pub struct FanIn {
    rx: mpsc::Receiver<ServiceLogLine>,
    closers: Vec<SourceCloser>,
    producers: JoinSet<()>,
}

impl FanIn {
    /// Spawn one producer task per source.
    ///
    /// Returns only after every producer is running, so a later
    /// [`shutdown`](Self::shutdown) cannot race a producer that has not
    /// yet taken ownership of its source.
    pub async fn spawn(sources: Vec<BoxedLogSource>) -> Self {
        let (tx, rx) = mpsc::channel(LINE_BUFFER);
        let started = Arc::new(Barrier::new(sources.len() + 1));
        let closers: Vec<_> = sources.iter().map(|s| s.closer_dyn()).collect();

        let mut producers = JoinSet::new();
        for mut source in sources {
            let tx = tx.clone();
            let started = started.clone();
            producers.spawn(async move {
                let name = source.name_dyn().to_string();
                started.wait().await;
                while let Some(message) = source.next_line_dyn().await {
                    let line = ServiceLogLine {
                        name: name.clone(),
                        message,
                    };
                    if tx.send(line).await.is_err() {
                        break;
                    }
                }
            });
        }
        // Producers hold the only senders; the channel ends when the
        // last of them exits.
        drop(tx);

        started.wait().await;

        Self {
            rx,
            closers,
            producers,
        }
    }

    /// Next line from any source; `None` once every producer has
    /// finished and the channel is empty.
    pub async fn recv(&mut self) -> Option<ServiceLogLine> {
        self.rx.recv().await
    }

    /// Close every source and stop every producer.
    ///
    /// After return, no task of this fan-in touches the channel or the
    /// sources. Safe to call whether the stream was exhausted or
    /// abandoned mid-flight.
    pub async fn shutdown(self) {
        let Self {
            rx,
            closers,
            mut producers,
        } = self;

        for closer in &closers {
            closer.close();
        }

        // A producer blocked mid-send only finishes once something is
        // consuming again; the drain must be confirmed live before the
        // producers are joined.
        let (running_tx, running_rx) = oneshot::channel();
        let drain = tokio::spawn(async move {
            let mut rx = rx;
            let _ = running_tx.send(());
            let mut discarded = 0usize;
            while rx.recv().await.is_some() {
                discarded += 1;
            }
            discarded
        });
        let _ = running_rx.await;

        while producers.join_next().await.is_some() {}

        if let Ok(discarded) = drain.await {
            if discarded > 0 {
                debug!("discarded {discarded} undelivered log lines at teardown");
            }
        }
    }
}
