//! Fan-in synchronization contract, exercised without any socket.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use gateway_server::fanin::FanIn;
use gateway_server::{BoxedLogSource, LogSource, SourceCloser};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

/// Channel-backed log source: lines arrive through a sender held by the
/// test, the close handle flips a watch flag and counts invocations.
struct TestSource {
    name: String,
    lines: mpsc::UnboundedReceiver<String>,
    closed: watch::Receiver<bool>,
    closer: SourceCloser,
}

struct SourceHandle {
    lines: mpsc::UnboundedSender<String>,
    closed: watch::Receiver<bool>,
    close_calls: Arc<AtomicUsize>,
}

fn test_source(name: &str) -> (TestSource, SourceHandle) {
    let (line_tx, line_rx) = mpsc::unbounded_channel();
    let (close_tx, close_rx) = watch::channel(false);
    let close_calls = Arc::new(AtomicUsize::new(0));

    let close_tx = Arc::new(close_tx);
    let calls = close_calls.clone();
    let closer = SourceCloser::new(move || {
        calls.fetch_add(1, Ordering::SeqCst);
        let _ = close_tx.send(true);
    });

    (
        TestSource {
            name: name.into(),
            lines: line_rx,
            closed: close_rx.clone(),
            closer,
        },
        SourceHandle {
            lines: line_tx,
            closed: close_rx,
            close_calls,
        },
    )
}

impl LogSource for TestSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn next_line(&mut self) -> Option<String> {
        tokio::select! {
            line = self.lines.recv() => line,
            _ = self.closed.wait_for(|closed| *closed) => None,
        }
    }

    fn closer(&self) -> SourceCloser {
        self.closer.clone()
    }
}

const TICK: Duration = Duration::from_secs(2);

#[tokio::test]
async fn union_complete_and_per_source_order_preserved() {
    let (a, ha) = test_source("web");
    let (b, hb) = test_source("db");
    for line in ["a1", "a2", "a3"] {
        ha.lines.send(line.into()).unwrap();
    }
    for line in ["b1", "b2"] {
        hb.lines.send(line.into()).unwrap();
    }
    // Exhaust both sources.
    drop(ha.lines);
    drop(hb.lines);

    let mut fanin = FanIn::spawn(vec![a.boxed(), b.boxed()]).await;

    let mut web = Vec::new();
    let mut db = Vec::new();
    while let Some(line) = timeout(TICK, fanin.recv()).await.unwrap() {
        match line.name.as_str() {
            "web" => web.push(line.message),
            "db" => db.push(line.message),
            other => panic!("unexpected source {other}"),
        }
    }

    assert_eq!(web, ["a1", "a2", "a3"]);
    assert_eq!(db, ["b1", "b2"]);

    timeout(TICK, fanin.shutdown()).await.unwrap();
    assert!(ha.close_calls.load(Ordering::SeqCst) >= 1);
    assert!(hb.close_calls.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn shutdown_with_idle_producers_does_not_hang() {
    let mut handles = Vec::new();
    let mut sources: Vec<BoxedLogSource> = Vec::new();
    for i in 0..8 {
        let (src, handle) = test_source(&format!("svc-{i}"));
        sources.push(src.boxed());
        handles.push(handle);
    }

    // No source ever produces a line; every producer is parked in
    // next_line when shutdown begins.
    let fanin = FanIn::spawn(sources).await;
    timeout(TICK, fanin.shutdown()).await.unwrap();

    for handle in &handles {
        assert_eq!(handle.close_calls.load(Ordering::SeqCst), 1);
        assert!(*handle.closed.borrow());
    }
}

#[tokio::test]
async fn shutdown_releases_producers_blocked_mid_send() {
    let (src, handle) = test_source("busy");
    // Far more lines than the channel buffers; with nothing consuming,
    // the producer ends up blocked inside a send.
    for i in 0..100 {
        handle.lines.send(format!("line-{i}")).unwrap();
    }

    let mut fanin = FanIn::spawn(vec![src.boxed()]).await;

    // Take one line so the session is mid-stream, then abandon it.
    let first = timeout(TICK, fanin.recv()).await.unwrap().unwrap();
    assert_eq!(first.message, "line-0");

    timeout(TICK, fanin.shutdown()).await.unwrap();
    assert_eq!(handle.close_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn close_is_idempotent_and_preserves_delivered_lines() {
    let (src, handle) = test_source("web");
    handle.lines.send("a".into()).unwrap();
    handle.lines.send("b".into()).unwrap();

    let closer = src.closer();
    let mut fanin = FanIn::spawn(vec![src.boxed()]).await;

    let mut got = Vec::new();
    for _ in 0..2 {
        got.push(timeout(TICK, fanin.recv()).await.unwrap().unwrap().message);
    }
    assert_eq!(got, ["a", "b"]);

    closer.close();
    closer.close();
    assert_eq!(handle.close_calls.load(Ordering::SeqCst), 2);

    // The producer observes the closed source and ends the channel.
    assert!(timeout(TICK, fanin.recv()).await.unwrap().is_none());

    timeout(TICK, fanin.shutdown()).await.unwrap();
    assert_eq!(handle.close_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn recv_ends_after_exhaustion_and_shutdown_still_completes() {
    let (src, handle) = test_source("web");
    handle.lines.send("only".into()).unwrap();
    drop(handle.lines);

    let mut fanin = FanIn::spawn(vec![src.boxed()]).await;

    assert_eq!(
        timeout(TICK, fanin.recv()).await.unwrap().unwrap().message,
        "only"
    );
    assert!(timeout(TICK, fanin.recv()).await.unwrap().is_none());

    // Shutdown after natural exhaustion is a no-op apart from closing
    // the source.
    timeout(TICK, fanin.shutdown()).await.unwrap();
    assert_eq!(handle.close_calls.load(Ordering::SeqCst), 1);
}
