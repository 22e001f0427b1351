//! Per-connection session: four periodic producers multiplexed onto one
//! outbound channel, torn down as a group.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::producers::{now_millis, sample};
use crate::types::{Metric, MetricSample};

#[derive(Debug, Error)]
pub enum PushError {
    #[error("channel closed")]
    Closed,
    #[error("outbound buffer full")]
    Full,
    #[error("encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Where a session's serialized samples go. Producers call `push` from their
/// own tasks, so it must never block.
pub trait SampleSink: Send + Sync + 'static {
    fn is_open(&self) -> bool;
    fn push(&self, payload: String) -> Result<(), PushError>;
}

/// Bounded hand-off to the connection's writer task.
pub struct ChannelSink {
    tx: mpsc::Sender<String>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<String>) -> Self {
        Self { tx }
    }
}

impl SampleSink for ChannelSink {
    fn is_open(&self) -> bool {
        !self.tx.is_closed()
    }

    fn push(&self, payload: String) -> Result<(), PushError> {
        self.tx.try_send(payload).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => PushError::Full,
            mpsc::error::TrySendError::Closed(_) => PushError::Closed,
        })
    }
}

/// Serialize and hand one sample to the sink. Nothing is sent unless the
/// sink reports itself open.
pub fn deliver(sink: &dyn SampleSink, sample: &MetricSample) -> Result<(), PushError> {
    if !sink.is_open() {
        return Err(PushError::Closed);
    }
    let payload = serde_json::to_string(sample)?;
    sink.push(payload)
}

pub struct Session {
    id: u64,
    instance_id: String,
    sink: Arc<dyn SampleSink>,
    started: AtomicBool,
    stopped: Arc<AtomicBool>,
    live: Arc<AtomicUsize>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    stop_tx: watch::Sender<bool>,
}

impl Session {
    pub fn new(id: u64, instance_id: impl Into<String>, sink: Arc<dyn SampleSink>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            id,
            instance_id: instance_id.into(),
            sink,
            started: AtomicBool::new(false),
            stopped: Arc::new(AtomicBool::new(false)),
            live: Arc::new(AtomicUsize::new(0)),
            tasks: Mutex::new(Vec::with_capacity(Metric::ALL.len())),
            stop_tx,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Arm one interval task per metric. The first sample of each metric
    /// lands one full period after this call. Calling twice, or after
    /// `stop`, does nothing.
    pub fn start(&self) {
        if self.stopped.load(Ordering::Acquire) || self.started.swap(true, Ordering::AcqRel) {
            return;
        }
        let origin = Instant::now();
        let Ok(mut tasks) = self.tasks.lock() else {
            return;
        };
        // stop() may have won the race while we waited for the lock.
        if self.stopped.load(Ordering::Acquire) {
            return;
        }
        for metric in Metric::ALL {
            let sink = Arc::clone(&self.sink);
            let stopped = Arc::clone(&self.stopped);
            let live = Arc::clone(&self.live);
            live.fetch_add(1, Ordering::AcqRel);
            tasks.push(tokio::spawn(run_producer(
                metric,
                origin,
                sink,
                stopped,
                LiveGuard(live),
                self.instance_id.clone(),
            )));
        }
        info!(
            session = self.id,
            instance = %self.instance_id,
            "session started with {} producers",
            Metric::ALL.len()
        );
    }

    /// Cancel every producer. Returns true for the call that actually tore the
    /// session down; later or concurrent calls are no-ops.
    pub fn stop(&self) -> bool {
        if self.stopped.swap(true, Ordering::AcqRel) {
            return false;
        }
        // Poisoning only means a holder panicked mid-push; the handles are still valid.
        let handles = match self.tasks.lock() {
            Ok(mut g) => std::mem::take(&mut *g),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };
        for h in &handles {
            h.abort();
        }
        self.stop_tx.send_replace(true);
        info!(session = self.id, instance = %self.instance_id, "session stopped");
        true
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }

    /// Producer tasks that have not yet been dropped by the runtime.
    pub fn live_producers(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    /// Resolves once `stop` has run.
    pub async fn stopped(&self) {
        let mut rx = self.stop_tx.subscribe();
        let _ = rx.wait_for(|s| *s).await;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

struct LiveGuard(Arc<AtomicUsize>);

impl Drop for LiveGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

async fn run_producer(
    metric: Metric,
    origin: Instant,
    sink: Arc<dyn SampleSink>,
    stopped: Arc<AtomicBool>,
    _live: LiveGuard,
    instance_id: String,
) {
    let period = metric.period();
    let mut ticker = interval_at(origin + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if stopped.load(Ordering::Acquire) {
            break;
        }
        let s = sample(metric, now_millis());
        match deliver(sink.as_ref(), &s) {
            Ok(()) => {}
            Err(PushError::Encode(e)) => {
                error!(instance = %instance_id, %metric, "error encoding sample: {e}");
            }
            Err(e) => {
                debug!(instance = %instance_id, %metric, "sample dropped: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sink_reports_full_and_closed() {
        let (tx, rx) = mpsc::channel(1);
        let sink = ChannelSink::new(tx);
        assert!(sink.is_open());
        sink.push("a".into()).unwrap();
        assert!(matches!(sink.push("b".into()), Err(PushError::Full)));
        drop(rx);
        assert!(!sink.is_open());
        assert!(matches!(sink.push("c".into()), Err(PushError::Closed)));
    }

    #[tokio::test]
    async fn deliver_skips_closed_sink() {
        let (tx, rx) = mpsc::channel(4);
        drop(rx);
        let sink = ChannelSink::new(tx);
        let s = MetricSample::Cpu {
            value: 1.0,
            timestamp: 1,
        };
        assert!(matches!(deliver(&sink, &s), Err(PushError::Closed)));
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let (tx, _rx) = mpsc::channel(4);
        let session = Session::new(1, "i-1", Arc::new(ChannelSink::new(tx)));
        session.start();
        assert!(session.stop());
        assert!(!session.stop());
        assert!(session.is_stopped());
    }

    #[tokio::test]
    async fn start_after_stop_arms_nothing() {
        let (tx, _rx) = mpsc::channel(4);
        let session = Session::new(1, "i-1", Arc::new(ChannelSink::new(tx)));
        session.stop();
        session.start();
        assert_eq!(session.live_producers(), 0);
    }
}
