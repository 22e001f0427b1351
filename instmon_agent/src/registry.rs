//! Connection registry: admits or rejects subscriptions and owns the live
//! sessions until their connection goes away.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{info, warn};

use crate::session::{SampleSink, Session};

pub const NORMAL_CLOSURE: u16 = 1000;
pub const MISSING_INSTANCE_ID: &str = "Missing instanceId";
pub const SERVER_SHUTTING_DOWN: &str = "Server shutting down";

/// Why a subscription was turned away; becomes the close frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rejection {
    pub code: u16,
    pub reason: &'static str,
}

#[derive(Default)]
pub struct ConnectionRegistry {
    next_id: AtomicU64,
    created: AtomicU64,
    closing: AtomicBool,
    sessions: Mutex<HashMap<u64, Arc<Session>>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit a connection for `instance_id`. An absent or empty id is rejected
    /// before any session exists. The id is opaque: it is not checked against
    /// the instance table and need not be unique across sessions. Once
    /// `shutdown` has run every connection is turned away.
    pub fn accept(
        &self,
        instance_id: Option<&str>,
        sink: Arc<dyn SampleSink>,
    ) -> Result<Arc<Session>, Rejection> {
        let Some(instance_id) = instance_id.filter(|s| !s.is_empty()) else {
            warn!("connection without instanceId; closing");
            return Err(Rejection {
                code: NORMAL_CLOSURE,
                reason: MISSING_INSTANCE_ID,
            });
        };
        if self.closing.load(Ordering::Acquire) {
            info!(instance = %instance_id, "rejecting connection during shutdown");
            return Err(Rejection {
                code: NORMAL_CLOSURE,
                reason: SERVER_SHUTTING_DOWN,
            });
        }

        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let session = Arc::new(Session::new(id, instance_id, sink));
        self.created.fetch_add(1, Ordering::Relaxed);
        session.start();

        if let Ok(mut map) = self.sessions.lock() {
            map.insert(id, Arc::clone(&session));
        }
        // shutdown() may have snapshotted the map before the insert.
        if self.closing.load(Ordering::Acquire) {
            session.stop();
        }
        info!(session = id, instance = %instance_id, "connected");
        Ok(session)
    }

    /// Close path for one session, whichever side initiated it.
    pub fn release(&self, session_id: u64) {
        let session = self
            .sessions
            .lock()
            .ok()
            .and_then(|mut map| map.remove(&session_id));
        if let Some(session) = session {
            session.stop();
            info!(session = session_id, instance = %session.instance_id(), "disconnected");
        }
    }

    /// Refuse new connections and stop every live session. Their connections
    /// see the stop and close themselves; entries are removed as each one
    /// releases.
    pub fn shutdown(&self) -> usize {
        self.closing.store(true, Ordering::Release);
        let sessions: Vec<Arc<Session>> = match self.sessions.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => Vec::new(),
        };
        let mut stopped = 0;
        for s in &sessions {
            if s.stop() {
                stopped += 1;
            }
        }
        if stopped > 0 {
            info!("stopped {stopped} live sessions");
        }
        stopped
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn sessions_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
