//! The session registry and its reaper.
//!
//! The registry maps live session ids to handles; the reaper is a
//! periodic task that removes entries whose session has finished and
//! whose task has actually exited (so the sockets are already closed).
//! The reaper is the only code that deletes sessions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use flotilla_session::SessionId;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How often the reaper scans the registry.
pub const REAP_INTERVAL: Duration = Duration::from_secs(1);

/// The registry's view of one running session.
pub struct SessionHandle {
    finished: Arc<AtomicBool>,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn new(finished: Arc<AtomicBool>, task: JoinHandle<()>) -> Self {
        Self { finished, task }
    }

    /// True once the session raised its flag *and* its task has
    /// returned — at that point both sockets are closed and nothing
    /// references the session anymore.
    pub fn is_reapable(&self) -> bool {
        self.finished.load(Ordering::SeqCst) && self.task.is_finished()
    }
}

/// All live sessions, keyed by id. Mutation happens under the lock;
/// the acceptor inserts, the reaper removes.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: Mutex<HashMap<SessionId, SessionHandle>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, id: SessionId, handle: SessionHandle) {
        self.sessions.lock().await.insert(id, handle);
    }

    /// Removes every finished session. Returns how many were removed.
    pub async fn reap(&self) -> usize {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|id, handle| {
            if handle.is_reapable() {
                tracing::debug!(session = %id, "reaped finished session");
                false
            } else {
                true
            }
        });
        before - sessions.len()
    }

    /// Number of tracked sessions, finished or not.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

/// Starts the reaper task. Runs until the process exits.
pub fn spawn_reaper(registry: Arc<SessionRegistry>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(REAP_INTERVAL);
        loop {
            ticker.tick().await;
            let reaped = registry.reap().await;
            if reaped > 0 {
                tracing::info!(reaped, "removed finished sessions");
            }
        }
    })
}

// =========================================================================
// Tests
// =========================================================================
