//! The matchmaker: a FIFO pending queue that pairs clients two at a
//! time.
//!
//! Connections are owned by the matchmaker only while they sit in the
//! queue. As soon as two are available they are popped in arrival
//! order — the earlier one becomes player 1 — and handed to a new
//! session, which owns them from then on.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};

use flotilla_session::SessionId;
use flotilla_transport::LineConnection;
use tokio::sync::Mutex;

/// A pair of connections ready to become a session.
pub struct PairedClients {
    pub session_id: SessionId,
    /// The earlier-queued connection; becomes player 1.
    pub first: LineConnection,
    /// The later-queued connection; becomes player 2.
    pub second: LineConnection,
}

/// FIFO pairing of incoming connections.
#[derive(Default)]
pub struct Matchmaker {
    pending: Mutex<VecDeque<LineConnection>>,
    next_session_id: AtomicU64,
}

impl Matchmaker {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            // Session ids start at 1; 0 never appears in logs.
            next_session_id: AtomicU64::new(1),
        }
    }

    /// Appends a connection to the queue. If that makes two, pops both
    /// and allocates a session id for them.
    pub async fn enqueue(
        &self,
        conn: LineConnection,
    ) -> Option<PairedClients> {
        let mut pending = self.pending.lock().await;
        pending.push_back(conn);
        if pending.len() < 2 {
            return None;
        }

        let first = pending.pop_front().expect("queue has two entries");
        let second = pending.pop_front().expect("queue has two entries");
        let session_id = SessionId(
            self.next_session_id.fetch_add(1, Ordering::Relaxed),
        );
        Some(PairedClients {
            session_id,
            first,
            second,
        })
    }

    /// Number of connections currently waiting for an opponent.
    pub async fn waiting(&self) -> usize {
        self.pending.lock().await.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
