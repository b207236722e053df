//! Fire-and-forget score submission.
//!
//! The engine updates its own state synchronously and must never wait on
//! (or fail because of) score reporting. [`ScoreReporter`] decouples the
//! two with a queue: `submit` enqueues and returns immediately, a worker
//! thread drains the queue, attributes each score and records it. Store
//! failures are logged and dropped; the player never sees them.

use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc::{self, UnboundedSender};
use tracing::warn;
use twenty48_core::ScoreSink;

use crate::{IdentityProvider, ScoreEntry, ScoreStore, ScoreSubmission, ANONYMOUS};

/// Handle to the reporting queue. Dropping it closes the queue and joins
/// the worker, so queued scores are flushed before shutdown.
pub struct ScoreReporter {
    tx: Option<UnboundedSender<ScoreSubmission>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl ScoreReporter {
    /// Start the worker thread draining submissions into `store`.
    pub fn spawn(store: Arc<dyn ScoreStore>, identity: Box<dyn IdentityProvider>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<ScoreSubmission>();
        let worker = thread::spawn(move || {
            while let Some(submission) = rx.blocking_recv() {
                let username = identity
                    .display_name()
                    .unwrap_or_else(|| ANONYMOUS.to_string());
                let entry = ScoreEntry {
                    username,
                    score: submission.score,
                };
                if let Err(err) = store.record(entry) {
                    warn!(score = submission.score, error = %err, "score submission failed");
                }
            }
        });
        ScoreReporter {
            tx: Some(tx),
            worker: Some(worker),
        }
    }

    /// Enqueue a score and return immediately.
    pub fn submit(&self, score: u32) {
        if let Some(tx) = &self.tx {
            // The receiver only goes away at shutdown; a failed send means
            // the score is dropped, which is acceptable for best-effort
            // reporting.
            let _ = tx.send(ScoreSubmission { score });
        }
    }
}

impl ScoreSink for ScoreReporter {
    fn submit_score(&mut self, score: u32) {
        self.submit(score);
    }
}

impl Drop for ScoreReporter {
    fn drop(&mut self) {
        // Closing the channel lets the worker drain what is queued and exit.
        self.tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
