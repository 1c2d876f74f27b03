//! Per-session persistence sequencing
//!
//! Store writes for one session must never interleave: a slow save racing a
//! chat switch would otherwise let an older snapshot land after a newer one.
//! [`PersistQueue`] gives every session key its own worker task; jobs for a
//! key run strictly in submission order while different keys proceed
//! independently. Draft sessions queue under a local draft key until the
//! store assigns an id.

use crate::error::{GeniexError, Result};
use futures::future::BoxFuture;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, oneshot};

type Job = BoxFuture<'static, ()>;

struct Worker {
    sender: mpsc::UnboundedSender<Job>,
    pending: Arc<AtomicUsize>,
}

fn spawn_worker() -> Worker {
    let (sender, mut receiver) = mpsc::unbounded_channel::<Job>();
    tokio::spawn(async move {
        while let Some(job) = receiver.recv().await {
            job.await;
        }
    });
    Worker {
        sender,
        pending: Arc::new(AtomicUsize::new(0)),
    }
}

/// Serializes persistence operations per session key
///
/// # Examples
///
/// ```no_run
/// use geniex::session::PersistQueue;
///
/// # async fn example() -> geniex::error::Result<()> {
/// let queue = PersistQueue::new();
/// let saved = queue.run("chat-1", async { Ok::<_, anyhow::Error>(42) }).await?;
/// assert_eq!(saved, 42);
/// # Ok(())
/// # }
/// ```
pub struct PersistQueue {
    workers: Mutex<HashMap<String, Worker>>,
}

impl PersistQueue {
    /// Creates an empty queue with no workers
    pub fn new() -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `fut` on the worker for `key`, after every job submitted for
    /// that key before it
    ///
    /// The returned future resolves with the job's own result once the
    /// worker has executed it. Jobs for different keys do not wait on each
    /// other.
    pub async fn run<F, T>(&self, key: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
        T: Send + 'static,
    {
        let (done_tx, done_rx) = oneshot::channel::<Result<T>>();

        let pending = {
            let mut workers = self.lock_workers();
            let worker = workers
                .entry(key.to_string())
                .or_insert_with(spawn_worker);
            worker.pending.fetch_add(1, Ordering::SeqCst);
            let pending = Arc::clone(&worker.pending);

            let job: Job = Box::pin(async move {
                let result = fut.await;
                // Receiver may be gone if the caller was dropped; the write
                // itself still completed in order.
                let _ = done_tx.send(result);
            });

            if let Err(returned) = worker.sender.send(job) {
                // Worker task died (panicked job); replace it and resubmit,
                // keeping the shared pending counter.
                let fresh = Worker {
                    sender: spawn_worker().sender,
                    pending: Arc::clone(&worker.pending),
                };
                let _ = fresh.sender.send(returned.0);
                workers.insert(key.to_string(), fresh);
            }
            pending
        };

        let result = done_rx
            .await
            .map_err(|_| GeniexError::Store(format!("persistence worker for {} dropped the job", key)))?;

        pending.fetch_sub(1, Ordering::SeqCst);
        self.reap(key);
        result
    }

    /// Number of live per-session workers
    pub fn active_workers(&self) -> usize {
        self.lock_workers().len()
    }

    /// Drops the worker for `key` when it has no pending jobs
    ///
    /// Submission increments the pending counter under the same lock, so a
    /// zero count here means the queue is drained and nothing is in flight.
    fn reap(&self, key: &str) {
        let mut workers = self.lock_workers();
        if let Some(worker) = workers.get(key) {
            if worker.pending.load(Ordering::SeqCst) == 0 {
                workers.remove(key);
            }
        }
    }

    fn lock_workers(&self) -> std::sync::MutexGuard<'_, HashMap<String, Worker>> {
        self.workers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PersistQueue {
    fn default() -> Self {
        Self::new()
    }
}
