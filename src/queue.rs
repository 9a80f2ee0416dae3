//! Single-flight deduplicating background job queue.
//!
//! [`DedupQueue`] runs fire-and-forget tasks with at-most-one queued or
//! running execution per identity key, strictly sequentially in FIFO
//! arrival order. A second `enqueue` with an id that is still tracked is
//! collapsed into the existing execution — a log notice, nothing more.
//!
//! The tracked-id set lives alongside the job channel rather than inside
//! ambient closures, so "is this id in flight" has exactly one answer at
//! any time. An id is released the moment its task settles, success or
//! failure, which is what allows a legitimate re-enqueue later.
//!
//! A failing task is logged and the loop moves on to the next job; errors
//! never reach the `enqueue` caller. Independent queue instances share no
//! state or ordering.

use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex};

use futures_util::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::Result;
use crate::telemetry;

struct Job {
    id: String,
    task: BoxFuture<'static, Result<()>>,
}

/// Sequential background queue that collapses duplicate pending work.
///
/// Must be created inside a tokio runtime; construction spawns the single
/// worker task. Dropping the queue closes the channel and the worker
/// drains remaining jobs before exiting.
pub struct DedupQueue {
    name: String,
    tx: mpsc::UnboundedSender<Job>,
    inflight: Arc<Mutex<HashSet<String>>>,
}

impl DedupQueue {
    /// Create a named queue and spawn its worker loop.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let (tx, mut rx) = mpsc::unbounded_channel::<Job>();
        let inflight: Arc<Mutex<HashSet<String>>> = Arc::new(Mutex::new(HashSet::new()));

        let worker_ids = inflight.clone();
        let worker_name = name.clone();
        tokio::spawn(async move {
            while let Some(job) = rx.recv().await {
                debug!(queue = %worker_name, id = %job.id, "running background job");
                if let Err(error) = job.task.await {
                    warn!(queue = %worker_name, id = %job.id, %error, "background job failed");
                    metrics::counter!(telemetry::JOB_FAILURES_TOTAL,
                        "queue" => worker_name.clone())
                    .increment(1);
                }
                worker_ids
                    .lock()
                    .expect("queue lock poisoned")
                    .remove(&job.id);
            }
        });

        Self { name, tx, inflight }
    }

    /// Enqueue a fire-and-forget task under an identity key.
    ///
    /// If the id is already queued or running, the new task is discarded
    /// and the existing execution is authoritative.
    pub fn enqueue<F>(&self, id: impl Into<String>, task: F)
    where
        F: Future<Output = Result<()>> + Send + 'static,
    {
        let id = id.into();
        {
            let mut inflight = self.inflight.lock().expect("queue lock poisoned");
            if !inflight.insert(id.clone()) {
                info!(queue = %self.name, %id, "job already queued or running, skipping");
                return;
            }
        }
        metrics::counter!(telemetry::JOBS_TOTAL, "queue" => self.name.clone()).increment(1);

        let job = Job {
            id: id.clone(),
            task: Box::pin(task),
        };
        if self.tx.send(job).is_err() {
            // worker gone (runtime shutting down); release the id
            self.inflight
                .lock()
                .expect("queue lock poisoned")
                .remove(&id);
        }
    }

    /// Number of ids currently queued or running.
    pub fn in_flight(&self) -> usize {
        self.inflight.lock().expect("queue lock poisoned").len()
    }
}
