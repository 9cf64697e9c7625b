//! # Rebuild Queue - Serialized Block Rebuilds
//!
//! Coordinator-side queue that rebuilds blocks one at a time. Each pushed
//! block gets exactly one completion callback, invoked after its rebuild
//! attempt whether the attempt succeeded or not. While paused, nothing is
//! processed and no callback fires; pushed items are retained and resume
//! picks them up in push order.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use async_trait::async_trait;
use shared_types::BlockData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error};

/// Rebuild failure, carrying whatever detail the rebuilder reported.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct RebuildError(pub String);

impl RebuildError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// The block-rebuilding capability the queue drives.
#[async_trait]
pub trait BlockRebuilder: Send + Sync {
    /// Rebuild one block from its stored data.
    async fn rebuild_block(&self, block: &BlockData) -> Result<(), RebuildError>;
}

/// Callback invoked once per pushed block, after its rebuild attempt.
pub type DoneCallback = Box<dyn FnOnce() + Send>;

struct Job {
    block: BlockData,
    done: DoneCallback,
}

/// Handle to the queue; cheap to clone. Dropping every handle stops the
/// worker after the items already queued are drained.
#[derive(Clone)]
pub struct RebuildQueue {
    jobs: mpsc::UnboundedSender<Job>,
    paused: Arc<watch::Sender<bool>>,
    depth: Arc<AtomicUsize>,
}

impl RebuildQueue {
    /// Spawn the worker and return its handle.
    pub fn new(rebuilder: Arc<dyn BlockRebuilder>) -> Self {
        let (jobs, job_rx) = mpsc::unbounded_channel();
        let (paused, pause_rx) = watch::channel(false);
        let depth = Arc::new(AtomicUsize::new(0));

        tokio::spawn(worker(rebuilder, job_rx, pause_rx, Arc::clone(&depth)));

        Self {
            jobs,
            paused: Arc::new(paused),
            depth,
        }
    }

    /// Enqueue one block. `done` fires after the rebuild attempt, on
    /// success and on failure alike.
    pub fn push(&self, block: BlockData, done: impl FnOnce() + Send + 'static) {
        self.depth.fetch_add(1, Ordering::SeqCst);
        let _ = self.jobs.send(Job {
            block,
            done: Box::new(done),
        });
    }

    /// Stop processing. Items already pushed stay queued; their callbacks
    /// are deferred until [`resume`](Self::resume).
    pub fn pause(&self) {
        let _ = self.paused.send(true);
    }

    /// Resume processing of retained items, in push order.
    pub fn resume(&self) {
        let _ = self.paused.send(false);
    }

    pub fn is_paused(&self) -> bool {
        *self.paused.borrow()
    }

    /// Number of blocks whose callbacks have not fired yet.
    pub fn len(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Single worker: concurrency is exactly one by construction.
async fn worker(
    rebuilder: Arc<dyn BlockRebuilder>,
    mut jobs: mpsc::UnboundedReceiver<Job>,
    mut paused: watch::Receiver<bool>,
    depth: Arc<AtomicUsize>,
) {
    while let Some(job) = jobs.recv().await {
        // Hold the job, and with it the callback, until unpaused
        while *paused.borrow() {
            if paused.changed().await.is_err() {
                return;
            }
        }

        let height = job.block.height;
        match rebuilder.rebuild_block(&job.block).await {
            Ok(()) => debug!(height = height, "Rebuilt block"),
            Err(e) => {
                error!("Failed to rebuild block in RebuildQueue: {height}");
                debug!(height = height, error = %e, "Rebuild failure detail");
            }
        }

        (job.done)();
        depth.fetch_sub(1, Ordering::SeqCst);
    }
}
