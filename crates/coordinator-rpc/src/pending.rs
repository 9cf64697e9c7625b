//! Pending call store - maps correlation IDs to waiting callers.
//!
//! There is deliberately no TTL sweep here: an entry lives until the
//! coordinator answers, the send fails, or the caller drops its receiver.

use crate::correlation::CorrelationId;
use dashmap::DashMap;
use shared_types::RpcErrorPayload;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Outcome of one coordinator call: exactly one of value or error.
pub type CallOutcome = Result<serde_json::Value, RpcErrorPayload>;

/// A call waiting for its response.
struct PendingCall {
    /// Channel to hand the outcome to the suspended caller.
    sender: oneshot::Sender<CallOutcome>,
    /// When the call was registered, for latency logging.
    created_at: Instant,
    /// Endpoint name, for logging.
    endpoint: String,
}

/// Counters for the pending call store.
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Calls registered.
    pub total_registered: AtomicU64,
    /// Calls completed with an outcome.
    pub total_completed: AtomicU64,
    /// Calls cancelled (send failure or dropped receiver).
    pub total_cancelled: AtomicU64,
}

/// Store of in-flight coordinator calls.
pub struct PendingCallStore {
    pending: DashMap<CorrelationId, PendingCall>,
    stats: Arc<PendingStats>,
}

impl PendingCallStore {
    pub fn new() -> Self {
        Self {
            pending: DashMap::new(),
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Register a call and get the receiver for its single outcome.
    pub fn register(&self, endpoint: &str) -> (CorrelationId, oneshot::Receiver<CallOutcome>) {
        let correlation_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        self.pending.insert(
            correlation_id,
            PendingCall {
                sender: tx,
                created_at: Instant::now(),
                endpoint: endpoint.to_string(),
            },
        );
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            endpoint = endpoint,
            "Registered pending call"
        );

        (correlation_id, rx)
    }

    /// Complete a call with its outcome.
    ///
    /// Returns false when the ID is unknown or the caller already went away.
    pub fn complete(&self, correlation_id: CorrelationId, outcome: CallOutcome) -> bool {
        let Some((_, pending)) = self.pending.remove(&correlation_id) else {
            warn!(
                correlation_id = %correlation_id,
                "Response for unknown correlation ID"
            );
            return false;
        };

        let elapsed = pending.created_at.elapsed();
        match pending.sender.send(outcome) {
            Ok(()) => {
                self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    endpoint = pending.endpoint,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Completed pending call"
                );
                true
            }
            Err(_) => {
                // Caller dropped its receiver
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    endpoint = pending.endpoint,
                    "Pending call receiver dropped"
                );
                false
            }
        }
    }

    /// Remove a call without delivering an outcome (failed send).
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }

    /// Drop every in-flight call without an outcome.
    ///
    /// Used when the conduit closes: dropping the senders wakes every
    /// suspended caller with a closed-channel error instead of leaving
    /// them suspended forever.
    pub fn drain(&self) -> usize {
        let drained = self.pending.len();
        self.pending.clear();
        self.stats
            .total_cancelled
            .fetch_add(drained as u64, Ordering::Relaxed);
        if drained > 0 {
            warn!(drained = drained, "Drained pending calls on conduit close");
        }
        drained
    }

    /// Number of calls currently in flight.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Counter snapshot.
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}

impl Default for PendingCallStore {
    fn default() -> Self {
        Self::new()
    }
}
