//! RPC client and response listener over the coordinator conduit.
//!
//! The conduit is one shared channel per worker; individual calls are
//! multiplexed by correlation ID, not globally serialized.

use crate::correlation::CorrelationId;
use crate::pending::{CallOutcome, PendingCallStore};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{RpcErrorPayload, RpcRequest};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// One call on the wire: a request envelope tagged with its correlation ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcCall {
    /// Matches the response back to the suspended caller.
    pub correlation_id: CorrelationId,
    /// The request envelope.
    #[serde(flatten)]
    pub request: RpcRequest,
}

/// Coordinator outcome as carried on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "body", rename_all = "snake_case")]
pub enum RpcOutcome {
    /// The coordinator's returned value.
    Success(serde_json::Value),
    /// The coordinator's reported error payload.
    Error(RpcErrorPayload),
}

impl RpcOutcome {
    pub fn into_result(self) -> CallOutcome {
        match self {
            RpcOutcome::Success(value) => Ok(value),
            RpcOutcome::Error(payload) => Err(payload),
        }
    }
}

/// One response on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    /// Correlation ID of the call this answers.
    pub correlation_id: CorrelationId,
    /// The single outcome.
    pub outcome: RpcOutcome,
}

/// Bridge-level failures (distinct from coordinator-reported errors).
#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("conduit closed")]
    ConduitClosed,
    #[error("send failed: {0}")]
    SendFailed(String),
    #[error("codec error: {0}")]
    Codec(String),
    #[error("coordinator error: {0}")]
    Coordinator(RpcErrorPayload),
}

/// Sending half of the conduit to the coordinator.
#[async_trait]
pub trait RpcSender: Send + Sync {
    /// Put one call on the conduit.
    async fn send(&self, call: RpcCall) -> Result<(), RpcError>;
}

/// Receiving half of the conduit from the coordinator.
#[async_trait]
pub trait RpcReceiver: Send + Sync {
    /// Next response (suspends until one is available).
    async fn receive(&self) -> Result<RpcResponse, RpcError>;
}

/// Awaitable RPC client: `call(request) -> outcome`.
///
/// Injected into the gateway at construction; never reached through
/// ambient lookup.
pub struct RpcClient {
    pending: Arc<PendingCallStore>,
    sender: Arc<dyn RpcSender>,
}

impl RpcClient {
    pub fn new(pending: Arc<PendingCallStore>, sender: Arc<dyn RpcSender>) -> Self {
        Self { pending, sender }
    }

    /// Send one request and suspend until its single outcome arrives.
    ///
    /// There is no timeout: a non-responding coordinator suspends the
    /// caller indefinitely.
    pub async fn call(&self, request: RpcRequest) -> Result<serde_json::Value, RpcError> {
        let (correlation_id, rx) = self.pending.register(&request.endpoint);
        let endpoint = request.endpoint.clone();

        let call = RpcCall {
            correlation_id,
            request,
        };

        if let Err(e) = self.sender.send(call).await {
            self.pending.cancel(&correlation_id);
            return Err(RpcError::SendFailed(e.to_string()));
        }

        debug!(
            correlation_id = %correlation_id,
            endpoint = endpoint,
            "Sent coordinator call"
        );

        match rx.await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(payload)) => Err(RpcError::Coordinator(payload)),
            // Listener went away before answering
            Err(_) => Err(RpcError::ConduitClosed),
        }
    }

    /// Number of calls currently awaiting a response.
    pub fn pending_count(&self) -> usize {
        self.pending.pending_count()
    }
}

/// Loop that drains the conduit and completes pending calls.
pub struct ResponseListener {
    pending: Arc<PendingCallStore>,
    receiver: Arc<dyn RpcReceiver>,
}

impl ResponseListener {
    pub fn new(pending: Arc<PendingCallStore>, receiver: Arc<dyn RpcReceiver>) -> Self {
        Self { pending, receiver }
    }

    /// Run until the conduit closes. Spawn as a background task.
    pub async fn run(self) {
        loop {
            match self.receiver.receive().await {
                Ok(response) => {
                    let outcome = response.outcome.into_result();
                    if !self.pending.complete(response.correlation_id, outcome) {
                        debug!(
                            correlation_id = %response.correlation_id,
                            "Outcome had no waiting caller"
                        );
                    }
                }
                Err(RpcError::ConduitClosed) => {
                    warn!("Coordinator conduit closed, stopping response listener");
                    // Wake suspended callers instead of leaving them hanging
                    self.pending.drain();
                    break;
                }
                Err(e) => {
                    error!(error = %e, "Error receiving coordinator response");
                }
            }
        }
    }
}

/// In-process conduit over tokio channels.
///
/// Used by the test suite and by single-process deployments where the
/// coordinator runs in the same binary.
pub mod channel {
    use super::*;
    use tokio::sync::mpsc;

    pub struct ChannelSender(pub mpsc::Sender<RpcCall>);

    #[async_trait]
    impl RpcSender for ChannelSender {
        async fn send(&self, call: RpcCall) -> Result<(), RpcError> {
            self.0.send(call).await.map_err(|_| RpcError::ConduitClosed)
        }
    }

    pub struct ChannelReceiver(pub tokio::sync::Mutex<mpsc::Receiver<RpcResponse>>);

    #[async_trait]
    impl RpcReceiver for ChannelReceiver {
        async fn receive(&self) -> Result<RpcResponse, RpcError> {
            let mut guard = self.0.lock().await;
            guard.recv().await.ok_or(RpcError::ConduitClosed)
        }
    }

    /// Wire up a client and listener over in-process channels.
    ///
    /// Returns the client, the listener (spawn its `run`), the coordinator
    /// side's call receiver, and the coordinator side's response sender.
    pub fn conduit(
        buffer: usize,
    ) -> (
        RpcClient,
        ResponseListener,
        mpsc::Receiver<RpcCall>,
        mpsc::Sender<RpcResponse>,
    ) {
        let (call_tx, call_rx) = mpsc::channel(buffer);
        let (resp_tx, resp_rx) = mpsc::channel(buffer);

        let pending = Arc::new(PendingCallStore::new());
        let client = RpcClient::new(Arc::clone(&pending), Arc::new(ChannelSender(call_tx)));
        let listener = ResponseListener::new(
            pending,
            Arc::new(ChannelReceiver(tokio::sync::Mutex::new(resp_rx))),
        );

        (client, listener, call_rx, resp_tx)
    }
}
