//! Inbound port: the `NetworkListener` capability.
//!
//! The gateway depends on this interface only, never on a concrete worker
//! base type; transports plug in as adapters.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::RpcErrorPayload;
use std::net::IpAddr;
use tokio::sync::{mpsc, oneshot};

/// Reply written back to the caller's response channel.
///
/// Mirrors the `(error, value)` callback convention: success carries
/// `data` with no `error`, failure carries `error` with no `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocketReply {
    /// Error slot; `None` on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcErrorPayload>,
    /// Value slot; `None` on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl SocketReply {
    /// `(null, value)`.
    pub fn ok(value: serde_json::Value) -> Self {
        Self {
            error: None,
            data: Some(value),
        }
    }

    /// `(error, undefined)`.
    pub fn err(payload: RpcErrorPayload) -> Self {
        Self {
            error: Some(payload),
            data: None,
        }
    }

    pub fn is_err(&self) -> bool {
        self.error.is_some()
    }
}

/// One inbound socket event awaiting a reply.
///
/// Dropping `reply` without sending means the event produces no response
/// at all; the transport adapter treats that as silence, not an error.
#[derive(Debug)]
pub struct InboundEvent {
    /// Full event name as received, e.g. `p2p.peer.getStatus`.
    pub event: String,
    /// Event payload: `{ data, headers }` from the remote peer.
    pub data: serde_json::Value,
    /// One-shot reply channel back to the caller.
    pub reply: oneshot::Sender<SocketReply>,
}

/// An accepted connection: remote address plus its inbound event stream.
///
/// Ephemeral, one per remote peer; the stream ends when the peer hangs up
/// or the transport drops the connection.
#[derive(Debug)]
pub struct PeerConnection {
    /// The socket's remote IP, stamped into validated envelopes.
    pub remote_addr: IpAddr,
    /// Events in transport receipt order.
    pub events: mpsc::Receiver<InboundEvent>,
}

/// The listener capability the gateway consumes connections from.
#[async_trait]
pub trait NetworkListener: Send {
    /// Next accepted connection; `None` when the listener shuts down.
    async fn next_connection(&mut self) -> Option<PeerConnection>;
}
