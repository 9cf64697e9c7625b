//! Outbound port: the coordinator handle.
//!
//! A message-passing client injected into the gateway at construction,
//! never a process-wide singleton reached via ambient lookup.

use crate::domain::registry::HandlerSnapshot;
use async_trait::async_trait;
use shared_types::{PeerHeaders, RpcErrorPayload, RpcRequest, SubsystemReadiness};
use std::net::IpAddr;

/// Failure of a coordinator call as seen by the gateway.
#[derive(Debug, thiserror::Error)]
pub enum CoordinatorError {
    /// The coordinator answered with an error payload.
    #[error("coordinator reported: {0}")]
    Reported(RpcErrorPayload),
    /// The bridge itself failed (conduit closed, send failure).
    #[error("bridge failure: {0}")]
    Bridge(String),
    /// The coordinator answered with a value of an unexpected shape.
    #[error("malformed coordinator response: {0}")]
    Malformed(String),
}

/// The privileged coordinator, reachable only by RPC.
#[async_trait]
pub trait Coordinator: Send + Sync {
    /// Current routable method names. Failure is fatal to the connection
    /// setup that depends on it.
    async fn fetch_handlers(&self) -> Result<HandlerSnapshot, CoordinatorError>;

    /// Readiness report, in the coordinator's iteration order.
    async fn is_app_ready(&self) -> Result<Vec<SubsystemReadiness>, CoordinatorError>;

    /// Whether `ip` is a whitelisted forger.
    async fn is_forger_authorized(&self, ip: IpAddr) -> Result<bool, CoordinatorError>;

    /// Peer-acceptance side effect for `peer`-namespace traffic. The
    /// return value is unused by the gateway.
    async fn accept_new_peer(
        &self,
        ip: IpAddr,
        headers: &PeerHeaders,
    ) -> Result<(), CoordinatorError>;

    /// Forward a validated envelope and return the coordinator's outcome.
    async fn relay(&self, request: RpcRequest) -> Result<serde_json::Value, CoordinatorError>;
}
