//! Coordinator handle over the RPC bridge.
//!
//! Translates the typed [`Coordinator`] port into `p2p.utils.*` /
//! `p2p.peer.*` envelopes on the shared conduit.

use crate::domain::registry::HandlerSnapshot;
use crate::ports::outbound::{Coordinator, CoordinatorError};
use async_trait::async_trait;
use coordinator_rpc::{RpcClient, RpcError};
use serde::de::DeserializeOwned;
use shared_types::{PeerHeaders, RpcRequest, SubsystemReadiness};
use std::net::IpAddr;
use std::sync::Arc;

/// Utility endpoint advertising the routable method names.
const GET_HANDLERS: &str = "p2p.utils.getHandlers";
/// Utility endpoint reporting subsystem readiness.
const IS_APP_READY: &str = "p2p.utils.isAppReady";
/// Utility endpoint checking the forger whitelist.
const IS_FORGER_AUTHORIZED: &str = "p2p.utils.isForgerAuthorized";
/// Peer-acceptance endpoint invoked as a side effect.
const ACCEPT_NEW_PEER: &str = "p2p.peer.acceptNewPeer";

/// [`Coordinator`] implementation over an [`RpcClient`].
pub struct RpcCoordinator {
    client: Arc<RpcClient>,
}

impl RpcCoordinator {
    pub fn new(client: Arc<RpcClient>) -> Self {
        Self { client }
    }

    async fn call_typed<T: DeserializeOwned>(
        &self,
        request: RpcRequest,
    ) -> Result<T, CoordinatorError> {
        let value = self.client.call(request).await.map_err(map_rpc_error)?;
        serde_json::from_value(value).map_err(|e| CoordinatorError::Malformed(e.to_string()))
    }
}

fn map_rpc_error(e: RpcError) -> CoordinatorError {
    match e {
        RpcError::Coordinator(payload) => CoordinatorError::Reported(payload),
        other => CoordinatorError::Bridge(other.to_string()),
    }
}

#[async_trait]
impl Coordinator for RpcCoordinator {
    async fn fetch_handlers(&self) -> Result<HandlerSnapshot, CoordinatorError> {
        self.call_typed(RpcRequest::new(GET_HANDLERS)).await
    }

    async fn is_app_ready(&self) -> Result<Vec<SubsystemReadiness>, CoordinatorError> {
        self.call_typed(RpcRequest::new(IS_APP_READY)).await
    }

    async fn is_forger_authorized(&self, ip: IpAddr) -> Result<bool, CoordinatorError> {
        let request = RpcRequest::new(IS_FORGER_AUTHORIZED)
            .with_data(serde_json::json!({ "ip": ip.to_string() }));
        self.call_typed(request).await
    }

    async fn accept_new_peer(
        &self,
        ip: IpAddr,
        headers: &PeerHeaders,
    ) -> Result<(), CoordinatorError> {
        let request = RpcRequest::new(ACCEPT_NEW_PEER)
            .with_data(serde_json::json!({ "ip": ip.to_string() }))
            .with_headers(headers.clone());
        // Return value is unspecified and unused
        self.client.call(request).await.map_err(map_rpc_error)?;
        Ok(())
    }

    async fn relay(&self, request: RpcRequest) -> Result<serde_json::Value, CoordinatorError> {
        self.client.call(request).await.map_err(map_rpc_error)
    }
}
