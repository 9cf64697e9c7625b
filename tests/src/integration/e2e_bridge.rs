//! # End-to-End Bridge Choreography
//!
//! Runs the full worker pipeline over the real RPC bridge:
//!
//! ```text
//! PeerDriver → GatewayService → ValidationMiddleware → RpcCoordinator
//!                                                          │
//!                                         channel conduit  │
//!                                                          ▼
//!                                        scripted coordinator process
//! ```
//!
//! Asserts correlation under concurrency, verbatim error passthrough,
//! and the fixed `Unknown error` mask when the bridge itself fails.

#[cfg(test)]
mod tests {
    use crate::integration::support::{valid_payload, ChannelListener, PeerDriver};
    use coordinator_rpc::{channel, RpcCall, RpcOutcome, RpcResponse};
    use shared_types::RpcErrorPayload;
    use socket_gateway::adapters::RpcCoordinator;
    use socket_gateway::{Coordinator, GatewayService};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn readiness_all_ready() -> serde_json::Value {
        serde_json::json!([{"name": "blockchain", "ready": true}])
    }

    fn handlers() -> serde_json::Value {
        serde_json::json!({"peer": ["getStatus", "getBlocks"], "internal": []})
    }

    /// Answer the connection-setup and middleware endpoints; hand anything
    /// else to `script`.
    async fn coordinator_process<F>(
        mut call_rx: mpsc::Receiver<RpcCall>,
        resp_tx: mpsc::Sender<RpcResponse>,
        mut script: F,
    ) where
        F: FnMut(&RpcCall) -> Option<RpcOutcome> + Send,
    {
        while let Some(call) = call_rx.recv().await {
            let outcome = match call.request.endpoint.as_str() {
                "p2p.utils.getHandlers" => RpcOutcome::Success(handlers()),
                "p2p.utils.isAppReady" => RpcOutcome::Success(readiness_all_ready()),
                "p2p.peer.acceptNewPeer" => RpcOutcome::Success(serde_json::Value::Null),
                _ => match script(&call) {
                    Some(outcome) => outcome,
                    // Script wants the conduit torn down
                    None => return,
                },
            };
            if resp_tx
                .send(RpcResponse {
                    correlation_id: call.correlation_id,
                    outcome,
                })
                .await
                .is_err()
            {
                return;
            }
        }
    }

    /// Full worker wiring over an in-process conduit.
    fn spawn_worker<F>(script: F) -> PeerDriver
    where
        F: FnMut(&RpcCall) -> Option<RpcOutcome> + Send + 'static,
    {
        let (client, listener, call_rx, resp_tx) = channel::conduit(32);
        tokio::spawn(listener.run());
        tokio::spawn(coordinator_process(call_rx, resp_tx, script));

        let coordinator: Arc<dyn Coordinator> =
            Arc::new(RpcCoordinator::new(Arc::new(client)));

        let (conn_tx, conn_rx) = mpsc::channel(4);
        let (conn, driver) = PeerDriver::connect("203.0.113.5", 16);
        tokio::spawn(GatewayService::new(ChannelListener(conn_rx), coordinator).run());
        tokio::spawn(async move {
            conn_tx.send(conn).await.unwrap();
        });

        driver
    }

    #[tokio::test]
    async fn test_coordinator_value_reaches_the_peer_verbatim() {
        let driver = spawn_worker(|call| {
            assert_eq!(call.request.endpoint, "p2p.peer.getStatus");
            Some(RpcOutcome::Success(serde_json::json!({
                "height": 5544,
                "forgingAllowed": true
            })))
        });

        let reply = driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();

        let data = reply.data.unwrap();
        assert_eq!(data["height"], 5544);
        assert_eq!(data["forgingAllowed"], true);
    }

    #[tokio::test]
    async fn test_coordinator_reported_error_reaches_the_peer_verbatim() {
        let driver = spawn_worker(|_| {
            Some(RpcOutcome::Error(RpcErrorPayload::named(
                "Error",
                "Blockchain not ready to accept new block at height 5545",
            )))
        });

        let reply = driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();

        let payload = reply.error.unwrap();
        assert_eq!(
            payload.message,
            "Blockchain not ready to accept new block at height 5545"
        );
    }

    #[tokio::test]
    async fn test_bridge_failure_is_masked_as_unknown_error() {
        // The coordinator process dies on the first forwarded call,
        // closing the conduit with the call still in flight
        let driver = spawn_worker(|_| None);

        let reply = driver
            .emit("p2p.peer.getStatus", valid_payload())
            .await
            .await
            .unwrap();

        let payload = reply.error.unwrap();
        assert_eq!(payload.name.as_deref(), Some("Unknown"));
        assert_eq!(payload.message, "Unknown error");
    }

    #[tokio::test]
    async fn test_concurrent_events_resolve_to_their_own_outcomes() {
        // Each forwarded call is answered with its own endpoint, so a
        // mismatched correlation would be visible in the replies
        let driver = spawn_worker(|call| {
            Some(RpcOutcome::Success(serde_json::json!(
                call.request.endpoint
            )))
        });

        let rx_status = driver.emit("p2p.peer.getStatus", valid_payload()).await;
        let rx_blocks = driver.emit("p2p.peer.getBlocks", valid_payload()).await;

        let status = rx_status.await.unwrap();
        let blocks = rx_blocks.await.unwrap();
        assert_eq!(status.data.unwrap(), serde_json::json!("p2p.peer.getStatus"));
        assert_eq!(blocks.data.unwrap(), serde_json::json!("p2p.peer.getBlocks"));
    }
}
