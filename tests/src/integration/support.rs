//! Shared fixtures for the integration tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{PeerHeaders, RpcRequest, SubsystemReadiness};
use socket_gateway::{
    Coordinator, CoordinatorError, HandlerSnapshot, InboundEvent, NetworkListener, PeerConnection,
    SocketReply,
};
use std::net::IpAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Nethash used across the suite; any 64-hex string works.
pub const NETHASH: &str = "6e84d08bd299ed97c212c886c98a57e36545c8f5d645ca7eeae63a8bd62d8988";

/// A scripted coordinator that records every call in arrival order.
pub struct ScriptedCoordinator {
    /// Call names in the order the gateway made them.
    pub calls: Mutex<Vec<String>>,
    /// Relayed envelopes, for asserting on stamped headers.
    pub relayed: Mutex<Vec<RpcRequest>>,
    pub snapshot: HandlerSnapshot,
    pub readiness: Vec<SubsystemReadiness>,
    pub forger_whitelist: Vec<IpAddr>,
    pub relay_response: serde_json::Value,
}

impl Default for ScriptedCoordinator {
    fn default() -> Self {
        let mut snapshot = HandlerSnapshot::default();
        snapshot.peer.insert("getStatus".to_string());
        snapshot.peer.insert("postBlock".to_string());
        snapshot.internal.insert("getUsernames".to_string());

        Self {
            calls: Mutex::new(Vec::new()),
            relayed: Mutex::new(Vec::new()),
            snapshot,
            readiness: vec![
                SubsystemReadiness {
                    name: "blockchain".to_string(),
                    ready: true,
                },
                SubsystemReadiness {
                    name: "p2p".to_string(),
                    ready: true,
                },
            ],
            forger_whitelist: Vec::new(),
            relay_response: serde_json::json!({"success": true}),
        }
    }
}

impl ScriptedCoordinator {
    pub fn with_not_ready(mut self, subsystem: &str) -> Self {
        self.readiness.insert(
            0,
            SubsystemReadiness {
                name: subsystem.to_string(),
                ready: false,
            },
        );
        self
    }

    pub fn whitelisting(mut self, ip: IpAddr) -> Self {
        self.forger_whitelist.push(ip);
        self
    }

    fn record(&self, call: &str) {
        self.calls.lock().push(call.to_string());
    }

    /// Calls made after the connection-setup registry fetch.
    pub fn calls_after_setup(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter(|c| c.as_str() != "fetch_handlers")
            .cloned()
            .collect()
    }
}

#[async_trait]
impl Coordinator for ScriptedCoordinator {
    async fn fetch_handlers(&self) -> Result<HandlerSnapshot, CoordinatorError> {
        self.record("fetch_handlers");
        Ok(self.snapshot.clone())
    }

    async fn is_app_ready(&self) -> Result<Vec<SubsystemReadiness>, CoordinatorError> {
        self.record("is_app_ready");
        Ok(self.readiness.clone())
    }

    async fn is_forger_authorized(&self, ip: IpAddr) -> Result<bool, CoordinatorError> {
        self.record("is_forger_authorized");
        Ok(self.forger_whitelist.contains(&ip))
    }

    async fn accept_new_peer(
        &self,
        _ip: IpAddr,
        _headers: &PeerHeaders,
    ) -> Result<(), CoordinatorError> {
        self.record("accept_new_peer");
        Ok(())
    }

    async fn relay(&self, request: RpcRequest) -> Result<serde_json::Value, CoordinatorError> {
        self.record("relay");
        self.relayed.lock().push(request);
        Ok(self.relay_response.clone())
    }
}

/// In-process listener: connections are injected through a channel.
pub struct ChannelListener(pub mpsc::Receiver<PeerConnection>);

#[async_trait]
impl NetworkListener for ChannelListener {
    async fn next_connection(&mut self) -> Option<PeerConnection> {
        self.0.recv().await
    }
}

/// A driver for one injected connection.
pub struct PeerDriver {
    events: mpsc::Sender<InboundEvent>,
}

impl PeerDriver {
    /// Build a connection from `addr` and the driver that feeds it.
    pub fn connect(addr: &str, buffer: usize) -> (PeerConnection, Self) {
        let (tx, rx) = mpsc::channel(buffer);
        (
            PeerConnection {
                remote_addr: addr.parse().unwrap(),
                events: rx,
            },
            Self { events: tx },
        )
    }

    /// Emit an event and return the receiver for its reply.
    pub async fn emit(
        &self,
        event: &str,
        payload: serde_json::Value,
    ) -> oneshot::Receiver<SocketReply> {
        let (reply, rx) = oneshot::channel();
        self.events
            .send(InboundEvent {
                event: event.to_string(),
                data: payload,
                reply,
            })
            .await
            .unwrap();
        rx
    }
}

/// Well-formed payload with valid headers.
pub fn valid_payload() -> serde_json::Value {
    serde_json::json!({
        "data": {"height": 5544},
        "headers": {
            "version": "2.1.0",
            "port": "4002",
            "nethash": NETHASH,
        }
    })
}

/// Wire up a scripted coordinator, the service, and one connected peer.
pub fn harness(
    coordinator: ScriptedCoordinator,
    addr: &str,
) -> (Arc<ScriptedCoordinator>, PeerDriver) {
    let coordinator = Arc::new(coordinator);
    let (conn_tx, conn_rx) = mpsc::channel(4);
    let (conn, driver) = PeerDriver::connect(addr, 16);

    let service = socket_gateway::GatewayService::new(
        ChannelListener(conn_rx),
        Arc::clone(&coordinator) as Arc<dyn Coordinator>,
    );
    tokio::spawn(service.run());
    tokio::spawn(async move {
        conn_tx.send(conn).await.unwrap();
    });

    (coordinator, driver)
}
