//! Gateway service: the accept loop and per-connection dispatch.
//!
//! For each accepted connection the service fetches a fresh handler
//! snapshot, binds only the advertised event names, and drives every bound
//! event through validation and forwarding. Events outside the snapshot
//! are never dispatched and produce no reply.

use crate::domain::error::SocketError;
use crate::middleware::validation::ValidationMiddleware;
use crate::ports::inbound::{InboundEvent, NetworkListener, PeerConnection, SocketReply};
use crate::ports::outbound::{Coordinator, CoordinatorError};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// The worker's core loop, generic over transport.
pub struct GatewayService<L> {
    listener: L,
    coordinator: Arc<dyn Coordinator>,
}

impl<L: NetworkListener> GatewayService<L> {
    pub fn new(listener: L, coordinator: Arc<dyn Coordinator>) -> Self {
        Self {
            listener,
            coordinator,
        }
    }

    /// Accept connections until the listener shuts down.
    ///
    /// A failure on one connection never takes the loop down; the worker
    /// keeps serving everyone else.
    pub async fn run(mut self) {
        info!("Gateway service started");
        while let Some(conn) = self.listener.next_connection().await {
            let coordinator = Arc::clone(&self.coordinator);
            tokio::spawn(async move {
                handle_connection(conn, coordinator).await;
            });
        }
        info!("Listener closed, gateway service stopping");
    }
}

/// Serve one peer connection to completion.
async fn handle_connection(mut conn: PeerConnection, coordinator: Arc<dyn Coordinator>) {
    let remote_addr = conn.remote_addr;

    // Registry fetch is fatal to connection setup: with no snapshot there
    // is nothing to bind, so the connection is dropped without replies
    let snapshot = match coordinator.fetch_handlers().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(remote = %remote_addr, error = %e, "Handler registry fetch failed, dropping connection");
            return;
        }
    };
    let bound = snapshot.bound_events();
    debug!(remote = %remote_addr, bound = bound.len(), "Connection bound");

    let middleware = ValidationMiddleware::new(Arc::clone(&coordinator));

    while let Some(event) = conn.events.recv().await {
        if !bound.contains(&event.event) {
            // Unbound names are not an error surface; the reply channel
            // drops unanswered
            debug!(remote = %remote_addr, event = %event.event, "Ignoring unbound event");
            continue;
        }

        let middleware = middleware.clone();
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move {
            dispatch_event(remote_addr, event, middleware, coordinator).await;
        });
    }

    debug!(remote = %remote_addr, "Connection closed");
}

/// Validate and forward one bound event, then answer its reply channel.
async fn dispatch_event(
    remote_addr: IpAddr,
    event: InboundEvent,
    middleware: ValidationMiddleware,
    coordinator: Arc<dyn Coordinator>,
) {
    let reply = match middleware.inspect(remote_addr, &event.event, &event.data).await {
        Ok(envelope) => forward(&*coordinator, envelope).await,
        Err(socket_err) => SocketReply::err(socket_err.to_payload()),
    };

    // The peer may have hung up while the call was in flight
    let _ = event.reply.send(reply);
}

/// Relay the stamped envelope and translate the outcome into the
/// `(error, value)` reply shape.
async fn forward(coordinator: &dyn Coordinator, envelope: shared_types::RpcRequest) -> SocketReply {
    let endpoint = envelope.endpoint.clone();
    match coordinator.relay(envelope).await {
        Ok(value) => SocketReply::ok(value),
        Err(CoordinatorError::Reported(payload)) => SocketReply::err(payload),
        Err(e) => {
            error!(endpoint = %endpoint, error = %e, "Forwarding failed");
            SocketReply::err(SocketError::unknown().to_payload())
        }
    }
}
