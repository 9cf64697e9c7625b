//! The ordered validation pipeline.
//!
//! Checks run in a fixed order and the first failure short-circuits: no
//! later check runs and no forwarding happens. Order:
//!
//! 1. structural  - payload carries `headers`
//! 2. namespace   - event splits into `p2p.<version>.<method>`
//! 3. headers     - schema validation, violations aggregated
//! 4. readiness   - every coordinator subsystem must be ready
//! 5. namespaced  - `internal`: forger whitelist gate;
//!                  `peer`: peer-acceptance side effect (not a gate)
//!
//! On success the envelope is stamped with the socket's remote address.
//! Anything unanticipated is remapped to `Unknown` here, at the boundary.

use crate::domain::endpoint::{EventName, Namespace};
use crate::domain::error::SocketError;
use crate::middleware::headers::validate_headers;
use crate::ports::outbound::{Coordinator, CoordinatorError};
use shared_types::{PeerHeaders, RpcRequest};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Middleware over a single coordinator handle.
///
/// Holds no per-request state; every request's state lives in its own
/// envelope, so one instance serves any number of concurrent validations.
#[derive(Clone)]
pub struct ValidationMiddleware {
    coordinator: Arc<dyn Coordinator>,
}

impl ValidationMiddleware {
    pub fn new(coordinator: Arc<dyn Coordinator>) -> Self {
        Self { coordinator }
    }

    /// Run the ordered checks over one inbound event.
    ///
    /// Returns the stamped envelope ready for forwarding, or the taxonomy
    /// error to write back to the caller.
    pub async fn inspect(
        &self,
        remote_addr: IpAddr,
        event: &str,
        payload: &serde_json::Value,
    ) -> Result<RpcRequest, SocketError> {
        debug!(remote = %remote_addr, event = event, "Received message");

        // 1. Structural: payload and payload.headers are mandatory
        let Some(body) = payload.as_object() else {
            return Err(SocketError::headers_required());
        };
        let Some(raw_headers) = body.get("headers").filter(|v| v.is_object()) else {
            return Err(SocketError::headers_required());
        };

        // 2. Namespace: exactly p2p.<version>.<method>
        let name = EventName::parse(event).map_err(|_| SocketError::wrong_endpoint(event))?;

        // 3. Header schema
        let mut headers: PeerHeaders = serde_json::from_value(raw_headers.clone())
            .map_err(|_| {
                SocketError::headers_validation_failed(&[
                    "headers values must be strings".to_string()
                ])
            })?;
        let violations = validate_headers(&headers);
        if !violations.is_empty() {
            return Err(SocketError::headers_validation_failed(&violations));
        }

        // 4. Readiness: fail on the first not-ready subsystem, in the
        //    order the coordinator returned them
        let readiness = self
            .coordinator
            .is_app_ready()
            .await
            .map_err(unknown_boundary)?;
        if let Some(not_ready) = readiness.iter().find(|entry| !entry.ready) {
            return Err(SocketError::app_not_ready(&not_ready.name));
        }

        // 5. Namespace-specific
        match name.namespace {
            Namespace::Internal => {
                let authorized = self
                    .coordinator
                    .is_forger_authorized(remote_addr)
                    .await
                    .map_err(unknown_boundary)?;
                if !authorized {
                    return Err(SocketError::forger_not_authorized());
                }
            }
            Namespace::Peer => {
                // Side effect, not a gate: a failed acceptance call does
                // not block forwarding
                if let Err(e) = self.coordinator.accept_new_peer(remote_addr, &headers).await {
                    warn!(remote = %remote_addr, error = %e, "Peer acceptance call failed");
                }
            }
        }

        // 6. Stamp the socket address; some coordinator handlers need it
        headers.set_remote_address(remote_addr);

        let data = body
            .get("data")
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        Ok(RpcRequest::new(name.full())
            .with_data(data)
            .with_headers(headers))
    }
}

/// Remap an unanticipated coordinator failure to the fixed `Unknown`
/// error; the detail is logged server-side only.
fn unknown_boundary(e: CoordinatorError) -> SocketError {
    error!(error = %e, "Unexpected error during validation");
    SocketError::unknown()
}
