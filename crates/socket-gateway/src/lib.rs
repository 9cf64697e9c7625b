//! # Socket Gateway - Untrusted-Facing Worker
//!
//! Terminates inbound peer connections, rejects anything malformed or
//! unauthorized before it reaches the coordinator, and relays the rest as
//! request/response calls over the RPC bridge.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     GATEWAY WORKER                           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  NetworkListener (transport adapter, pluggable)              │
//! │         │ PeerConnection                                     │
//! │  ┌──────┴───────────────────────────────┐                    │
//! │  │ Connection Listener                  │                    │
//! │  │  fetch registry snapshot (fatal on   │                    │
//! │  │  failure), bind advertised events    │                    │
//! │  └──────┬───────────────────────────────┘                    │
//! │         │ bound events only                                  │
//! │  ┌──────┴───────────────────────────────┐                    │
//! │  │ Validation Middleware                │                    │
//! │  │  structural → namespace → headers →  │                    │
//! │  │  readiness → authorization/accept    │                    │
//! │  └──────┬───────────────────────────────┘                    │
//! │         │ stamped envelope                                   │
//! │  ┌──────┴───────────────────────────────┐                    │
//! │  │ Forwarder                            │                    │
//! │  │  (error, value) reply discipline     │                    │
//! │  └──────┬───────────────────────────────┘                    │
//! └─────────┼────────────────────────────────────────────────────┘
//!           │ RPC bridge (coordinator-rpc)
//!           ▼
//!     Coordinator process (chain state, peer table, forger whitelist)
//! ```
//!
//! ## Security
//!
//! - Every inbound event passes the ordered middleware checks; the first
//!   failure short-circuits with a taxonomy error.
//! - Unanticipated failures are remapped to `Unknown` with a fixed message;
//!   internal detail never reaches a network caller.
//! - Event names the coordinator does not advertise are never bound and
//!   produce no reply at all.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod adapters;
pub mod domain;
pub mod middleware;
pub mod ports;
pub mod service;

pub use domain::config::WorkerConfig;
pub use domain::endpoint::{EventName, Namespace};
pub use domain::error::{GatewayError, SocketError, SocketErrorKind};
pub use domain::registry::HandlerSnapshot;
pub use middleware::validation::ValidationMiddleware;
pub use ports::inbound::{InboundEvent, NetworkListener, PeerConnection, SocketReply};
pub use ports::outbound::{Coordinator, CoordinatorError};
pub use service::GatewayService;
