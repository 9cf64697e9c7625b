//! # Coordinator RPC - Callback-to-Awaitable Bridge
//!
//! Turns a message-passing call into the coordinator process into a single
//! awaitable outcome: exactly one of (response value, error) per invocation.
//! No retries, no deduplication, no caching across calls.
//!
//! ## Flow
//!
//! ```text
//! RpcClient::call(request)
//!     │ register()          PendingCallStore (correlation id → oneshot)
//!     │ send()              RpcSender (shared conduit to coordinator)
//!     │ await rx ─────────────────────────────┐
//!     │                                       │
//! ResponseListener::run()                     │
//!     │ receive()           RpcReceiver       │
//!     └ complete(id, outcome) ────────────────┘
//! ```
//!
//! ## No timeout
//!
//! A non-responding coordinator suspends the caller indefinitely. This is
//! observed behavior of the surrounding system and is preserved here; the
//! store carries no TTL sweep and `call` wraps no timer.

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod client;
pub mod correlation;
pub mod pending;
pub mod transport;

pub use client::{
    channel, RpcCall, RpcClient, RpcError, RpcOutcome, RpcReceiver, RpcResponse, RpcSender,
    ResponseListener,
};
pub use correlation::CorrelationId;
pub use pending::{CallOutcome, PendingCallStore, PendingStats};
