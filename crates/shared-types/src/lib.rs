//! # Shared Types - Wire-Level Contracts
//!
//! Types exchanged between the gateway worker and the coordinator process.
//! Both sides of the RPC conduit depend on this crate and nothing else in
//! the workspace, so the wire contract has a single source of truth.
//!
//! ## Contents
//!
//! - [`RpcRequest`] - the request envelope (`endpoint`, `data`, `headers`)
//! - [`PeerHeaders`] - string headers carried by every validated request
//! - [`RpcErrorPayload`] - the error half of an `(error, value)` outcome
//! - [`SubsystemReadiness`] - one entry of the coordinator readiness report
//! - [`BlockData`] - opaque block unit handed to the rebuild queue

#![warn(clippy::all)]
#![deny(unsafe_code)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod block;
pub mod envelope;
pub mod readiness;

pub use block::BlockData;
pub use envelope::{PeerHeaders, RpcErrorPayload, RpcRequest, REMOTE_ADDRESS_KEY};
pub use readiness::SubsystemReadiness;
