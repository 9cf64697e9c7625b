//! Request envelope and header map.
//!
//! Every message the gateway relays to the coordinator is an [`RpcRequest`]:
//! `{ endpoint, data, headers }`. The endpoint is namespaced as
//! `p2p.<version>.<method>`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Header key stamped by the gateway after validation succeeds.
///
/// Invariant: every envelope that reaches the coordinator carries this key
/// with the originating socket's remote IP.
pub const REMOTE_ADDRESS_KEY: &str = "remoteAddress";

/// String headers attached to a request by the remote peer.
///
/// The gateway validates these against the header schema and stamps
/// `remoteAddress` before forwarding. Keys the gateway does not know about
/// are carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerHeaders(BTreeMap<String, String>);

impl PeerHeaders {
    /// Create an empty header map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a header value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Insert a header, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Stamp the originating socket's address into the headers.
    pub fn set_remote_address(&mut self, addr: IpAddr) {
        self.0.insert(REMOTE_ADDRESS_KEY.to_string(), addr.to_string());
    }

    /// The stamped remote address, if validation has run.
    pub fn remote_address(&self) -> Option<&str> {
        self.get(REMOTE_ADDRESS_KEY)
    }

    /// Iterate over all header entries.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of headers.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PeerHeaders {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Request envelope sent from the gateway to the coordinator.
///
/// The same shape is used for utility queries (`p2p.utils.*`) and for
/// forwarded peer traffic (`p2p.peer.*` / `p2p.internal.*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcRequest {
    /// Namespaced endpoint, `p2p.<version>.<method>`.
    pub endpoint: String,
    /// Request body. `Null` when the endpoint takes no arguments.
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub data: serde_json::Value,
    /// Peer headers, present on forwarded traffic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<PeerHeaders>,
}

impl RpcRequest {
    /// Envelope with no body, for utility queries.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            data: serde_json::Value::Null,
            headers: None,
        }
    }

    /// Attach a request body.
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = data;
        self
    }

    /// Attach peer headers.
    pub fn with_headers(mut self, headers: PeerHeaders) -> Self {
        self.headers = Some(headers);
        self
    }
}

/// Error half of a coordinator `(error, value)` outcome.
///
/// Carries whatever the coordinator reported; the gateway never fabricates
/// detail here beyond its own taxonomy names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RpcErrorPayload {
    /// Error kind name, when the reporting side assigned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable message.
    pub message: String,
    /// Structured detail, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl RpcErrorPayload {
    /// Payload with a message only.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            name: None,
            message: message.into(),
            data: None,
        }
    }

    /// Payload with a kind name and message.
    pub fn named(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            message: message.into(),
            data: None,
        }
    }
}

impl std::fmt::Display for RpcErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}: {}", name, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}
