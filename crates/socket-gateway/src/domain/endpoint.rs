//! Event name parsing: `p2p.<version>.<method>`.

use std::fmt;

/// Prefix every routable event name must carry.
pub const EVENT_PREFIX: &str = "p2p";

/// The two routable namespaces.
///
/// `internal` endpoints are reserved for whitelisted forgers; `peer`
/// endpoints are open to any peer that passes validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Peer,
    Internal,
}

impl Namespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            Namespace::Peer => "peer",
            Namespace::Internal => "internal",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Event name that does not split into `p2p.<version>.<method>`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("wrong endpoint : {0}")]
pub struct InvalidEventName(pub String);

/// A parsed, routable event name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventName {
    pub namespace: Namespace,
    pub method: String,
}

impl EventName {
    /// Parse an event name.
    ///
    /// Accepts exactly three dot-separated segments with the `p2p` prefix
    /// and a known namespace; anything else is rejected.
    pub fn parse(event: &str) -> Result<Self, InvalidEventName> {
        let mut segments = event.split('.');
        let (prefix, version, method) = match (
            segments.next(),
            segments.next(),
            segments.next(),
            segments.next(),
        ) {
            (Some(prefix), Some(version), Some(method), None) => (prefix, version, method),
            _ => return Err(InvalidEventName(event.to_string())),
        };

        if prefix != EVENT_PREFIX || method.is_empty() {
            return Err(InvalidEventName(event.to_string()));
        }

        let namespace = match version {
            "peer" => Namespace::Peer,
            "internal" => Namespace::Internal,
            _ => return Err(InvalidEventName(event.to_string())),
        };

        Ok(Self {
            namespace,
            method: method.to_string(),
        })
    }

    /// The full wire form, `p2p.<version>.<method>`.
    pub fn full(&self) -> String {
        format!("{}.{}.{}", EVENT_PREFIX, self.namespace, self.method)
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", EVENT_PREFIX, self.namespace, self.method)
    }
}
