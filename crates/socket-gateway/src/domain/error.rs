//! Error taxonomy surfaced to network callers, plus internal errors.
//!
//! Every validation failure maps to one of the [`SocketErrorKind`] kinds
//! and is written to the caller's reply channel; none of them terminates
//! the worker. Anything unanticipated becomes `Unknown` with a fixed
//! message so internal detail never leaks to an untrusted peer.

use shared_types::RpcErrorPayload;

/// The six error kinds a network caller can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SocketErrorKind {
    HeadersRequired,
    WrongEndpoint,
    HeadersValidationFailed,
    AppNotReady,
    ForgerNotAuthorized,
    Unknown,
}

impl SocketErrorKind {
    /// Wire name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            SocketErrorKind::HeadersRequired => "HeadersRequired",
            SocketErrorKind::WrongEndpoint => "WrongEndpoint",
            SocketErrorKind::HeadersValidationFailed => "HeadersValidationFailed",
            SocketErrorKind::AppNotReady => "AppNotReady",
            SocketErrorKind::ForgerNotAuthorized => "ForgerNotAuthorized",
            SocketErrorKind::Unknown => "Unknown",
        }
    }
}

/// A validation failure surfaced to the caller.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{}: {}", .kind.name(), .message)]
pub struct SocketError {
    pub kind: SocketErrorKind,
    pub message: String,
}

impl SocketError {
    /// Request is missing `data` or `data.headers`.
    pub fn headers_required() -> Self {
        Self {
            kind: SocketErrorKind::HeadersRequired,
            message: "Request data and data.headers is mandatory".to_string(),
        }
    }

    /// Event name is not `p2p.<version>.<method>`.
    pub fn wrong_endpoint(event: &str) -> Self {
        Self {
            kind: SocketErrorKind::WrongEndpoint,
            message: format!("Wrong endpoint : {event}"),
        }
    }

    /// Header schema violations, aggregated into one message.
    pub fn headers_validation_failed(violations: &[String]) -> Self {
        Self {
            kind: SocketErrorKind::HeadersValidationFailed,
            message: format!("Headers validation failed: {}", violations.join(", ")),
        }
    }

    /// A subsystem reported not ready.
    pub fn app_not_ready(subsystem: &str) -> Self {
        Self {
            kind: SocketErrorKind::AppNotReady,
            message: format!("Application is not ready : {subsystem} is not ready"),
        }
    }

    /// Internal namespace caller is not a whitelisted forger.
    pub fn forger_not_authorized() -> Self {
        Self {
            kind: SocketErrorKind::ForgerNotAuthorized,
            message: "Not authorized: internal endpoint is only available for whitelisted forger"
                .to_string(),
        }
    }

    /// Catch-all with a fixed, non-leaking message.
    pub fn unknown() -> Self {
        Self {
            kind: SocketErrorKind::Unknown,
            message: "Unknown error".to_string(),
        }
    }

    /// Wire form for the reply's error slot.
    pub fn to_payload(&self) -> RpcErrorPayload {
        RpcErrorPayload::named(self.kind.name(), self.message.clone())
    }
}

/// Internal gateway errors, never shown to network callers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
    /// Listener socket bind error.
    #[error("listener bind error: {0}")]
    Bind(String),
    /// Handler registry fetch failed during connection setup.
    #[error("registry fetch failed: {0}")]
    RegistryFetch(String),
    /// Transport-level failure on an established connection.
    #[error("transport error: {0}")]
    Transport(String),
}
