//! Worker configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Gateway worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Address the peer-facing listener binds.
    pub listen_addr: SocketAddr,
    /// Buffer size of each connection's inbound event channel.
    pub event_buffer: usize,
    /// Maximum accepted wire frame, in bytes. Oversized frames close the
    /// connection.
    pub max_frame_bytes: usize,
    /// Path of the coordinator's RPC socket.
    pub coordinator_socket: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 4002),
            event_buffer: 64,
            max_frame_bytes: 1024 * 1024,
            coordinator_socket: "/run/forgenet/coordinator.sock".to_string(),
        }
    }
}

impl WorkerConfig {
    /// Validate configuration before the worker starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_buffer == 0 {
            return Err(ConfigError::InvalidBuffer(
                "event_buffer cannot be 0".into(),
            ));
        }
        if self.max_frame_bytes == 0 {
            return Err(ConfigError::InvalidLimit(
                "max_frame_bytes cannot be 0".into(),
            ));
        }
        if self.coordinator_socket.is_empty() {
            return Err(ConfigError::MissingCoordinatorSocket);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid buffer size: {0}")]
    InvalidBuffer(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("coordinator socket path is not set")]
    MissingCoordinatorSocket,
}
