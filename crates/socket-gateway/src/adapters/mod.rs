//! Adapters: concrete implementations of the gateway's ports.

pub mod coordinator;
pub mod tcp;

pub use coordinator::RpcCoordinator;
pub use tcp::TcpTransport;
