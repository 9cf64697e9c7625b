//! Gateway worker binary.
//!
//! Connects to the coordinator's RPC socket, binds the peer-facing
//! listener, and serves until interrupted. Configuration comes from
//! defaults with `FORGE_*` environment overrides.

use anyhow::Context;
use socket_gateway::adapters::{RpcCoordinator, TcpTransport};
use socket_gateway::{Coordinator, GatewayService, WorkerConfig};
use std::sync::Arc;
use tracing::{info, Level};

fn load_config() -> anyhow::Result<WorkerConfig> {
    let mut config = WorkerConfig::default();

    if let Ok(addr) = std::env::var("FORGE_LISTEN_ADDR") {
        config.listen_addr = addr
            .parse()
            .with_context(|| format!("invalid FORGE_LISTEN_ADDR: {addr}"))?;
    }
    if let Ok(path) = std::env::var("FORGE_COORDINATOR_SOCKET") {
        config.coordinator_socket = path;
    }
    if let Ok(size) = std::env::var("FORGE_EVENT_BUFFER") {
        config.event_buffer = size
            .parse()
            .with_context(|| format!("invalid FORGE_EVENT_BUFFER: {size}"))?;
    }

    config.validate().context("invalid configuration")?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .init();

    let config = load_config()?;
    info!(listen = %config.listen_addr, socket = %config.coordinator_socket, "Gateway worker starting");

    let (client, listener) = coordinator_rpc::transport::connect(&config.coordinator_socket)
        .await
        .with_context(|| {
            format!(
                "failed to connect to coordinator socket {}",
                config.coordinator_socket
            )
        })?;
    tokio::spawn(listener.run());

    let coordinator: Arc<dyn Coordinator> = Arc::new(RpcCoordinator::new(Arc::new(client)));

    let transport = TcpTransport::bind(
        config.listen_addr,
        config.event_buffer,
        config.max_frame_bytes,
    )
    .await
    .context("failed to bind peer listener")?;

    let service = GatewayService::new(transport, coordinator);
    let service_handle = tokio::spawn(service.run());

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
        _ = service_handle => {
            info!("Gateway service stopped");
        }
    }

    Ok(())
}
