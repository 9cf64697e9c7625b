//! Unix-socket conduit to an out-of-process coordinator.
//!
//! Calls and responses are newline-delimited JSON over a single stream.
//! Writes are serialized behind a lock; responses are matched back to
//! callers by correlation ID, so ordering on the wire does not matter.

use crate::client::{ResponseListener, RpcCall, RpcClient, RpcError, RpcReceiver, RpcResponse, RpcSender};
use crate::pending::PendingCallStore;
use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixStream;
use tokio::sync::Mutex;
use tracing::info;

/// Sending half: one JSON line per call.
pub struct StreamSender(Mutex<OwnedWriteHalf>);

#[async_trait]
impl RpcSender for StreamSender {
    async fn send(&self, call: RpcCall) -> Result<(), RpcError> {
        let mut frame =
            serde_json::to_string(&call).map_err(|e| RpcError::Codec(e.to_string()))?;
        frame.push('\n');

        let mut half = self.0.lock().await;
        half.write_all(frame.as_bytes())
            .await
            .map_err(|e| RpcError::SendFailed(e.to_string()))
    }
}

/// Receiving half: one JSON line per response.
pub struct StreamReceiver(Mutex<BufReader<OwnedReadHalf>>);

#[async_trait]
impl RpcReceiver for StreamReceiver {
    async fn receive(&self) -> Result<RpcResponse, RpcError> {
        let mut reader = self.0.lock().await;
        let mut line = String::new();
        match reader.read_line(&mut line).await {
            Ok(0) => Err(RpcError::ConduitClosed),
            Ok(_) => serde_json::from_str(line.trim())
                .map_err(|e| RpcError::Codec(e.to_string())),
            // Stream errors are unrecoverable for a byte-oriented conduit
            Err(_) => Err(RpcError::ConduitClosed),
        }
    }
}

/// Connect to the coordinator's socket and wire up the bridge.
///
/// Returns the client and the listener; spawn the listener's `run` before
/// issuing calls.
pub async fn connect(path: impl AsRef<Path>) -> std::io::Result<(RpcClient, ResponseListener)> {
    let stream = UnixStream::connect(path.as_ref()).await?;
    info!(path = %path.as_ref().display(), "Connected to coordinator socket");

    let (read_half, write_half) = stream.into_split();
    let pending = Arc::new(PendingCallStore::new());
    let client = RpcClient::new(
        Arc::clone(&pending),
        Arc::new(StreamSender(Mutex::new(write_half))),
    );
    let listener = ResponseListener::new(
        pending,
        Arc::new(StreamReceiver(Mutex::new(BufReader::new(read_half)))),
    );

    Ok((client, listener))
}
