//! TCP transport adapter.
//!
//! Frames are newline-delimited JSON. Inbound:
//! `{"seq": n, "event": "p2p.peer.getStatus", "data": {...}}`. Replies
//! echo the `seq` with the `(error, value)` slots:
//! `{"seq": n, "error": ..., "data": ...}`. Events the gateway never binds
//! get no reply line at all.

use crate::domain::error::GatewayError;
use crate::ports::inbound::{InboundEvent, NetworkListener, PeerConnection, SocketReply};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// One inbound frame.
#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(default)]
    seq: u64,
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

/// One reply frame.
#[derive(Debug, Serialize)]
struct WireReply {
    seq: u64,
    #[serde(flatten)]
    reply: SocketReply,
}

/// Peer-facing TCP listener implementing the [`NetworkListener`] port.
pub struct TcpTransport {
    listener: TcpListener,
    event_buffer: usize,
    max_frame_bytes: usize,
}

impl TcpTransport {
    /// Bind the peer-facing listener.
    pub async fn bind(
        addr: SocketAddr,
        event_buffer: usize,
        max_frame_bytes: usize,
    ) -> Result<Self, GatewayError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "Peer listener bound");
        Ok(Self {
            listener,
            event_buffer,
            max_frame_bytes,
        })
    }

    /// The bound address (useful when binding port 0).
    pub fn local_addr(&self) -> Result<SocketAddr, GatewayError> {
        self.listener
            .local_addr()
            .map_err(|e| GatewayError::Transport(e.to_string()))
    }
}

#[async_trait]
impl NetworkListener for TcpTransport {
    async fn next_connection(&mut self) -> Option<PeerConnection> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(peer = %peer, "Accepted connection");
                    let (read_half, write_half) = stream.into_split();
                    let (event_tx, event_rx) = mpsc::channel(self.event_buffer);
                    let (reply_tx, reply_rx) = mpsc::channel(self.event_buffer);

                    tokio::spawn(write_loop(write_half, reply_rx));
                    tokio::spawn(read_loop(
                        read_half,
                        peer,
                        event_tx,
                        reply_tx,
                        self.max_frame_bytes,
                    ));

                    return Some(PeerConnection {
                        remote_addr: peer.ip(),
                        events: event_rx,
                    });
                }
                Err(e) => {
                    // Transient accept failure; keep listening
                    warn!(error = %e, "Accept failed");
                }
            }
        }
    }
}

/// Outcome of reading one frame off the socket.
enum Frame {
    /// A complete line, newline stripped.
    Complete(Vec<u8>),
    /// The accumulated bytes passed the cap before a newline arrived.
    Oversized,
    /// Peer closed the stream.
    Closed,
}

/// Read up to the next newline, aborting as soon as the accumulated
/// frame exceeds `max_frame_bytes`.
///
/// The cap is enforced while buffering, not after: a peer streaming
/// bytes with no newline cannot grow the frame past the limit.
async fn next_frame<R>(reader: &mut R, max_frame_bytes: usize) -> std::io::Result<Frame>
where
    R: AsyncBufRead + Unpin,
{
    let mut frame = Vec::new();
    loop {
        let (consumed, complete) = {
            let available = reader.fill_buf().await?;
            if available.is_empty() {
                return Ok(Frame::Closed);
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(pos) => {
                    frame.extend_from_slice(&available[..pos]);
                    (pos + 1, true)
                }
                None => {
                    frame.extend_from_slice(available);
                    (available.len(), false)
                }
            }
        };
        reader.consume(consumed);

        if frame.len() > max_frame_bytes {
            return Ok(Frame::Oversized);
        }
        if complete {
            return Ok(Frame::Complete(frame));
        }
    }
}

/// Parse inbound frames into events until the peer hangs up.
async fn read_loop(
    read_half: OwnedReadHalf,
    peer: SocketAddr,
    event_tx: mpsc::Sender<InboundEvent>,
    reply_tx: mpsc::Sender<String>,
    max_frame_bytes: usize,
) {
    let mut reader = BufReader::new(read_half);

    loop {
        let line = match next_frame(&mut reader, max_frame_bytes).await {
            Ok(Frame::Complete(line)) => line,
            Ok(Frame::Closed) => break, // peer closed
            Ok(Frame::Oversized) => {
                warn!(peer = %peer, "Oversized frame, closing connection");
                break;
            }
            Err(e) => {
                debug!(peer = %peer, error = %e, "Read error, closing connection");
                break;
            }
        };

        let Ok(text) = std::str::from_utf8(&line) else {
            warn!(peer = %peer, "Non-UTF-8 frame, dropped");
            continue;
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            continue;
        }

        let frame: WireEvent = match serde_json::from_str(trimmed) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(peer = %peer, error = %e, "Malformed frame, dropped");
                continue;
            }
        };

        let (reply, reply_rx) = oneshot::channel();
        let event = InboundEvent {
            event: frame.event,
            data: frame.data,
            reply,
        };

        // Each reply is written as soon as its event resolves; a dropped
        // reply sender produces no line at all
        let reply_tx = reply_tx.clone();
        let seq = frame.seq;
        tokio::spawn(async move {
            if let Ok(reply) = reply_rx.await {
                if let Ok(frame) = serde_json::to_string(&WireReply { seq, reply }) {
                    let _ = reply_tx.send(frame).await;
                }
            }
        });

        if event_tx.send(event).await.is_err() {
            // Gateway dropped the connection (e.g. registry fetch failed)
            break;
        }
    }
}

/// Drain reply frames onto the socket.
async fn write_loop(mut write_half: OwnedWriteHalf, mut reply_rx: mpsc::Receiver<String>) {
    while let Some(mut frame) = reply_rx.recv().await {
        frame.push('\n');
        if write_half.write_all(frame.as_bytes()).await.is_err() {
            break;
        }
    }
}
