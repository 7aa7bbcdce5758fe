use axum::extract::ws::{CloseCode, Message as Frame};
use futures::{Sink, SinkExt, Stream, StreamExt};
use std::net::SocketAddr;
use tokio_tungstenite::tungstenite;
use tracing::{debug, info, warn};

use super::message::Inbound;
use crate::error::{SessionError, transport_error};

/// A session only exists once the upgrade succeeded. A failed upgrade never
/// constructs one, so there is no opening state to observe here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Open,
    Closed,
}

#[derive(Debug)]
pub enum CloseReason {
    /// Close frame or clean end of stream from the client.
    PeerClosed(Option<CloseCode>),
    Failed(SessionError),
}

#[derive(Debug)]
pub struct SessionSummary {
    pub reason: CloseReason,
    pub messages: u64,
    pub bytes: u64,
}

/// One upgraded connection, owned by a single task from open to close.
pub struct Session<W> {
    ws: W,
    peer: SocketAddr,
    state: SessionState,
    messages: u64,
    bytes: u64,
}

impl<W> Session<W>
where
    W: Stream<Item = Result<Frame, axum::Error>> + Sink<Frame, Error = axum::Error> + Unpin,
{
    pub fn open(ws: W, peer: SocketAddr) -> Self {
        debug!("Session {} OPEN", peer);
        Self {
            ws,
            peer,
            state: SessionState::Open,
            messages: 0,
            bytes: 0,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Reads one message at a time and writes it straight back until the
    /// first read or write failure, then tears the channel down.
    pub async fn run(mut self) -> SessionSummary {
        let reason = loop {
            let frame = match self.ws.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => break read_failure(e),
                None => break CloseReason::PeerClosed(None),
            };

            match Inbound::from(frame) {
                Inbound::Data(message) => {
                    let len = message.len();
                    debug!("recv from {}: {} bytes ({})", self.peer, len, message.kind());

                    if let Err(e) = self.ws.send(message.into_frame()).await {
                        break CloseReason::Failed(SessionError::Write(e));
                    }
                    self.messages += 1;
                    self.bytes += len as u64;
                }
                Inbound::Control => continue,
                Inbound::Close(frame) => break CloseReason::PeerClosed(frame.map(|f| f.code)),
            }
        };

        self.teardown(&reason).await;

        SessionSummary {
            reason,
            messages: self.messages,
            bytes: self.bytes,
        }
    }

    async fn teardown(&mut self, reason: &CloseReason) {
        match reason {
            CloseReason::PeerClosed(code) => info!(
                "Session {} closed by peer ({:?}). Echoed {} messages, {} bytes",
                self.peer, code, self.messages, self.bytes
            ),
            CloseReason::Failed(e) if e.is_disconnect() => info!(
                "Session {} dropped by peer: {}. Echoed {} messages, {} bytes",
                self.peer, e, self.messages, self.bytes
            ),
            CloseReason::Failed(e) => warn!(
                "Session {} ended: {}. Echoed {} messages, {} bytes",
                self.peer, e, self.messages, self.bytes
            ),
        }

        // Completes our half of the close handshake, or flushes the reply
        // already queued for a peer close. Errors just mean the socket is gone.
        if let Err(e) = self.ws.close().await {
            debug!("Session {} close: {}", self.peer, e);
        }
        self.state = SessionState::Closed;
        debug!("Session {} OPEN -> CLOSED", self.peer);
    }
}

impl<W> Drop for Session<W> {
    fn drop(&mut self) {
        if self.state != SessionState::Closed {
            // Task cancelled mid-loop; dropping the stream releases the socket.
            debug!("Session {} dropped while open", self.peer);
        }
    }
}

fn read_failure(e: axum::Error) -> CloseReason {
    match transport_error(&e) {
        Some(tungstenite::Error::ConnectionClosed) => CloseReason::PeerClosed(None),
        _ => CloseReason::Failed(SessionError::Read(e)),
    }
}
