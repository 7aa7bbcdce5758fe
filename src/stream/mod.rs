pub mod handshake;
pub mod message;
pub mod session;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, FromRequestParts, Request, State};
use axum::response::{IntoResponse, Response};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::config::StreamConfig;
pub use message::{Message, MessageKind};
pub use session::{CloseReason, Session, SessionState, SessionSummary};

/// Turns eligible requests into echo sessions. Built once at startup and
/// shared read-only by every connection.
#[derive(Debug, Clone, Default)]
pub struct Upgrader {
    max_message_size: Option<usize>,
    max_frame_size: Option<usize>,
}

impl Upgrader {
    pub fn new(config: &StreamConfig) -> Self {
        Self {
            max_message_size: config.max_message_size,
            max_frame_size: config.max_frame_size,
        }
    }

    /// Unset limits keep the transport defaults.
    fn configure(&self, mut ws: WebSocketUpgrade) -> WebSocketUpgrade {
        if let Some(size) = self.max_message_size {
            ws = ws.max_message_size(size);
        }
        if let Some(size) = self.max_frame_size {
            ws = ws.max_frame_size(size);
        }
        ws
    }
}

/// Handler for the stream path. Answers the handshake and hands the upgraded
/// connection to its own session task; a rejected handshake never opens one.
pub async fn handle(
    State(upgrader): State<Arc<Upgrader>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    req: Request,
) -> Response {
    if let Err(e) = handshake::check(&req) {
        warn!("upgrade from {} rejected: {}", peer, e);
        return handshake::reject(&e);
    }

    let (mut parts, _body) = req.into_parts();
    let ws = match WebSocketUpgrade::from_request_parts(&mut parts, &()).await {
        Ok(ws) => ws,
        Err(rejection) => {
            warn!("upgrade from {} rejected: {}", peer, rejection.body_text());
            return rejection.into_response();
        }
    };

    upgrader
        .configure(ws)
        .on_failed_upgrade(move |e| {
            warn!("upgrade from {} failed: {}", peer, e);
        })
        .on_upgrade(move |socket| async move {
            let summary = Session::open(socket, peer).run().await;
            debug!(
                "Session {} finished after {} messages",
                peer, summary.messages
            );
        })
}
