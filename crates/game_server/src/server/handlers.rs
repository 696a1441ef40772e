//! Connection handling logic for WebSocket clients.
//!
//! This module contains the core connection handling logic that manages
//! the lifecycle of individual client connections, including WebSocket
//! handshaking, message processing, and cleanup.

use crate::{
    connection::{ConnectionRegistry, Session, SessionState},
    dispatch::Dispatcher,
    error::ServerError,
};
use futures_util::{SinkExt, StreamExt};
use outpost_protocol::SessionId;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, trace};

/// Handles a single client connection from establishment to cleanup.
///
/// # Connection Flow
///
/// 1. Perform the WebSocket handshake (bounded by the handshake timeout)
/// 2. Register a fresh session with the connection registry
/// 3. Drive the incoming loop: each text frame is dispatched to completion
///    before the next is read, which preserves per-session message ordering
/// 4. Drain the session's bounded outbound channel to the socket concurrently
/// 5. Remove the session from the registry exactly once on the way out
///
/// # Arguments
///
/// * `stream` - The TCP stream for the client connection
/// * `addr` - The remote address of the client
/// * `connections` - Registry tracking all live sessions
/// * `dispatcher` - Shared dispatcher for inbound frames
/// * `handshake_timeout_secs` - Seconds allowed for the WebSocket handshake
/// * `outbound_buffer` - Capacity of the per-session outbound channel
///
/// # Returns
///
/// `Ok(())` once the connection is fully cleaned up, or `ServerError::Network`
/// if the handshake failed or timed out.
pub async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    connections: Arc<ConnectionRegistry>,
    dispatcher: Arc<Dispatcher>,
    handshake_timeout_secs: u64,
    outbound_buffer: usize,
) -> Result<(), ServerError> {
    let ws_stream = timeout(Duration::from_secs(handshake_timeout_secs), accept_async(stream))
        .await
        .map_err(|_| ServerError::Network(format!("WebSocket handshake with {addr} timed out")))?
        .map_err(|e| ServerError::Network(format!("WebSocket handshake failed: {e}")))?;

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(outbound_buffer);
    let session = Arc::new(Session::new(SessionId::new(), addr, outbound_tx));
    let session_id = session.id();
    connections.add(session.clone()).await;

    // Incoming task: dispatches one frame at a time for this session.
    let incoming_task = {
        let dispatcher = dispatcher.clone();
        let session = session.clone();
        async move {
            while let Some(msg) = ws_receiver.next().await {
                match msg {
                    Ok(Message::Text(text)) => {
                        dispatcher.dispatch(&session, &text).await;
                        // quit/logout mark the session Disconnected; stop
                        // reading instead of waiting for the peer to hang up.
                        if session.state() == SessionState::Disconnected {
                            break;
                        }
                    }
                    Ok(Message::Close(_)) => {
                        debug!("🔌 Session {session_id} requested close");
                        break;
                    }
                    Ok(_) => {
                        // Binary and ping/pong control frames carry no
                        // commands; tungstenite answers pings on its own.
                        trace!("🔌 Ignoring non-text frame from session {session_id}");
                    }
                    Err(e) => {
                        debug!("🔌 WebSocket error for session {session_id}: {e}");
                        break;
                    }
                }
            }
        }
    };

    // Outgoing task: drains the bounded channel into the socket.
    let outgoing_task = async move {
        while let Some(frame) = outbound_rx.recv().await {
            if let Err(e) = ws_sender.send(Message::Text(frame.into())).await {
                debug!("🔌 Failed to send frame to session {session_id}: {e}");
                break;
            }
        }
        let _ = ws_sender.close().await;
    };

    // Run both tasks concurrently until one completes
    tokio::select! {
        _ = incoming_task => {},
        _ = outgoing_task => {},
    }

    // Idempotent: a quit command may already have removed the session.
    connections.remove(session_id).await;
    Ok(())
}
