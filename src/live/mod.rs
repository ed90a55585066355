pub mod events;
pub mod heartbeat;
pub mod registry;
pub mod session;

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::state::AppState;
use events::{close_code, JoinRequest, SessionState};
use session::MemberHandle;

/// Why a connection never made it into a session.
#[derive(Debug)]
pub enum HandshakeError {
    Timeout,
    Closed,
    Transport(String),
    Malformed(String),
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::Timeout => write!(f, "no join message before timeout"),
            HandshakeError::Closed => write!(f, "connection closed before joining"),
            HandshakeError::Transport(e) => write!(f, "transport error before joining: {e}"),
            HandshakeError::Malformed(e) => write!(f, "malformed join message: {e}"),
        }
    }
}

impl HandshakeError {
    fn close_frame(&self) -> Option<CloseFrame> {
        let (code, reason) = match self {
            HandshakeError::Timeout => (close_code::JOIN_TIMED_OUT, "join timed out"),
            HandshakeError::Malformed(_) => (close_code::DECODE_ERROR, "invalid join message"),
            HandshakeError::Closed | HandshakeError::Transport(_) => return None,
        };
        Some(CloseFrame {
            code,
            reason: Utf8Bytes::from_static(reason),
        })
    }
}

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut ws_sink, mut ws_stream) = socket.split();

    let join = match wait_for_join(&mut ws_stream, state.join_timeout).await {
        Ok(join) => join,
        Err(e) => {
            tracing::warn!("live handshake failed: {e}");
            if let Some(frame) = e.close_frame() {
                send(&mut ws_sink, Message::Close(Some(frame)), state.heartbeat.timeout).await;
            }
            return;
        }
    };

    // Broadcasts for this member are queued here by the registry and written
    // out by this task only.
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let member = MemberHandle::new(tx);
    let member_id = member.id;
    let session_id = join.sid.clone();

    let current = state
        .live
        .join_or_create(&session_id, join.proposed_state(), member);

    let write_timeout = state.heartbeat.timeout;
    match serde_json::to_string(&current) {
        Ok(ack) => {
            if !send(&mut ws_sink, Message::Text(ack.into()), write_timeout).await {
                state.live.leave(&session_id, member_id);
                return;
            }
        }
        Err(e) => {
            tracing::error!(%session_id, "failed to encode join acknowledgement: {e}");
            state.live.leave(&session_id, member_id);
            return;
        }
    }

    let mut last_seen = Instant::now();
    let mut heartbeat = tokio::time::interval_at(
        Instant::now() + state.heartbeat.interval,
        state.heartbeat.interval,
    );

    loop {
        tokio::select! {
            Some(text) = rx.recv() => {
                if !send(&mut ws_sink, Message::Text(text.into()), write_timeout).await {
                    tracing::debug!(%session_id, %member_id, "live socket write failed");
                    break;
                }
            }
            _ = heartbeat.tick() => {
                if last_seen.elapsed() > state.heartbeat.timeout {
                    tracing::info!(%session_id, %member_id, "live member timed out");
                    break;
                }
                if !send(&mut ws_sink, Message::Ping(Default::default()), write_timeout).await {
                    tracing::debug!(%session_id, %member_id, "live socket ping failed");
                    break;
                }
            }
            msg = ws_stream.next() => {
                last_seen = Instant::now();
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(%session_id, %member_id, "live socket read failed: {e}");
                        break;
                    }
                    Some(Ok(msg)) => match decode::<SessionState>(&msg) {
                        Some(Ok(update)) => {
                            if let Some(broadcast) = state.live.publish(&session_id, update) {
                                tracing::debug!(
                                    %session_id,
                                    %member_id,
                                    recipients = broadcast.member_count(),
                                    failed = broadcast.failed.len(),
                                    "published live update"
                                );
                            }
                        }
                        Some(Err(e)) => {
                            tracing::warn!(%session_id, %member_id, "ignoring malformed update: {e}");
                        }
                        None => {}
                    },
                }
            }
        }
    }

    state.live.leave(&session_id, member_id);
}

/// Write one frame, giving up after `limit`. Returns false if the peer is gone
/// or too slow.
async fn send(
    sink: &mut SplitSink<WebSocket, Message>,
    msg: Message,
    limit: Duration,
) -> bool {
    matches!(tokio::time::timeout(limit, sink.send(msg)).await, Ok(Ok(())))
}

/// Wait for the first data frame and decode it as a join request.
async fn wait_for_join(
    stream: &mut SplitStream<WebSocket>,
    timeout: Duration,
) -> Result<JoinRequest, HandshakeError> {
    let read = async {
        loop {
            match stream.next().await {
                Some(Ok(Message::Close(_))) | None => return Err(HandshakeError::Closed),
                Some(Err(e)) => return Err(HandshakeError::Transport(e.to_string())),
                Some(Ok(msg)) => {
                    if let Some(decoded) = decode::<JoinRequest>(&msg) {
                        return decoded.map_err(|e| HandshakeError::Malformed(e.to_string()));
                    }
                }
            }
        }
    };

    tokio::time::timeout(timeout, read)
        .await
        .map_err(|_| HandshakeError::Timeout)?
}

/// Decode a data frame as JSON. Control frames yield None.
fn decode<T: DeserializeOwned>(msg: &Message) -> Option<Result<T, serde_json::Error>> {
    match msg {
        Message::Text(text) => Some(serde_json::from_str(text.as_str())),
        Message::Binary(bytes) => Some(serde_json::from_slice(bytes)),
        _ => None,
    }
}
