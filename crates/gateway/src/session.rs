//! Per-connection session: join validation, the inbound event loop, and
//! departure handling.
//!
//! Each accepted WebSocket gets one session task (this module) and one write
//! loop forwarding serialized frames from an unbounded channel to the socket
//! sink. The session moves through connecting → joined → closed; a
//! connection that fails admission is rejected and never registered.

use std::sync::Arc;

use {
    axum::extract::ws::{Message, WebSocket},
    futures::{SinkExt, StreamExt, stream::SplitSink},
    tokio::{sync::mpsc, task::JoinHandle},
    tracing::{debug, info, trace, warn},
    uuid::Uuid,
};

use {
    huddle_protocol::{ClientEvent, ServerEvent, decode_client_event},
    huddle_rooms::{OutboundSender, RoomMember},
};

use crate::{broadcast, state::GatewayState};

// ── Join request ─────────────────────────────────────────────────────────────

/// Join parameters extracted from the upgrade request's query string.
#[derive(Debug, Clone)]
pub struct JoinRequest {
    pub display_name: String,
    pub room_name: String,
}

impl JoinRequest {
    /// Build from raw `name` / `room` query params. Both are trimmed; a
    /// missing or blank name falls back to "Anonymous". A missing room stays
    /// blank here and is refused at join time.
    pub fn from_params(name: Option<&str>, room: Option<&str>) -> Self {
        let display_name = name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Anonymous")
            .to_string();
        let room_name = room.map(str::trim).unwrap_or_default().to_string();
        Self {
            display_name,
            room_name,
        }
    }
}

// ── Session lifecycle ────────────────────────────────────────────────────────

/// Drive one WebSocket connection from accept to close.
pub async fn handle_connection(socket: WebSocket, state: Arc<GatewayState>, join: JoinRequest) {
    let session_id = Uuid::new_v4().to_string();
    let (ws_tx, mut ws_rx) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel::<String>();
    let writer = tokio::spawn(write_loop(ws_tx, rx));

    if join.room_name.is_empty() {
        debug!(session_id, "join rejected: no room requested");
        reject(tx, writer).await;
        return;
    }

    // Admission and the join announcement happen under one lock acquisition,
    // so two racing joins cannot both take the last slot or reorder their
    // announcements.
    let admitted = {
        let mut rooms = state.rooms.write().await;
        let member = RoomMember::new(session_id.clone(), join.display_name.clone(), tx.clone());
        if rooms.join(&join.room_name, member) {
            broadcast::to_room(
                &rooms,
                &join.room_name,
                &ServerEvent::UpdateParticipants {
                    participants: rooms.participants(&join.room_name),
                    notice: Some(format!("{} joined the room", join.display_name)),
                },
            );
            true
        } else {
            false
        }
    };

    if !admitted {
        info!(session_id, room = %join.room_name, "join rejected: room full");
        reject(tx, writer).await;
        return;
    }

    broadcast::to_sender(
        &tx,
        &ServerEvent::Welcome {
            id: session_id.clone(),
            notice: format!("Welcome to {}", join.room_name),
        },
    );
    info!(session_id, room = %join.room_name, name = %join.display_name, "session joined");

    // Inbound loop: one frame at a time until the transport goes away or the
    // client asks to leave.
    while let Some(message) = ws_rx.next().await {
        match message {
            Ok(Message::Text(text)) => match decode_client_event(text.as_str()) {
                Ok(Some(event)) => {
                    if handle_event(&state, &session_id, &join, &tx, event).await == Flow::Close {
                        break;
                    }
                },
                Ok(None) => trace!(session_id, "ignoring unrecognized action"),
                Err(error) => {
                    // A protocol violation is fatal for this connection only:
                    // close without relaying anything.
                    warn!(session_id, %error, "closing session on malformed frame");
                    break;
                },
            },
            Ok(Message::Close(_)) => break,
            Ok(Message::Binary(_)) => warn!(session_id, "ignoring binary frame"),
            Ok(Message::Ping(_) | Message::Pong(_)) => {},
            Err(error) => {
                debug!(session_id, %error, "transport error");
                break;
            },
        }
    }

    // Departure runs exactly once per joined session, whatever ended the
    // loop. The announcement uses the post-removal snapshot and the original
    // room name; when the leave emptied (and deleted) the room it reaches
    // zero recipients.
    {
        let mut rooms = state.rooms.write().await;
        rooms.leave(&join.room_name, &session_id);
        broadcast::to_room(
            &rooms,
            &join.room_name,
            &ServerEvent::UpdateParticipants {
                participants: rooms.participants(&join.room_name),
                notice: Some(format!("{} left the room", join.display_name)),
            },
        );
    }
    drop(tx);
    let _ = writer.await;
    info!(session_id, room = %join.room_name, "session closed");
}

#[derive(Debug, PartialEq)]
enum Flow {
    Continue,
    Close,
}

async fn handle_event(
    state: &GatewayState,
    session_id: &str,
    join: &JoinRequest,
    tx: &OutboundSender,
    event: ClientEvent,
) -> Flow {
    match event {
        ClientEvent::Moving { location } => {
            let mut rooms = state.rooms.write().await;
            rooms.update_location(&join.room_name, session_id, location);
            broadcast::to_room(
                &rooms,
                &join.room_name,
                &ServerEvent::UpdateParticipants {
                    participants: rooms.participants(&join.room_name),
                    notice: None,
                },
            );
            Flow::Continue
        },
        ClientEvent::Typing => {
            let rooms = state.rooms.read().await;
            broadcast::to_room(
                &rooms,
                &join.room_name,
                &ServerEvent::DisplayClientAction {
                    notice: format!("{} is typing a message", join.display_name),
                },
            );
            Flow::Continue
        },
        ClientEvent::Messaging { message } => {
            let rooms = state.rooms.read().await;
            broadcast::to_room(
                &rooms,
                &join.room_name,
                &ServerEvent::DisplayClientMessage {
                    // Empty text rides the same false sentinel as absent text.
                    message: message.filter(|text| !text.is_empty()),
                    notice: None,
                },
            );
            Flow::Continue
        },
        ClientEvent::Disconnecting => {
            broadcast::to_sender(
                tx,
                &ServerEvent::Goodbye {
                    notice: format!("Left {}", join.room_name),
                },
            );
            Flow::Close
        },
    }
}

/// Forward serialized frames to the socket until the channel drains, then
/// close the sink.
async fn write_loop(
    mut ws_tx: SplitSink<WebSocket, Message>,
    mut rx: mpsc::UnboundedReceiver<String>,
) {
    while let Some(frame) = rx.recv().await {
        if ws_tx.send(Message::Text(frame.into())).await.is_err() {
            break;
        }
    }
    let _ = ws_tx.close().await;
}

/// Reject path: FORBIDDEN, then close. The session is never registered in
/// any room.
async fn reject(tx: OutboundSender, writer: JoinHandle<()>) {
    broadcast::to_sender(
        &tx,
        &ServerEvent::Forbidden {
            notice: "Could not join".into(),
        },
    );
    drop(tx);
    let _ = writer.await;
}
