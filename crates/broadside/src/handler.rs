//! Per-connection handler: identity, message routing, cleanup.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Create a session → send `id`
//!   2. Spawn the writer task that owns all outbound frames
//!   3. Loop: receive frames → decode → dispatch
//!   4. On EOF or transport failure, leave the room and drop the session

use std::sync::Arc;

use broadside_protocol::{
    ClientMessage, Codec, PlayerId, RoomType, ServerMessage,
};
use broadside_room::{PlayerSender, RoomError, RoomHandle};
use broadside_transport::{Connection, TcpConnection, TransportError};
use tokio::sync::mpsc;

use crate::BroadsideError;
use crate::server::ServerState;

/// Sent when a join targets a room that is missing or has no free seat.
pub const UNJOINABLE_ROOM_MSG: &str = "room full or does not exist";

/// Drop guard that takes the player out of their room and removes their
/// session when the handler exits.
///
/// Cleanup runs even if the handler bails out early with an error. Since
/// `Drop` is synchronous, the async part runs in a spawned task.
struct SessionGuard<C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<C>>,
}

impl<C: Codec> Drop for SessionGuard<C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let left = state.rooms.lock().await.leave_room(player_id).await;
            if let Ok(room_id) = left {
                tracing::info!(%player_id, %room_id, "left room on disconnect");
            }
            let _ = state.sessions.lock().await.remove(player_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: TcpConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), BroadsideError> {
    let conn = Arc::new(conn);
    let conn_id = conn.id();
    let peer = conn.peer_addr();

    let player_id = state.sessions.lock().await.create(peer)?.player_id;
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };
    tracing::info!(%conn_id, %player_id, %peer, "player connected");

    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(write_loop(Arc::clone(&conn), Arc::clone(&state), rx));
    let _ = tx.send(ServerMessage::Id { player_id });

    // The room this player sits in. Gameplay commands go straight to it
    // without locking the registry.
    let mut room: Option<RoomHandle> = None;

    loop {
        let data = match conn.recv().await {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%conn_id, %player_id, "connection closed");
                break;
            }
            Err(e @ TransportError::FrameTooLarge { .. }) => {
                tracing::warn!(%conn_id, %player_id, error = %e, "dropping connection");
                break;
            }
            Err(e) => {
                tracing::debug!(%conn_id, %player_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(
                    %player_id, error = %e, "dropping malformed frame"
                );
                continue;
            }
        };

        dispatch(&state, player_id, &tx, &mut room, msg).await;
    }

    // _guard drops here → room leave and session removal fire.
    Ok(())
}

/// Applies one client message.
async fn dispatch<C: Codec>(
    state: &ServerState<C>,
    player_id: PlayerId,
    tx: &PlayerSender,
    room: &mut Option<RoomHandle>,
    msg: ClientMessage,
) {
    match msg {
        ClientMessage::CreateRoom => {
            let result = state
                .rooms
                .lock()
                .await
                .create_room(RoomType::Private, player_id, tx.clone())
                .await;
            seat(tx, room, result);
        }

        ClientMessage::JoinRoom { room_id } => {
            let result = state
                .rooms
                .lock()
                .await
                .join_room(player_id, &room_id, tx.clone())
                .await;
            seat(tx, room, result);
        }

        ClientMessage::RandomMatch => {
            let result = state
                .rooms
                .lock()
                .await
                .random_match(player_id, tx.clone())
                .await;
            seat(tx, room, result);
        }

        ClientMessage::Ready { ships } => {
            let Some(handle) = room.as_ref() else {
                tracing::debug!(%player_id, "ready outside a room, ignoring");
                return;
            };
            if let Err(e) = handle.ready(player_id, ships).await {
                tracing::debug!(%player_id, error = %e, "ready not delivered");
            }
        }

        ClientMessage::Fire { x, y } => {
            let Some(handle) = room.as_ref() else {
                tracing::debug!(%player_id, "fire outside a room, ignoring");
                return;
            };
            if let Err(e) = handle.fire(player_id, x, y).await {
                tracing::debug!(%player_id, error = %e, "fire not delivered");
            }
        }

        ClientMessage::LeaveRoom => {
            let result = state.rooms.lock().await.leave_room(player_id).await;
            match result {
                Ok(room_id) => {
                    tracing::info!(%player_id, %room_id, "left room");
                }
                Err(e) => {
                    tracing::debug!(%player_id, error = %e, "leave room failed");
                }
            }
            *room = None;
        }
    }
}

/// Caches the handle of a room the player just sat down in, or reports
/// why they couldn't.
fn seat(
    tx: &PlayerSender,
    room: &mut Option<RoomHandle>,
    result: Result<RoomHandle, RoomError>,
) {
    match result {
        Ok(handle) => *room = Some(handle),
        Err(e) => {
            let msg = if e.is_unjoinable() {
                UNJOINABLE_ROOM_MSG.to_string()
            } else {
                e.to_string()
            };
            let _ = tx.send(ServerMessage::Error { msg });
        }
    }
}

/// Drains a player's outbound queue onto the socket, one frame per
/// message, in queue order.
///
/// Write failures are only logged: a dead peer is noticed by the reader,
/// which then runs cleanup. The task ends once every sender is gone.
async fn write_loop<C: Codec>(
    conn: Arc<TcpConnection>,
    state: Arc<ServerState<C>>,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
) {
    let conn_id = conn.id();

    while let Some(msg) = rx.recv().await {
        let bytes = match state.codec.encode(&msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "encode failed");
                continue;
            }
        };
        if let Err(e) = conn.send(&bytes).await {
            tracing::debug!(%conn_id, error = %e, "send failed");
        }
    }
}
