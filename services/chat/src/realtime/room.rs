//! Room sub-protocol
//!
//! Owns the join/leave/broadcast events. Room state lives only in the
//! room registry; nothing here touches the message store.

use chrono::Utc;
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::realtime::ConnectionContext;
use crate::realtime::event::ServerEvent;
use crate::state::AppState;

/// Maximum accepted room name length
pub const MAX_ROOM_NAME_CHARS: usize = 128;

fn validate_room(room: &str) -> ApiResult<()> {
    if room.trim().is_empty() || room.chars().count() > MAX_ROOM_NAME_CHARS {
        return Err(ApiError::InvalidOperation("invalid room name".to_string()));
    }
    Ok(())
}

/// Subscribe the connection to a room
pub(crate) async fn join(state: &AppState, ctx: &ConnectionContext, room: String) -> ApiResult<()> {
    validate_room(&room)?;

    state
        .rooms
        .join(&room, ctx.conn_id, ctx.outbound.clone())
        .await;

    let ack = ServerEvent::Joined { room: room.clone() }.to_json();
    let _ = ctx.outbound.send(ack).await;

    debug!(conn_id = %ctx.conn_id, room, "joined room");
    Ok(())
}

/// Unsubscribe the connection from a room
pub(crate) async fn leave(state: &AppState, ctx: &ConnectionContext, room: String) -> ApiResult<()> {
    validate_room(&room)?;

    state.rooms.leave(&room, ctx.conn_id).await;

    let ack = ServerEvent::Left { room: room.clone() }.to_json();
    let _ = ctx.outbound.send(ack).await;

    debug!(conn_id = %ctx.conn_id, room, "left room");
    Ok(())
}

/// Broadcast a message to a room's subscribers
pub(crate) async fn broadcast(
    state: &AppState,
    ctx: &ConnectionContext,
    room: String,
    content: String,
) -> ApiResult<()> {
    validate_room(&room)?;

    if content.is_empty() {
        return Err(ApiError::InvalidOperation(
            "message content is empty".to_string(),
        ));
    }

    if !state.rooms.is_member(&room, ctx.conn_id).await {
        return Err(ApiError::InvalidOperation(format!(
            "not subscribed to room {room}"
        )));
    }

    let payload = ServerEvent::RoomMessage {
        room: room.clone(),
        from: ctx.user_id,
        name: ctx.name.clone(),
        time: Utc::now(),
        content,
    }
    .to_json();

    let delivered = state.rooms.broadcast(&room, &payload).await;
    debug!(conn_id = %ctx.conn_id, room, delivered, "room message broadcast");

    Ok(())
}
