//! Private-message sub-protocol
//!
//! Owns the direct-message event: validates the payload, persists it via
//! the message store, then relays to the recipient's live connections.
//! Delivery is best effort; an offline recipient only gets what
//! persistence provides.

use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::realtime::ConnectionContext;
use crate::realtime::event::ServerEvent;
use crate::state::AppState;

/// Maximum accepted message payload
pub const MAX_MESSAGE_BYTES: usize = 4096;

/// Handle a direct-message event from a connection
pub(crate) async fn send(
    state: &AppState,
    ctx: &ConnectionContext,
    to: Uuid,
    content: String,
) -> ApiResult<()> {
    if content.is_empty() {
        return Err(ApiError::InvalidOperation(
            "message content is empty".to_string(),
        ));
    }
    if content.len() > MAX_MESSAGE_BYTES {
        return Err(ApiError::InvalidOperation(
            "message content too large".to_string(),
        ));
    }

    let message = state.messages.append(ctx.user_id, to, &content).await?;

    let payload = ServerEvent::PrivateMessage {
        id: message.id,
        from: message.sender_id,
        to: message.recipient_id,
        time: message.sent_at,
        content: message.content,
    }
    .to_json();

    let delivered = state.connections.send_to_user(to, &payload).await;

    // echo to the sender's other devices, not the originating connection
    if to != ctx.user_id {
        state
            .connections
            .send_to_user_except(ctx.user_id, ctx.conn_id, &payload)
            .await;
    }

    debug!(message_id = %message.id, %to, delivered, "direct message persisted and relayed");

    Ok(())
}
