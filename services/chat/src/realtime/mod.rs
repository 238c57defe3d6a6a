//! Realtime gateway
//!
//! One long-lived WebSocket per client. The gateway itself only handles the
//! connection lifecycle and composes the two sub-protocol handlers (private
//! messaging and rooms) over the shared connection; it contains no routing
//! logic of its own. Events on a connection are processed in the order
//! received. A handler fault drops the offending event and keeps the
//! connection; only a transport failure ends it.

pub mod event;
mod private;
pub mod registry;
mod room;

use axum::{
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::HeaderMap,
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::realtime::event::{ClientEvent, ServerEvent};
use crate::state::AppState;

/// Outbound queue depth per connection
const OUTBOUND_QUEUE: usize = 256;

/// Handshake query parameters
#[derive(Deserialize)]
pub struct GatewayAuthQuery {
    pub token: Option<String>,
}

/// Per-connection context shared with the sub-protocol handlers
pub(crate) struct ConnectionContext {
    pub conn_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub outbound: mpsc::Sender<String>,
}

/// Gateway endpoint: authenticate the handshake, then upgrade
///
/// The token is taken from the `token` query parameter or the bearer
/// header. An unverifiable token rejects the handshake before any upgrade
/// happens.
pub async fn gateway_ws(
    State(state): State<AppState>,
    Query(query): Query<GatewayAuthQuery>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, ApiError> {
    let token = query
        .token
        .or_else(|| bearer_token(&headers))
        .ok_or(ApiError::Unauthorized)?;

    let claims = state.jwt.verify(&token).map_err(|e| {
        debug!("Gateway handshake rejected: {}", e);
        ApiError::Unauthorized
    })?;

    Ok(ws.on_upgrade(move |socket| handle_connection(state, socket, claims.sub, claims.name)))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

async fn handle_connection(state: AppState, socket: WebSocket, user_id: Uuid, name: String) {
    let conn_id = Uuid::new_v4();
    let (mut sink, mut stream) = socket.split();

    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);
    state
        .connections
        .register(conn_id, user_id, outbound_tx.clone())
        .await;
    info!(%conn_id, %user_id, "gateway connection established");

    let _ = outbound_tx.send(ServerEvent::Ready { user_id }.to_json()).await;

    let send_task = tokio::spawn(async move {
        while let Some(payload) = outbound_rx.recv().await {
            if sink.send(Message::Text(payload)).await.is_err() {
                break;
            }
        }
    });

    let ctx = ConnectionContext {
        conn_id,
        user_id,
        name,
        outbound: outbound_tx,
    };

    while let Some(incoming) = stream.next().await {
        let Ok(message) = incoming else {
            break;
        };

        let text = match message {
            Message::Text(text) => text,
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => continue,
        };

        let event = match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => event,
            Err(e) => {
                debug!(%conn_id, error = %e, "dropping malformed event");
                continue;
            }
        };

        let result = match event {
            ClientEvent::PrivateMessage { to, content } => {
                private::send(&state, &ctx, to, content).await
            }
            ClientEvent::JoinRoom { room } => room::join(&state, &ctx, room).await,
            ClientEvent::LeaveRoom { room } => room::leave(&state, &ctx, room).await,
            ClientEvent::RoomMessage { room, content } => {
                room::broadcast(&state, &ctx, room, content).await
            }
        };

        if let Err(e) = result {
            warn!(%conn_id, error = %e, "event handler failed; event dropped");
        }
    }

    // cleanup runs no matter which side ended the session
    state.rooms.leave_all(conn_id).await;
    state.connections.unregister(conn_id).await;
    send_task.abort();
    info!(%conn_id, %user_id, "gateway connection closed");
}
