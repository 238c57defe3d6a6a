//! Chat service HTTP routes

use axum::{
    Extension, Json, Router,
    extract::{Path, State},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    admin,
    error::{ApiError, ApiResult},
    middleware::{AuthUser, auth_middleware},
    realtime,
    repositories::AddFriendOutcome,
    state::AppState,
    validation::{validate_password, validate_username},
};

/// Request for user registration and login
#[derive(Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Response for user login
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// Request for adding a friend by display name
#[derive(Deserialize)]
pub struct AddFriendRequest {
    /// Display name of the user to befriend
    pub content: String,
}

/// Create the router for the chat service
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/info", get(info_route))
        .route("/friends", get(friends))
        .route("/add", post(add_friend))
        .route("/chat/history/:peer_id", get(chat_history))
        .merge(admin::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/friend_avatar/:id", get(friend_avatar))
        .route("/ws", get(realtime::gateway_ws))
        .merge(protected)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "chat-service"
    }))
}

/// Register a new account
///
/// The whole bootstrap (account, default friendship in both directions,
/// welcome message) either commits together or not at all.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    validate_username(&payload.username).map_err(ApiError::InvalidOperation)?;
    validate_password(&payload.password).map_err(ApiError::InvalidOperation)?;

    let user = state
        .users
        .register(
            &payload.username,
            &payload.password,
            state.default_friend_id,
            &state.bootstrap,
        )
        .await?;

    Ok(Json(json!({
        "message": format!("user {} registered", user.username),
    })))
}

/// Log in and receive a session token
///
/// An unknown username and a wrong password fail identically so callers
/// cannot enumerate accounts.
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<CredentialsRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_username(&payload.username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !state.users.verify_password(&user, &payload.password) {
        return Err(ApiError::Unauthorized);
    }

    let token = state.jwt.issue(&user).map_err(|e| {
        tracing::error!("Failed to issue token: {}", e);
        ApiError::Internal
    })?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse { token }))
}

/// Current user's basic profile, straight from the verified token
pub async fn info_route(Extension(user): Extension<AuthUser>) -> impl IntoResponse {
    Json(json!({
        "id": user.id,
        "name": user.name,
        "ava": user.avatar,
    }))
}

/// A user's avatar, by id
pub async fn friend_avatar(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("no user with id {id}")))?;

    Ok(Json(json!({ "ava": user.avatar_url })))
}

/// The caller's friend list
///
/// References that no longer resolve to a live account are dropped, never
/// reported as an error.
pub async fn friends(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> ApiResult<impl IntoResponse> {
    let friends = state.social.list_friends(user.id).await?;
    Ok(Json(friends))
}

/// Add a friend by display name
pub async fn add_friend(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddFriendRequest>,
) -> ApiResult<impl IntoResponse> {
    let outcome = state.social.add_friend(user.id, &payload.content).await?;

    let message = match outcome {
        AddFriendOutcome::Added => "friend added",
        AddFriendOutcome::AlreadyFriends => "already friends",
    };
    Ok(Json(json!({ "message": message })))
}

/// Direct-message history between the caller and a peer, oldest first
pub async fn chat_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(peer_id): Path<Uuid>,
) -> ApiResult<impl IntoResponse> {
    let messages = state.messages.conversation(user.id, peer_id).await?;
    Ok(Json(messages))
}
