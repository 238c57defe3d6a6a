//! Admin routes: user listing and account deletion
//!
//! Both routes sit behind the auth middleware, so some verified identity is
//! always present. Deletion cascades: the account row goes first, then one
//! set-based sweep removes the id from every remaining friend list.

use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Request for deleting a user by id
#[derive(Deserialize)]
pub struct DeleteUserRequest {
    #[serde(rename = "uID")]
    pub user_id: Option<Uuid>,
}

/// Admin routes, mounted inside the authenticated router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/admin/getUsers", get(get_users))
        .route("/admin/delUsers", post(del_users))
}

/// List every user, password hashes excluded
pub async fn get_users(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let users = state.users.list_all().await?;

    Ok(Json(json!({
        "message": "user list fetched",
        "users": users,
    })))
}

/// Delete a user and sweep it from every friend list
pub async fn del_users(
    State(state): State<AppState>,
    Json(payload): Json<DeleteUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user_id = payload
        .user_id
        .ok_or_else(|| ApiError::InvalidOperation("uID is required".to_string()))?;

    // every registration bootstraps against this account
    if user_id == state.default_friend_id {
        return Err(ApiError::InvalidOperation(
            "the default friend account cannot be deleted".to_string(),
        ));
    }

    let deleted = state.social.remove_user(user_id).await?;

    info!(%user_id, username = %deleted.username, "user deleted by admin");
    Ok(Json(json!({
        "message": format!("user {} ({}) deleted", deleted.username, user_id),
        "deletedUser": deleted,
    })))
}
