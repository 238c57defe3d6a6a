//! User model and its read projections

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User entity
///
/// Deliberately not `Serialize`: the password hash must never travel on a
/// read path. Responses use [`UserSummary`] or [`FriendInfo`] instead.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// User projection for listings, without the credential
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub avatar_url: String,
    pub created_at: DateTime<Utc>,
}

/// Friend-list entry projection
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FriendInfo {
    pub id: Uuid,
    pub name: String,
    pub avatar: String,
}
