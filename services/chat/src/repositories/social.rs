//! Social graph repository
//!
//! Maintains the symmetric friend relation and performs the cascading
//! cleanup when an account is deleted. Every mutation here is idempotent,
//! so any of them can be retried without a surrounding transaction.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::{FriendInfo, UserSummary};

/// Result of an add-friend request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddFriendOutcome {
    /// The relation was created in both directions
    Added,
    /// The relation already existed; nothing changed
    AlreadyFriends,
}

/// Social graph repository
#[derive(Clone)]
pub struct SocialRepository {
    pool: PgPool,
}

impl SocialRepository {
    /// Create a new social graph repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a mutual friendship between the requester and the named user
    ///
    /// Both halves of the relation are inserted by a single statement, so
    /// symmetry holds afterwards no matter the pre-existing state. Repeating
    /// the call is a no-op.
    pub async fn add_friend(
        &self,
        requester_id: Uuid,
        target_name: &str,
    ) -> ApiResult<AddFriendOutcome> {
        let target: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(target_name)
            .fetch_optional(&self.pool)
            .await?;
        let Some((target_id,)) = target else {
            return Err(ApiError::NotFound(format!("no user named {target_name}")));
        };

        if target_id == requester_id {
            return Err(ApiError::InvalidOperation(
                "cannot add yourself as a friend".to_string(),
            ));
        }

        let existing: Option<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM friendships WHERE user_id = $1 AND friend_id = $2",
        )
        .bind(requester_id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;
        if existing.is_some() {
            return Ok(AddFriendOutcome::AlreadyFriends);
        }

        sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2), ($2, $1)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(requester_id)
        .bind(target_id)
        .execute(&self.pool)
        .await?;

        info!(%requester_id, %target_id, "friendship created");
        Ok(AddFriendOutcome::Added)
    }

    /// Delete an account and sweep it out of every friend list
    ///
    /// The target row is deleted first, then one set-based statement removes
    /// every friendship row referencing it. The sweep is idempotent: a crash
    /// between the two steps leaves dangling references that the next run
    /// repairs.
    pub async fn remove_user(&self, user_id: Uuid) -> ApiResult<UserSummary> {
        let deleted = sqlx::query_as::<_, UserSummary>(
            r#"
            DELETE FROM users
            WHERE id = $1
            RETURNING id, username, avatar_url, created_at
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(deleted) = deleted else {
            return Err(ApiError::NotFound(format!("no user with id {user_id}")));
        };

        self.sweep_references(user_id).await?;

        info!(%user_id, username = %deleted.username, "user deleted and swept from friend lists");
        Ok(deleted)
    }

    /// Remove every friendship row referencing the given user id
    pub async fn sweep_references(&self, user_id: Uuid) -> ApiResult<u64> {
        let result = sqlx::query("DELETE FROM friendships WHERE user_id = $1 OR friend_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Resolve the caller's friend list
    ///
    /// The join drops any reference that no longer resolves to a live user,
    /// so a partially-swept graph never surfaces as an error.
    pub async fn list_friends(&self, user_id: Uuid) -> ApiResult<Vec<FriendInfo>> {
        let friends = sqlx::query_as::<_, FriendInfo>(
            r#"
            SELECT u.id, u.username AS name, u.avatar_url AS avatar
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1
            ORDER BY u.username
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }
}
