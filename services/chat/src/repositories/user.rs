//! User repository: credential store and account bootstrap

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use chrono::Utc;
use rand::Rng;
use rand::distributions::Alphanumeric;
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;

use crate::config::BootstrapConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{User, UserSummary};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Register a new account
    ///
    /// All bootstrap effects commit in one transaction or none do: the user
    /// row, both directions of the friendship with the default friend, and
    /// the welcome message. A failure at any step rolls the whole
    /// registration back, so a partially-registered account is never
    /// observable.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
        default_friend_id: Uuid,
        bootstrap: &BootstrapConfig,
    ) -> ApiResult<User> {
        let mut tx = self.pool.begin().await?;

        let taken: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(ApiError::Conflict(format!(
                "username {username} is already taken"
            )));
        }

        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            password_hash: hash_password(password)?,
            avatar_url: bootstrap.default_avatar_url.clone(),
            created_at: Utc::now(),
        };

        // a concurrent register may slip past the SELECT above; the unique
        // constraint on username is the authoritative check
        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, avatar_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.password_hash)
        .bind(&user.avatar_url)
        .bind(user.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|err| {
            if err
                .as_database_error()
                .is_some_and(|e| e.is_unique_violation())
            {
                ApiError::Conflict(format!("username {username} is already taken"))
            } else {
                ApiError::from(err)
            }
        })?;

        // both halves of the symmetric relation in one statement
        sqlx::query(
            r#"
            INSERT INTO friendships (user_id, friend_id)
            VALUES ($1, $2), ($2, $1)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(user.id)
        .bind(default_friend_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, sent_at, content)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(default_friend_id)
        .bind(user.id)
        .bind(Utc::now())
        .bind(&bootstrap.welcome_message)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(user_id = %user.id, username, "registered new user");
        Ok(user)
    }

    /// Find a user by username
    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, avatar_url, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a user by ID
    pub async fn find_by_id(&self, id: Uuid) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password_hash, avatar_url, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// List every user, password hash excluded at the projection
    pub async fn list_all(&self) -> ApiResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, avatar_url, created_at
            FROM users
            ORDER BY created_at
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Verify a user's password
    ///
    /// Any failure (no match, unparseable stored hash) reads as a plain
    /// mismatch so callers cannot distinguish failure causes.
    pub fn verify_password(&self, user: &User, password: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(&user.password_hash) else {
            error!(user_id = %user.id, "stored password hash is unparseable");
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }

    /// Make sure the configured default friend account exists
    ///
    /// The register bootstrap links every new account to this one, so it is
    /// seeded at startup if missing, with a random credential nobody can
    /// log in with.
    pub async fn ensure_default_friend(&self, bootstrap: &BootstrapConfig) -> ApiResult<Uuid> {
        if let Some(user) = self
            .find_by_username(&bootstrap.default_friend_username)
            .await?
        {
            return Ok(user.id);
        }

        let throwaway: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(32)
            .map(char::from)
            .collect();

        sqlx::query(
            r#"
            INSERT INTO users (id, username, password_hash, avatar_url, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&bootstrap.default_friend_username)
        .bind(hash_password(&throwaway)?)
        .bind(&bootstrap.default_avatar_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let user = self
            .find_by_username(&bootstrap.default_friend_username)
            .await?
            .ok_or(ApiError::Internal)?;

        info!(user_id = %user.id, username = %user.username, "seeded default friend account");
        Ok(user.id)
    }
}

/// Hash a password with argon2 and a fresh random salt
pub(crate) fn hash_password(password: &str) -> ApiResult<String> {
    let salt = SaltString::generate(&mut rand::thread_rng());
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            ApiError::Internal
        })?
        .to_string();

    Ok(hash)
}
