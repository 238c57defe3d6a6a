//! Message repository: append-only direct message store

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::ApiResult;
use crate::models::Message;

/// Message repository
#[derive(Clone)]
pub struct MessageRepository {
    pool: PgPool,
}

impl MessageRepository {
    /// Create a new message repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persist a direct message
    ///
    /// No existence check is made on either endpoint; the timestamp is set
    /// here and the row is never mutated afterwards.
    pub async fn append(&self, from: Uuid, to: Uuid, content: &str) -> ApiResult<Message> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id: from,
            recipient_id: to,
            sent_at: Utc::now(),
            content: content.to_string(),
        };

        sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, recipient_id, sent_at, content)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(message.id)
        .bind(message.sender_id)
        .bind(message.recipient_id)
        .bind(message.sent_at)
        .bind(&message.content)
        .execute(&self.pool)
        .await?;

        Ok(message)
    }

    /// Direct-message history between two users, oldest first
    pub async fn conversation(&self, a: Uuid, b: Uuid) -> ApiResult<Vec<Message>> {
        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, sender_id, recipient_id, sent_at, content
            FROM messages
            WHERE (sender_id = $1 AND recipient_id = $2)
               OR (sender_id = $2 AND recipient_id = $1)
            ORDER BY sent_at
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(messages)
    }
}
