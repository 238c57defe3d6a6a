//! Chat service schema bootstrap
//!
//! The schema is created idempotently at startup. The friend relation is a
//! `friendships` table holding one row per direction, so the symmetric
//! relation is stored redundantly on both sides: set-insert is
//! `ON CONFLICT DO NOTHING` and removing every reference to a deleted
//! account is a single set-based `DELETE`. There are deliberately no
//! foreign keys: friend and message endpoints are weak references, and the
//! deletion sweep is responsible for cleanup.

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        avatar_url TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS friendships (
        user_id UUID NOT NULL,
        friend_id UUID NOT NULL,
        PRIMARY KEY (user_id, friend_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS messages (
        id UUID PRIMARY KEY,
        sender_id UUID NOT NULL,
        recipient_id UUID NOT NULL,
        sent_at TIMESTAMPTZ NOT NULL,
        content TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS messages_conversation_idx
        ON messages (sender_id, recipient_id, sent_at)
    "#,
];

/// Create the chat service tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }

    info!("Database schema is up to date");
    Ok(())
}
