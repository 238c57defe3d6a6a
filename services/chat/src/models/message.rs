//! Direct message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A direct message between two user ids
///
/// Immutable once written. The endpoints are weak references: no existence
/// check is made at write time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "from")]
    pub sender_id: Uuid,
    #[serde(rename = "to")]
    pub recipient_id: Uuid,
    #[serde(rename = "time")]
    pub sent_at: DateTime<Utc>,
    pub content: String,
}
