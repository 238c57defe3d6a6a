//! Application state shared across handlers

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::BootstrapConfig;
use crate::jwt::JwtService;
use crate::realtime::registry::{ConnectionRegistry, RoomRegistry};
use crate::repositories::{MessageRepository, SocialRepository, UserRepository};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt: JwtService,
    pub users: UserRepository,
    pub social: SocialRepository,
    pub messages: MessageRepository,
    pub connections: ConnectionRegistry,
    pub rooms: RoomRegistry,
    /// Resolved id of the configured default friend account
    pub default_friend_id: Uuid,
    pub bootstrap: BootstrapConfig,
}
