use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use chat::config::{BootstrapConfig, ServerConfig};
use chat::jwt::{JwtConfig, JwtService};
use chat::realtime::registry::{ConnectionRegistry, RoomRegistry};
use chat::repositories::{MessageRepository, SocialRepository, UserRepository};
use chat::state::AppState;
use chat::{database, routes};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting chat service");

    // Initialize database connection pool
    let db_config = common::database::DatabaseConfig::from_env()?;
    let pool = common::database::init_pool(&db_config).await?;

    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::ensure_schema(&pool).await?;

    let server_config = ServerConfig::from_env();
    let bootstrap = BootstrapConfig::from_env();
    let jwt = JwtService::new(JwtConfig::from_env()?);

    let users = UserRepository::new(pool.clone());
    let default_friend_id = users
        .ensure_default_friend(&bootstrap)
        .await
        .map_err(|e| anyhow::anyhow!("failed to seed default friend: {e}"))?;
    info!(%default_friend_id, "default friend account ready");

    let app_state = AppState {
        db_pool: pool.clone(),
        jwt,
        users,
        social: SocialRepository::new(pool.clone()),
        messages: MessageRepository::new(pool),
        connections: ConnectionRegistry::new(),
        rooms: RoomRegistry::new(),
        default_friend_id,
        bootstrap,
    };

    let app = routes::create_router(app_state);

    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    info!("Chat service listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
