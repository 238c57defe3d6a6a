//! Service configuration loaded from environment variables

use std::env;

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the server binds to
    pub bind_addr: String,
}

impl ServerConfig {
    /// Create a new ServerConfig from environment variables
    ///
    /// # Environment Variables
    /// - `SERVER_ADDR`: bind address (default: `0.0.0.0:3000`)
    pub fn from_env() -> Self {
        let bind_addr = env::var("SERVER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        ServerConfig { bind_addr }
    }
}

/// Account bootstrap configuration
///
/// Every new account is linked to a configured default friend and receives
/// one welcome message from it. The default friend is injected here rather
/// than hardcoded so deployments can point it at any account.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Username of the account every new user is befriended with
    pub default_friend_username: String,
    /// Avatar assigned to accounts that do not pick one
    pub default_avatar_url: String,
    /// Content of the welcome message sent on registration
    pub welcome_message: String,
}

impl BootstrapConfig {
    /// Create a new BootstrapConfig from environment variables
    ///
    /// # Environment Variables
    /// - `DEFAULT_FRIEND_USERNAME`: default friend account name (default: `assistant`)
    /// - `DEFAULT_AVATAR_URL`: placeholder avatar URL (default: `/assets/default-avatar.png`)
    /// - `WELCOME_MESSAGE`: welcome message content
    pub fn from_env() -> Self {
        let default_friend_username =
            env::var("DEFAULT_FRIEND_USERNAME").unwrap_or_else(|_| "assistant".to_string());

        let default_avatar_url = env::var("DEFAULT_AVATAR_URL")
            .unwrap_or_else(|_| "/assets/default-avatar.png".to_string());

        let welcome_message = env::var("WELCOME_MESSAGE").unwrap_or_else(|_| {
            "Welcome to the chat! I'm your first friend. Send me a message to try things out."
                .to_string()
        });

        BootstrapConfig {
            default_friend_username,
            default_avatar_url,
            welcome_message,
        }
    }
}
