//! Input validation utilities
//!
//! Bounds checks only. Usernames and passwords carry no character or
//! strength policy beyond presence and length limits.

/// Maximum username length in characters
pub const MAX_USERNAME_CHARS: usize = 64;

/// Maximum password length in bytes
pub const MAX_PASSWORD_BYTES: usize = 128;

/// Validate username
pub fn validate_username(username: &str) -> Result<(), String> {
    if username.trim().is_empty() {
        return Err("Username is required".to_string());
    }

    if username.chars().count() > MAX_USERNAME_CHARS {
        return Err(format!(
            "Username must be at most {} characters long",
            MAX_USERNAME_CHARS
        ));
    }

    Ok(())
}

/// Validate password
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(format!(
            "Password must be at most {} bytes long",
            MAX_PASSWORD_BYTES
        ));
    }

    Ok(())
}
