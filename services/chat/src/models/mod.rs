//! Chat service models

pub mod message;
pub mod user;

// Re-export for convenience
pub use message::Message;
pub use user::{FriendInfo, User, UserSummary};
