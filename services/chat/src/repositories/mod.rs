//! Data access layer

pub mod message;
pub mod social;
pub mod user;

pub use message::MessageRepository;
pub use social::{AddFriendOutcome, SocialRepository};
pub use user::UserRepository;
