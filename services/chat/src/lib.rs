//! Real-time chat backend
//!
//! Password authentication with stateless JWT sessions, a symmetric friend
//! graph with cascading cleanup on account deletion, persisted direct
//! messages, and a WebSocket gateway that multiplexes the private-message
//! and room sub-protocols over one connection per client.

pub mod admin;
pub mod config;
pub mod database;
pub mod error;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod realtime;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod validation;
