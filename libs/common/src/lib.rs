//! Shared infrastructure for the chat backend
//!
//! This crate provides the pieces every service-side binary needs:
//! database connectivity and the error types that go with it.

pub mod database;
pub mod error;
