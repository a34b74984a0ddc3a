//! Business logic shared across handlers.

pub mod auth;
