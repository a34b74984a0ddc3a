//! # financia_core
//!
//! Core domain logic for Financia: identity resolution, session tokens and
//! the transaction/budget ledger.

pub mod auth;
pub mod ledger;
pub mod migrate;
pub mod models;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
