//! Request handlers.

pub mod auth;
pub mod budgets;
pub mod health;
pub mod oauth;
pub mod transactions;
