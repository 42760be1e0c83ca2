//! Message Service
//!
//! HTTP front end of the message board. Public operational endpoints plus
//! routes gated by `shared_auth::require_auth`.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod observability;
pub mod routes;
