//! Common service plumbing shared by the message board services.

/// Module for settings every service reads the same way
pub mod config;

/// Module for the cross-origin policy layer
pub mod cors;

/// Module for tracing subscriber setup
pub mod observability;
