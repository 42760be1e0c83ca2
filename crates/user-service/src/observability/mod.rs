//! Observability for the user service.
//!
//! Default log filter and metrics definitions. The subscriber itself is
//! installed by `common::observability::init_tracing`.

pub mod metrics;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "user_service=debug,user=debug,auth=info,common=info,tower_http=debug";
