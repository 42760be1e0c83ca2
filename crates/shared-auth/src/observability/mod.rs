//! Observability for the token validator.
//!
//! Metric recording helpers only. Installing a recorder and serving the
//! scrape endpoint is left to each service.

pub mod metrics;
