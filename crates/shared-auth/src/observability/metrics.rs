//! Metrics emitted by token validation.
//!
//! All metrics follow Prometheus naming conventions:
//! - `auth_` prefix
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Cardinality
//!
//! Labels are bounded:
//! - `outcome`: "success" or a `TokenError::kind()` value (11 values)
//! - `status`: success, transport_error, bad_status, decode_error
//! - `result`: hit, miss
//!
//! With no recorder installed every call is a no-op.

use metrics::{counter, histogram};
use std::time::Duration;

/// Prefix shared by every metric in this module, for bucket configuration.
pub const METRIC_PREFIX: &str = "auth_";

/// Record the outcome of one token validation.
///
/// Metric: `auth_token_validations_total`
/// Labels: `outcome`
pub fn record_token_validation(outcome: &'static str) {
    counter!("auth_token_validations_total", "outcome" => outcome).increment(1);
}

/// Record one JWKS fetch.
///
/// Metric: `auth_jwks_fetches_total`, `auth_jwks_fetch_duration_seconds`
/// Labels: `status`
pub fn record_jwks_fetch(status: &'static str, duration: Duration) {
    histogram!("auth_jwks_fetch_duration_seconds", "status" => status)
        .record(duration.as_secs_f64());
    counter!("auth_jwks_fetches_total", "status" => status).increment(1);
}

/// Record a key cache lookup.
///
/// Metric: `auth_key_cache_lookups_total`
/// Labels: `result`
pub fn record_key_cache_lookup(result: &'static str) {
    counter!("auth_key_cache_lookups_total", "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    // No recorder is installed here; these only exercise the recording
    // paths, which must not panic without one.

    #[test]
    fn test_record_token_validation() {
        record_token_validation("success");
        record_token_validation("expired");
        record_token_validation("unknown_key");
    }

    #[test]
    fn test_record_jwks_fetch() {
        record_jwks_fetch("success", Duration::from_millis(40));
        record_jwks_fetch("transport_error", Duration::from_secs(5));
        record_jwks_fetch("bad_status", Duration::from_millis(12));
        record_jwks_fetch("decode_error", Duration::from_millis(15));
    }

    #[test]
    fn test_record_key_cache_lookup() {
        record_key_cache_lookup("hit");
        record_key_cache_lookup("miss");
    }
}
