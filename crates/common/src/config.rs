//! Service settings shared by every message board service.
//!
//! Parsed once at startup so a bad value fails configuration loading instead
//! of surfacing later while the router is built.

use axum::http::HeaderValue;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Value of `CORS_ORIGINS` that allows every origin.
pub const CORS_WILDCARD: &str = "*";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid LOG_FORMAT '{0}': expected 'json' or 'text'")]
    InvalidLogFormat(String),

    #[error("Invalid CORS origin '{0}': not a valid header value")]
    InvalidCorsOrigin(String),

    #[error("CORS_ORIGINS contains no origins")]
    EmptyCorsOrigins,
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" | "" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(ConfigError::InvalidLogFormat(s.to_string())),
        }
    }
}

/// Origins allowed to make cross-origin requests.
#[derive(Clone, Default, PartialEq, Eq)]
pub enum CorsOrigins {
    /// Any origin (`*`).
    #[default]
    Any,

    /// Exactly these origins. Never contains the wildcard.
    List(Vec<HeaderValue>),
}

impl fmt::Debug for CorsOrigins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorsOrigins::Any => f.write_str(CORS_WILDCARD),
            CorsOrigins::List(origins) => f
                .debug_list()
                .entries(origins.iter().map(|o| String::from_utf8_lossy(o.as_bytes())))
                .finish(),
        }
    }
}

impl FromStr for CorsOrigins {
    type Err = ConfigError;

    /// Parse `*` or a comma separated list of origins.
    ///
    /// A wildcard anywhere in the list widens the policy to any origin.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let entries: Vec<&str> = s
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .collect();

        if entries.is_empty() {
            return Err(ConfigError::EmptyCorsOrigins);
        }

        if entries.contains(&CORS_WILDCARD) {
            if entries.len() > 1 {
                tracing::warn!(
                    target: "common.config",
                    origins = %s,
                    "CORS_ORIGINS mixes '*' with explicit origins, allowing any origin"
                );
            }
            return Ok(CorsOrigins::Any);
        }

        let origins = entries
            .into_iter()
            .map(|origin| {
                HeaderValue::from_str(origin)
                    .map_err(|_| ConfigError::InvalidCorsOrigin(origin.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CorsOrigins::List(origins))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_parse() {
        assert_eq!("".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert_eq!("Json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!(
            "xml".parse::<LogFormat>(),
            Err(ConfigError::InvalidLogFormat("xml".to_string()))
        );
    }

    #[test]
    fn test_cors_wildcard() {
        assert_eq!("*".parse::<CorsOrigins>().unwrap(), CorsOrigins::Any);
        assert_eq!(" * ".parse::<CorsOrigins>().unwrap(), CorsOrigins::Any);
    }

    #[test]
    fn test_cors_list() {
        let origins: CorsOrigins = "https://a.example, https://b.example,".parse().unwrap();

        assert_eq!(
            origins,
            CorsOrigins::List(vec![
                HeaderValue::from_static("https://a.example"),
                HeaderValue::from_static("https://b.example"),
            ])
        );
    }

    #[test]
    fn test_cors_wildcard_inside_list_allows_any() {
        for value in ["https://a.example, *", "*,https://a.example", "https://a.example,*,"] {
            assert_eq!(
                value.parse::<CorsOrigins>().unwrap(),
                CorsOrigins::Any,
                "value {value:?}"
            );
        }
    }

    #[test]
    fn test_cors_invalid_origin_is_error() {
        assert_eq!(
            "https://a.example,bad\nvalue".parse::<CorsOrigins>(),
            Err(ConfigError::InvalidCorsOrigin("bad\nvalue".to_string()))
        );
    }

    #[test]
    fn test_cors_empty_list_is_error() {
        assert_eq!(
            " , ,".parse::<CorsOrigins>(),
            Err(ConfigError::EmptyCorsOrigins)
        );
    }

    #[test]
    fn test_cors_debug_shows_origins() {
        let origins: CorsOrigins = "https://a.example".parse().unwrap();
        assert_eq!(format!("{origins:?}"), r#"["https://a.example"]"#);
        assert_eq!(format!("{:?}", CorsOrigins::Any), "*");
    }
}
