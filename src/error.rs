//! Error types for the fantasy football aggregator
//!
//! Two layers:
//! - [`AggregatorError`] covers setup, configuration and CLI failures.
//! - [`TierError`] is what a single acquisition tier reports back to the
//!   provider chain. It never reaches a facade caller.

use thiserror::Error;

#[cfg(test)]
mod tests;

pub type Result<T> = std::result::Result<T, AggregatorError>;

#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),

    #[error("League ID not provided and {env_var} environment variable not set")]
    MissingLeagueId { env_var: String },

    #[error("Invalid identifier: {value:?}")]
    InvalidId { value: String },

    #[error("Failed to parse number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Unknown platform: {name}")]
    UnknownPlatform { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Coarse classification of a [`TierError`], used by the fallback policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierErrorKind {
    Authentication,
    RateLimitExceeded,
    UpstreamUnavailable,
    Parse,
    Timeout,
}

/// Failure of one acquisition tier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TierError {
    #[error("authentication rejected by {context}")]
    Authentication { context: String },

    #[error("rate limit exceeded at {context}")]
    RateLimitExceeded { context: String },

    #[error("upstream unavailable ({context}): {message}")]
    UpstreamUnavailable { context: String, message: String },

    #[error("unrecognized payload from {context}: {message}")]
    Parse { context: String, message: String },

    #[error("timed out waiting for {context}")]
    Timeout { context: String },
}

impl TierError {
    pub fn kind(&self) -> TierErrorKind {
        match self {
            TierError::Authentication { .. } => TierErrorKind::Authentication,
            TierError::RateLimitExceeded { .. } => TierErrorKind::RateLimitExceeded,
            TierError::UpstreamUnavailable { .. } => TierErrorKind::UpstreamUnavailable,
            TierError::Parse { .. } => TierErrorKind::Parse,
            TierError::Timeout { .. } => TierErrorKind::Timeout,
        }
    }

    pub fn parse(context: impl Into<String>, message: impl Into<String>) -> Self {
        TierError::Parse {
            context: context.into(),
            message: message.into(),
        }
    }

    pub fn upstream(context: impl Into<String>, message: impl Into<String>) -> Self {
        TierError::UpstreamUnavailable {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Map an HTTP status onto the tier taxonomy.
    ///
    /// Returns `None` for success statuses.
    pub fn from_status(context: &str, status: reqwest::StatusCode) -> Option<Self> {
        if status.is_success() {
            return None;
        }
        let context = context.to_string();
        Some(match status.as_u16() {
            401 | 403 => TierError::Authentication { context },
            429 => TierError::RateLimitExceeded { context },
            408 | 504 => TierError::Timeout { context },
            code => TierError::UpstreamUnavailable {
                context,
                message: format!("HTTP {}", code),
            },
        })
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_reqwest(context: &str, err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return TierError::Timeout {
                context: context.to_string(),
            };
        }
        if let Some(status) = err.status() {
            if let Some(mapped) = Self::from_status(context, status) {
                return mapped;
            }
        }
        if err.is_decode() {
            return TierError::parse(context, err.to_string());
        }
        TierError::upstream(context, err.to_string())
    }
}
