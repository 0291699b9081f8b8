//! Opaque identifier types.
//!
//! ESPN uses small integers for leagues and teams while Sleeper uses long
//! numeric strings (and team abbreviations for defenses), so every id is kept
//! as a trimmed, non-empty string.

use crate::error::{AggregatorError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an id, trimming surrounding whitespace.
            pub fn new(id: impl Into<String>) -> Self {
                let id = id.into();
                Self(id.trim().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = AggregatorError;

            fn from_str(s: &str) -> Result<Self> {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    return Err(AggregatorError::InvalidId {
                        value: s.to_string(),
                    });
                }
                Ok(Self(trimmed.to_string()))
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id.to_string())
            }
        }
    };
}

opaque_id!(
    /// Fantasy league identifier.
    ///
    /// ```rust
    /// use ffl_aggregator::LeagueId;
    ///
    /// let league_id: LeagueId = "83806".parse().unwrap();
    /// assert_eq!(league_id.as_str(), "83806");
    /// ```
    LeagueId
);

opaque_id!(
    /// Fantasy team identifier, unique within a league.
    TeamId
);

opaque_id!(
    /// Platform user identifier (ESPN SWID or Sleeper user id).
    UserId
);

opaque_id!(
    /// Platform-scoped player identifier.
    PlayerId
);
