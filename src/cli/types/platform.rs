//! Supported fantasy platforms.

use crate::error::AggregatorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Upstream fantasy platform.
///
/// ```rust
/// use ffl_aggregator::Platform;
///
/// let platform: Platform = "Sleeper".parse().unwrap();
/// assert_eq!(platform, Platform::Sleeper);
/// assert_eq!(platform.as_str(), "sleeper");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Espn,
    Sleeper,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Espn, Platform::Sleeper];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Espn => "espn",
            Platform::Sleeper => "sleeper",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Platform {
    type Err = AggregatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "espn" => Ok(Platform::Espn),
            "sleeper" => Ok(Platform::Sleeper),
            other => Err(AggregatorError::UnknownPlatform {
                name: other.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trip_names() {
        for platform in Platform::ALL {
            assert_eq!(platform.as_str().parse::<Platform>().unwrap(), platform);
        }
    }

    #[test]
    fn test_unknown_platform() {
        assert!(matches!(
            "yahoo".parse::<Platform>(),
            Err(AggregatorError::UnknownPlatform { .. })
        ));
    }
}
