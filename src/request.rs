//! Logical requests and their cache fingerprints.

use crate::cli::types::{LeagueId, Platform, Season, TeamId, UserId, Week};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the caller wants, independent of how any tier obtains it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LogicalRequest {
    Roster {
        league_id: LeagueId,
        team_id: TeamId,
        season: Season,
    },
    Transactions {
        league_id: LeagueId,
        period: Week,
        season: Season,
    },
    UserProfile {
        user_id: UserId,
        season: Season,
    },
    LeagueSettings {
        league_id: LeagueId,
        season: Season,
    },
    PlayerDirectory {
        season: Season,
    },
}

/// How long a normalized answer stays fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TtlClass {
    /// Rosters, transactions, profiles and settings: minutes.
    Volatile,
    /// The full player directory: about a day.
    Reference,
}

impl LogicalRequest {
    pub fn operation(&self) -> &'static str {
        match self {
            LogicalRequest::Roster { .. } => "roster",
            LogicalRequest::Transactions { .. } => "transactions",
            LogicalRequest::UserProfile { .. } => "user_profile",
            LogicalRequest::LeagueSettings { .. } => "league_settings",
            LogicalRequest::PlayerDirectory { .. } => "player_directory",
        }
    }

    pub fn season(&self) -> Season {
        match self {
            LogicalRequest::Roster { season, .. }
            | LogicalRequest::Transactions { season, .. }
            | LogicalRequest::UserProfile { season, .. }
            | LogicalRequest::LeagueSettings { season, .. }
            | LogicalRequest::PlayerDirectory { season } => *season,
        }
    }

    pub fn league_id(&self) -> Option<&LeagueId> {
        match self {
            LogicalRequest::Roster { league_id, .. }
            | LogicalRequest::Transactions { league_id, .. }
            | LogicalRequest::LeagueSettings { league_id, .. } => Some(league_id),
            LogicalRequest::UserProfile { .. } | LogicalRequest::PlayerDirectory { .. } => None,
        }
    }

    pub fn ttl_class(&self) -> TtlClass {
        match self {
            LogicalRequest::PlayerDirectory { .. } => TtlClass::Reference,
            _ => TtlClass::Volatile,
        }
    }

    /// Ordered `(name, value)` parameter tuple; the order is fixed per operation.
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            LogicalRequest::Roster {
                league_id,
                team_id,
                season,
            } => vec![
                ("league", league_id.to_string()),
                ("season", season.to_string()),
                ("team", team_id.to_string()),
            ],
            LogicalRequest::Transactions {
                league_id,
                period,
                season,
            } => vec![
                ("league", league_id.to_string()),
                ("season", season.to_string()),
                ("period", period.to_string()),
            ],
            LogicalRequest::UserProfile { user_id, season } => vec![
                ("season", season.to_string()),
                ("user", user_id.to_string()),
            ],
            LogicalRequest::LeagueSettings { league_id, season } => vec![
                ("league", league_id.to_string()),
                ("season", season.to_string()),
            ],
            LogicalRequest::PlayerDirectory { season } => vec![("season", season.to_string())],
        }
    }

    pub fn fingerprint(&self, platform: Platform) -> Fingerprint {
        Fingerprint::new(platform, self.operation(), &self.params())
    }
}

/// Deterministic cache key: platform + operation + normalized parameters.
///
/// ```rust
/// use ffl_aggregator::{LeagueId, LogicalRequest, Platform, Season, TeamId};
///
/// let request = LogicalRequest::Roster {
///     league_id: LeagueId::new("83806"),
///     team_id: TeamId::new("7"),
///     season: Season::new(2025),
/// };
/// assert_eq!(
///     request.fingerprint(Platform::Espn).as_str(),
///     "espn:roster:league=83806:season=2025:team=7"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(platform: Platform, operation: &str, params: &[(&str, String)]) -> Self {
        let mut key = format!("{}:{}", platform.as_str(), operation);
        for (name, value) in params {
            key.push(':');
            key.push_str(name);
            key.push('=');
            key.push_str(&value.trim().to_lowercase());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File-system safe form of the key.
    pub fn to_file_key(&self) -> String {
        self.0
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
