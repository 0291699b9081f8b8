//! Raw Sleeper API shapes.

use crate::models::CanonicalPlayer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// What the Sleeper native client hands to the normalizer, one variant per endpoint group.
#[derive(Debug, Clone)]
pub enum SleeperRaw {
    /// `/league/{id}/rosters` and `/league/{id}/users`, plus the player
    /// directory when it could be loaded.
    Roster {
        rosters: Value,
        users: Value,
        directory: Option<Vec<CanonicalPlayer>>,
    },
    Transactions(Value),
    League(Value),
    /// `/user/{id}` and `/user/{id}/leagues/nfl/{season}`.
    User { user: Value, leagues: Value },
    /// `/players/nfl`, keyed by player id.
    Players(Value),
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Roster {
    pub roster_id: i64,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    /// Lineup order; empty slots are sent as `"0"`.
    #[serde(default)]
    pub starters: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TransactionSettings {
    #[serde(default)]
    pub waiver_bid: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub status_updated: Option<i64>,
    /// Player id -> receiving roster id.
    #[serde(default)]
    pub adds: Option<BTreeMap<String, i64>>,
    /// Player id -> releasing roster id.
    #[serde(default)]
    pub drops: Option<BTreeMap<String, i64>>,
    #[serde(default)]
    pub settings: Option<TransactionSettings>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LeagueSettingsBlock {
    #[serde(default)]
    pub waiver_budget: Option<u32>,
    /// 2 is FAAB bidding.
    #[serde(default)]
    pub waiver_type: Option<u8>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct League {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default)]
    pub total_rosters: Option<u32>,
    #[serde(default)]
    pub roster_positions: Vec<String>,
    #[serde(default)]
    pub scoring_settings: BTreeMap<String, f64>,
    #[serde(default)]
    pub settings: Option<LeagueSettingsBlock>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LeagueSummary {
    pub league_id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Player {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub fantasy_positions: Option<Vec<String>>,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub injury_status: Option<String>,
}

impl Player {
    pub fn display_name(&self) -> Option<String> {
        if let Some(full) = self.full_name.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
            return Some(full.to_string());
        }
        let joined = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        Some(joined).filter(|n| !n.is_empty())
    }
}
