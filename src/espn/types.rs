//! Raw ESPN payload shapes.
//!
//! Every field a normalizer can live without is optional or defaulted, so a
//! missing field degrades one value instead of rejecting the whole payload.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;


#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringItem {
    #[serde(rename = "statId")]
    pub stat_id: u16,
    /// Base points for this stat (used when no override exists for the player's slot)
    pub points: f64,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ScoringSettings {
    #[serde(rename = "scoringItems", default)]
    pub scoring_items: Vec<ScoringItem>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct RosterSettings {
    /// Lineup slot id -> number of slots. ESPN sends the ids as string keys
    /// (`{"0": 1, "2": 2}`); they are parsed, and bad ones skipped, by the normalizer.
    #[serde(rename = "lineupSlotCounts", default)]
    pub lineup_slot_counts: BTreeMap<String, serde_json::Value>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct AcquisitionSettings {
    #[serde(rename = "acquisitionBudget", default)]
    pub acquisition_budget: Option<u32>,
    #[serde(rename = "isUsingAcquisitionBudget", default)]
    pub is_using_acquisition_budget: Option<bool>,
}

/// Root we deserialize out of mSettings
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct LeagueSettings {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(rename = "rosterSettings", default)]
    pub roster_settings: RosterSettings,
    #[serde(rename = "scoringSettings", default)]
    pub scoring_settings: ScoringSettings,
    #[serde(rename = "acquisitionSettings", default)]
    pub acquisition_settings: AcquisitionSettings,
}

/// Top-level envelope for mSettings
#[derive(Debug, Deserialize)]
pub struct LeagueEnvelope {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(rename = "seasonId", default)]
    pub season_id: Option<u16>,
    pub settings: LeagueSettings,
    #[serde(default)]
    pub teams: Vec<serde_json::Value>,
}

/// Player data from ESPN API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Player {
    pub id: i64,
    #[serde(rename = "fullName", default)]
    pub full_name: Option<String>,
    #[serde(rename = "defaultPositionId", default)]
    pub default_position_id: Option<i64>,
    #[serde(rename = "proTeamId", default)]
    pub pro_team_id: Option<i64>,
    #[serde(rename = "injuryStatus", default)]
    pub injury_status: Option<String>,
    #[serde(default)]
    pub stats: Vec<PlayerStats>,
}

/// Player statistics for a specific period
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerStats {
    #[serde(rename = "statSourceId")]
    pub stat_source_id: u8,
    #[serde(rename = "statSplitTypeId", default)]
    pub stat_split_type_id: u8,
    #[serde(rename = "appliedTotal", default)]
    pub applied_total: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PlayerPoolEntry {
    #[serde(default)]
    pub player: Option<Player>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RosterEntry {
    #[serde(rename = "lineupSlotId", default)]
    pub lineup_slot_id: Option<u8>,
    #[serde(rename = "playerPoolEntry", default)]
    pub player_pool_entry: Option<PlayerPoolEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Team {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub abbrev: Option<String>,
}

impl Team {
    /// Newer payloads carry `name`; older ones split it into location + nickname.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.trim().to_string();
        }
        let joined = [self.location.as_deref(), self.nickname.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return joined;
        }
        self.abbrev
            .clone()
            .unwrap_or_else(|| format!("Team {}", self.id))
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TransactionItem {
    #[serde(rename = "playerId", default)]
    pub player_id: Option<i64>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(rename = "fromTeamId", default)]
    pub from_team_id: Option<i64>,
    #[serde(rename = "toTeamId", default)]
    pub to_team_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Transaction {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    /// Epoch milliseconds.
    #[serde(rename = "proposedDate", default)]
    pub proposed_date: Option<i64>,
    #[serde(rename = "processDate", default)]
    pub process_date: Option<i64>,
    #[serde(rename = "bidAmount", default)]
    pub bid_amount: Option<f64>,
    #[serde(default)]
    pub items: Vec<TransactionItem>,
}

/// One entry of the fan API `preferences` list.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanPreference {
    #[serde(rename = "metaData", default)]
    pub meta_data: Option<FanMetaData>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanMetaData {
    #[serde(default)]
    pub entry: Option<FanEntry>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanEntry {
    #[serde(rename = "entryId", default)]
    pub entry_id: Option<i64>,
    #[serde(rename = "entryNickname", default)]
    pub entry_nickname: Option<String>,
    #[serde(rename = "entryLocation", default)]
    pub entry_location: Option<String>,
    /// 1 is fantasy football.
    #[serde(rename = "gameId", default)]
    pub game_id: Option<i64>,
    #[serde(rename = "seasonId", default)]
    pub season_id: Option<u16>,
    #[serde(default)]
    pub groups: Vec<FanGroup>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanGroup {
    #[serde(rename = "groupId")]
    pub group_id: i64,
    #[serde(rename = "groupName", default)]
    pub group_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanProfile {
    pub id: String,
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub profile: Option<FanProfileDetails>,
    #[serde(default)]
    pub preferences: Vec<FanPreference>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FanProfileDetails {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}
