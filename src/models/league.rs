//! Canonical league-level models: rosters, transactions, user profiles and settings.

use crate::cli::types::{LeagueId, PlayerId, Season, TeamId, UserId};
use crate::models::player::{CanonicalPlayer, Position};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One fantasy team's roster, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRoster {
    pub team_id: TeamId,
    pub team_name: String,
    pub players: Vec<CanonicalPlayer>,
}

impl CanonicalRoster {
    pub fn starters(&self) -> impl Iterator<Item = &CanonicalPlayer> {
        self.players.iter().filter(|p| p.starter)
    }

    pub fn count_at(&self, position: Position) -> usize {
        self.players.iter().filter(|p| p.position == position).count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Trade,
    Add,
    Drop,
    Waiver,
}

impl TransactionKind {
    /// Guess the kind from free text such as a scraped activity row.
    pub fn from_text(text: &str) -> Option<Self> {
        let lower = text.to_lowercase();
        if lower.contains("trade") || lower.contains("traded") {
            Some(TransactionKind::Trade)
        } else if lower.contains("waiver") || lower.contains("claim") {
            Some(TransactionKind::Waiver)
        } else if lower.contains("drop") {
            Some(TransactionKind::Drop)
        } else if lower.contains("add") || lower.contains("free agent") {
            Some(TransactionKind::Add)
        } else {
            None
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionKind::Trade => "trade",
            TransactionKind::Add => "add",
            TransactionKind::Drop => "drop",
            TransactionKind::Waiver => "waiver",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    /// Player joined `team_id`.
    In,
    /// Player left `team_id`.
    Out,
}

/// A single player movement inside a transaction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionMove {
    pub player_id: PlayerId,
    pub player_name: Option<String>,
    pub direction: MoveDirection,
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTransaction {
    pub date: DateTime<Utc>,
    pub kind: TransactionKind,
    pub moves: Vec<TransactionMove>,
    /// FAAB bid, when the platform reports one.
    pub bid: Option<u32>,
    /// Original text when the structured fields could not be recovered.
    pub raw_text: Option<String>,
}

/// A league membership listed on a user profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueMembership {
    pub league_id: LeagueId,
    pub league_name: Option<String>,
    pub team_id: Option<TeamId>,
    pub team_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalUserProfile {
    pub user_id: UserId,
    pub display_name: String,
    pub avatar: Option<String>,
    pub leagues: Vec<LeagueMembership>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringFormat {
    Standard,
    HalfPpr,
    Ppr,
    Custom,
}

impl ScoringFormat {
    pub fn from_reception_points(points: f64) -> Self {
        if points.abs() < f64::EPSILON {
            ScoringFormat::Standard
        } else if (points - 0.5).abs() < f64::EPSILON {
            ScoringFormat::HalfPpr
        } else if (points - 1.0).abs() < f64::EPSILON {
            ScoringFormat::Ppr
        } else {
            ScoringFormat::Custom
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLeagueSettings {
    pub league_id: LeagueId,
    pub name: String,
    pub season: Season,
    pub team_count: u32,
    /// Starting lineup slots, e.g. `["QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "K", "DEF"]`.
    pub roster_positions: Vec<String>,
    pub reception_points: f64,
    pub scoring_format: ScoringFormat,
    /// FAAB budget when the league bids on waivers.
    pub waiver_budget: Option<u32>,
}
