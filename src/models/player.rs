//! Canonical player model: positions, injury designations and the player value object.

use crate::cli::types::PlayerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fantasy football player positions.
///
/// Closed set shared by every platform. Provider spellings of the defense /
/// special-teams slot ("D/ST", "DST", "DEF") all collapse to [`Position::DEF`].
///
/// ```rust
/// use ffl_aggregator::Position;
///
/// assert_eq!(Position::from_label("D/ST"), Position::DEF);
/// assert_eq!(Position::from_label("pk"), Position::K);
/// assert_eq!(Position::DEF.to_string(), "DEF");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    K,
    DEF,
}

impl Position {
    pub const ALL: [Position; 6] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::K,
        Position::DEF,
    ];

    /// Position assigned to labels no provider mapping recognizes.
    pub const FALLBACK: Position = Position::WR;

    /// Parse a provider label, returning `None` for anything unrecognized.
    pub fn parse_label(label: &str) -> Option<Self> {
        let cleaned: String = label
            .trim()
            .to_uppercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        match cleaned.as_str() {
            "QB" | "QUARTERBACK" => Some(Position::QB),
            "RB" | "HB" | "FB" | "RUNNINGBACK" => Some(Position::RB),
            "WR" | "WIDERECEIVER" => Some(Position::WR),
            "TE" | "TIGHTEND" => Some(Position::TE),
            "K" | "PK" | "KICKER" => Some(Position::K),
            "DEF" | "D/ST" | "DST" | "D" | "DEFENSE" => Some(Position::DEF),
            _ => None,
        }
    }

    /// Total mapping used by normalizers: unknown labels degrade to [`Position::FALLBACK`].
    pub fn from_label(label: &str) -> Self {
        Self::parse_label(label).unwrap_or(Self::FALLBACK)
    }

    /// Estimated weekly projection used when a provider omits one.
    pub fn estimated_points(&self) -> f64 {
        match self {
            Position::QB => 17.5,
            Position::RB => 11.0,
            Position::WR => 10.5,
            Position::TE => 7.5,
            Position::K => 8.0,
            Position::DEF => 7.0,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::K => "K",
            Position::DEF => "DEF",
        };
        write!(f, "{}", s)
    }
}

/// Injury designation, collapsed to four buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InjuryStatus {
    #[default]
    Active,
    Questionable,
    Doubtful,
    Out,
}

impl InjuryStatus {
    /// Map a free-text provider status. Missing or unknown statuses are `Active`.
    pub fn from_label(label: Option<&str>) -> Self {
        let Some(label) = label else {
            return InjuryStatus::Active;
        };
        let cleaned: String = label
            .trim()
            .to_uppercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        match cleaned.as_str() {
            "QUESTIONABLE" | "Q" | "PROBABLE" | "P" | "DAY_TO_DAY" | "DTD" => {
                InjuryStatus::Questionable
            }
            "DOUBTFUL" | "D" => InjuryStatus::Doubtful,
            "OUT" | "O" | "IR" | "INJURY_RESERVE" | "INJURED_RESERVE" | "SUSPENSION" | "SUS"
            | "PUP" | "NA" | "COV" => InjuryStatus::Out,
            _ => InjuryStatus::Active,
        }
    }
}

impl fmt::Display for InjuryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            InjuryStatus::Active => "ACTIVE",
            InjuryStatus::Questionable => "QUESTIONABLE",
            InjuryStatus::Doubtful => "DOUBTFUL",
            InjuryStatus::Out => "OUT",
        };
        write!(f, "{}", s)
    }
}

/// Normalized player. Rebuilt on every fetch and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalPlayer {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    /// Pro team abbreviation, `FA` for free agents.
    pub pro_team: String,
    pub injury_status: InjuryStatus,
    pub projected_points: f64,
    /// True when `projected_points` came from [`Position::estimated_points`].
    pub projection_estimated: bool,
    pub starter: bool,
}

impl CanonicalPlayer {
    /// Resolve the projection, estimating from the position when absent or not finite.
    pub fn projection_or_estimate(position: Position, projected: Option<f64>) -> (f64, bool) {
        match projected {
            Some(points) if points.is_finite() => (points, false),
            _ => (position.estimated_points(), true),
        }
    }
}
