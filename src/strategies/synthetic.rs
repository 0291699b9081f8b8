//! Synthetic data tier.
//!
//! Fixed shape, random content: every roster carries the same position mix,
//! values stay in realistic ranges, and generation cannot fail. Results are
//! tagged `source = synthetic` by the chain like any other tier.

use crate::cli::types::{LeagueId, Platform, PlayerId, Season, TeamId, UserId};
use crate::error::TierError;
use crate::models::{
    CanonicalLeagueSettings, CanonicalPlayer, CanonicalRoster, CanonicalTransaction,
    CanonicalUserProfile, InjuryStatus, LeagueMembership, MoveDirection, Payload, Position,
    ScoringFormat, StrategyKind, TransactionKind, TransactionMove,
};
use crate::normalize::RawPayload;
use crate::request::LogicalRequest;
use crate::strategies::AcquisitionStrategy;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// Roster composition: (position, rostered, starting).
const ROSTER_SHAPE: [(Position, usize, usize); 6] = [
    (Position::QB, 2, 1),
    (Position::RB, 4, 2),
    (Position::WR, 5, 3),
    (Position::TE, 2, 1),
    (Position::K, 1, 1),
    (Position::DEF, 2, 1),
];

/// Players per pro team in the synthetic directory.
const DIRECTORY_SHAPE: [(Position, usize); 6] = [
    (Position::QB, 2),
    (Position::RB, 3),
    (Position::WR, 4),
    (Position::TE, 2),
    (Position::K, 1),
    (Position::DEF, 1),
];

const PRO_TEAMS: [&str; 32] = [
    "ARI", "ATL", "BAL", "BUF", "CAR", "CHI", "CIN", "CLE", "DAL", "DEN", "DET", "GB", "HOU",
    "IND", "JAX", "KC", "LAC", "LAR", "LV", "MIA", "MIN", "NE", "NO", "NYG", "NYJ", "PHI", "PIT",
    "SEA", "SF", "TB", "TEN", "WSH",
];

const FIRST_NAMES: [&str; 16] = [
    "Marcus", "Tyler", "Jalen", "Derrick", "Cooper", "Travis", "Dak", "Amon", "Kyren", "Bijan",
    "Garrett", "Puka", "Brock", "Jahmyr", "Nico", "Justin",
];

const LAST_NAMES: [&str; 16] = [
    "Johnson", "Williams", "Brown", "Davis", "Miller", "Wilson", "Moore", "Taylor", "Thomas",
    "Jackson", "White", "Harris", "Martin", "Thompson", "Robinson", "Walker",
];

const STARTING_LINEUP: [&str; 9] = ["QB", "RB", "RB", "WR", "WR", "TE", "FLEX", "K", "DEF"];

#[derive(Debug, Clone)]
pub struct SyntheticStrategy {
    platform: Platform,
    seed: Option<u64>,
}

impl SyntheticStrategy {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            seed: None,
        }
    }

    /// Reproducible content, for tests.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Build the canonical payload for `request`. Total over every request kind.
    pub fn generate(&self, request: &LogicalRequest) -> Payload {
        let mut rng = self.rng();
        match request {
            LogicalRequest::Roster { team_id, .. } => Payload::Roster(roster(&mut rng, team_id)),
            LogicalRequest::Transactions { .. } => Payload::Transactions(transactions(&mut rng)),
            LogicalRequest::UserProfile { user_id, .. } => {
                Payload::UserProfile(user_profile(&mut rng, user_id))
            }
            LogicalRequest::LeagueSettings { league_id, season } => {
                Payload::LeagueSettings(league_settings(league_id, *season))
            }
            LogicalRequest::PlayerDirectory { .. } => Payload::Players(directory(&mut rng)),
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for SyntheticStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Synthetic
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn is_rate_limited(&self) -> bool {
        false
    }

    async fn fetch(&self, request: &LogicalRequest) -> Result<RawPayload, TierError> {
        Ok(RawPayload::Canonical(self.generate(request)))
    }
}

fn projection_range(position: Position) -> (f64, f64) {
    match position {
        Position::QB => (14.0, 26.0),
        Position::RB => (6.0, 20.0),
        Position::WR => (6.0, 19.0),
        Position::TE => (4.0, 14.0),
        Position::K => (5.0, 12.0),
        Position::DEF => (3.0, 12.0),
    }
}

fn injury(rng: &mut StdRng) -> InjuryStatus {
    match rng.gen_range(0..100) {
        0..=84 => InjuryStatus::Active,
        85..=93 => InjuryStatus::Questionable,
        94..=96 => InjuryStatus::Doubtful,
        _ => InjuryStatus::Out,
    }
}

fn pick<'a>(rng: &mut StdRng, options: &[&'a str]) -> &'a str {
    options.choose(rng).copied().unwrap_or("FA")
}

fn player(rng: &mut StdRng, id: String, position: Position, pro_team: &str, starter: bool) -> CanonicalPlayer {
    let name = match position {
        Position::DEF => format!("{} D/ST", pro_team),
        _ => format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES)),
    };
    let (low, high) = projection_range(position);
    let projected_points = (rng.gen_range(low..high) * 10.0).round() / 10.0;

    CanonicalPlayer {
        id: PlayerId::new(id),
        name,
        position,
        pro_team: pro_team.to_string(),
        injury_status: injury(rng),
        projected_points,
        projection_estimated: true,
        starter,
    }
}

fn roster(rng: &mut StdRng, team_id: &TeamId) -> CanonicalRoster {
    let mut players = Vec::new();
    for (position, rostered, starting) in ROSTER_SHAPE {
        for slot in 0..rostered {
            let id = format!("syn-{}-{}-{}", team_id, position, slot);
            let pro_team = pick(rng, &PRO_TEAMS);
            players.push(player(rng, id, position, pro_team, slot < starting));
        }
    }

    CanonicalRoster {
        team_id: team_id.clone(),
        team_name: format!("Synthetic Team {}", team_id),
        players,
    }
}

fn transactions(rng: &mut StdRng) -> Vec<CanonicalTransaction> {
    let count = rng.gen_range(3..=8);
    let now = Utc::now();
    let mut out: Vec<CanonicalTransaction> = (0..count)
        .map(|n| {
            let kind = match rng.gen_range(0..4) {
                0 => TransactionKind::Trade,
                1 => TransactionKind::Add,
                2 => TransactionKind::Drop,
                _ => TransactionKind::Waiver,
            };
            let team = TeamId::from(rng.gen_range(1..=12u64));
            let mut moves = vec![TransactionMove {
                player_id: PlayerId::new(format!("syn-tx-{}-in", n)),
                player_name: Some(format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES))),
                direction: if kind == TransactionKind::Drop {
                    MoveDirection::Out
                } else {
                    MoveDirection::In
                },
                team_id: Some(team.clone()),
            }];
            if matches!(kind, TransactionKind::Trade | TransactionKind::Waiver) {
                moves.push(TransactionMove {
                    player_id: PlayerId::new(format!("syn-tx-{}-out", n)),
                    player_name: Some(format!("{} {}", pick(rng, &FIRST_NAMES), pick(rng, &LAST_NAMES))),
                    direction: MoveDirection::Out,
                    team_id: Some(team),
                });
            }

            CanonicalTransaction {
                date: now - ChronoDuration::minutes(rng.gen_range(10..(14 * 24 * 60))),
                kind,
                moves,
                bid: (kind == TransactionKind::Waiver).then(|| rng.gen_range(1..=40)),
                raw_text: None,
            }
        })
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

fn user_profile(rng: &mut StdRng, user_id: &UserId) -> CanonicalUserProfile {
    let league_count = rng.gen_range(1..=2u64);
    let leagues = (1..=league_count)
        .map(|n| LeagueMembership {
            league_id: LeagueId::new(format!("syn-league-{}", n)),
            league_name: Some(format!("Synthetic League {}", n)),
            team_id: Some(TeamId::from(rng.gen_range(1..=12u64))),
            team_name: Some(format!("Synthetic Team {}", n)),
        })
        .collect();

    CanonicalUserProfile {
        user_id: user_id.clone(),
        display_name: "Synthetic Manager".to_string(),
        avatar: None,
        leagues,
    }
}

fn league_settings(league_id: &LeagueId, season: Season) -> CanonicalLeagueSettings {
    CanonicalLeagueSettings {
        league_id: league_id.clone(),
        name: format!("Synthetic League {}", league_id),
        season,
        team_count: 12,
        roster_positions: STARTING_LINEUP.iter().map(|s| s.to_string()).collect(),
        reception_points: 1.0,
        scoring_format: ScoringFormat::Ppr,
        waiver_budget: Some(100),
    }
}

fn directory(rng: &mut StdRng) -> Vec<CanonicalPlayer> {
    let mut players = Vec::new();
    for pro_team in PRO_TEAMS {
        for (position, count) in DIRECTORY_SHAPE {
            for slot in 0..count {
                let id = format!("syn-{}-{}-{}", pro_team, position, slot);
                players.push(player(rng, id, position, pro_team, false));
            }
        }
    }
    players
}
