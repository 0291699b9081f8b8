//! ESPN payloads -> canonical models.

use crate::cli::types::{LeagueId, PlayerId, Season, TeamId, UserId};
use crate::error::TierError;
use crate::espn::types::{
    FanProfile, LeagueEnvelope, Player, PlayerStats, RosterEntry, Team, Transaction,
};
use crate::models::{
    CanonicalLeagueSettings, CanonicalPlayer, CanonicalRoster, CanonicalTransaction,
    CanonicalUserProfile, InjuryStatus, LeagueMembership, MoveDirection, Payload, Position,
    ScoringFormat, TransactionKind, TransactionMove,
};
use crate::normalize::{id_string, push_lineup_slots, Degradations, Normalized};
use crate::request::LogicalRequest;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

#[cfg(test)]
mod tests;

const CONTEXT: &str = "espn normalizer";

/// Bench and injured-reserve lineup slots.
const NON_STARTER_SLOTS: [u8; 2] = [20, 21];

/// Stat id for receptions in `scoringItems`.
const RECEPTION_STAT_ID: u16 = 53;

/// ESPN `statSourceId` for projections (0 is actuals).
const PROJECTION_SOURCE_ID: u8 = 1;

pub fn normalize(request: &LogicalRequest, value: &Value) -> Result<Normalized, TierError> {
    match request {
        LogicalRequest::Roster { team_id, .. } => roster(value, team_id),
        LogicalRequest::Transactions { .. } => transactions(value),
        LogicalRequest::UserProfile { user_id, season } => user_profile(value, user_id, *season),
        LogicalRequest::LeagueSettings { league_id, season } => {
            league_settings(value, league_id, *season)
        }
        LogicalRequest::PlayerDirectory { .. } => players(value),
    }
}

/// Map an ESPN `defaultPositionId`.
pub fn position_from_id(id: i64) -> Option<Position> {
    match id {
        0 | 1 => Some(Position::QB), // ESPN uses both 0 and 1 for QB
        2 => Some(Position::RB),
        3 => Some(Position::WR),
        4 | 6 => Some(Position::TE),
        5 | 17 => Some(Position::K),
        16 => Some(Position::DEF),
        _ => None,
    }
}

/// Label for a lineup slot id.
pub fn slot_label(slot: u8) -> Option<&'static str> {
    Some(match slot {
        0 => "QB",
        1 => "TQB",
        2 => "RB",
        3 => "RB/WR",
        4 => "WR",
        5 => "WR/TE",
        6 => "TE",
        7 => "OP",
        16 => "DEF",
        17 => "K",
        20 => "BE",
        21 => "IR",
        23 => "FLEX",
        _ => return None,
    })
}

pub fn pro_team_abbrev(id: i64) -> &'static str {
    match id {
        1 => "ATL",
        2 => "BUF",
        3 => "CHI",
        4 => "CIN",
        5 => "CLE",
        6 => "DAL",
        7 => "DEN",
        8 => "DET",
        9 => "GB",
        10 => "TEN",
        11 => "IND",
        12 => "KC",
        13 => "LV",
        14 => "LAR",
        15 => "MIA",
        16 => "MIN",
        17 => "NE",
        18 => "NO",
        19 => "NYG",
        20 => "NYJ",
        21 => "PHI",
        22 => "ARI",
        23 => "PIT",
        24 => "LAC",
        25 => "SF",
        26 => "SEA",
        27 => "TB",
        28 => "WSH",
        29 => "CAR",
        30 => "JAX",
        33 => "BAL",
        34 => "HOU",
        _ => "FA",
    }
}

fn parse_error(message: impl Into<String>) -> TierError {
    TierError::parse(CONTEXT, message)
}

/// Weekly projection if present, else any projection split.
fn projection(stats: &[PlayerStats]) -> Option<f64> {
    let projections = || stats.iter().filter(|s| s.stat_source_id == PROJECTION_SOURCE_ID);
    projections()
        .find(|s| s.stat_split_type_id == 1)
        .or_else(|| projections().next())
        .and_then(|s| s.applied_total)
}

/// Field-level gaps fall back to defaults here; they are not structural degradations.
fn canonical_player(player: &Player, starter: bool) -> CanonicalPlayer {
    let position = match player.default_position_id.and_then(position_from_id) {
        Some(position) => position,
        None => {
            debug!(
                "ESPN player {}: unknown position id {:?}, using {}",
                player.id,
                player.default_position_id,
                Position::FALLBACK
            );
            Position::FALLBACK
        }
    };

    let name = match player.full_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("Player {}", player.id),
    };

    let (projected_points, projection_estimated) =
        CanonicalPlayer::projection_or_estimate(position, projection(&player.stats));

    CanonicalPlayer {
        id: PlayerId::from(player.id.unsigned_abs()),
        name,
        position,
        pro_team: pro_team_abbrev(player.pro_team_id.unwrap_or(0)).to_string(),
        injury_status: InjuryStatus::from_label(player.injury_status.as_deref()),
        projected_points,
        projection_estimated,
        starter,
    }
}

fn roster(value: &Value, team_id: &TeamId) -> Result<Normalized, TierError> {
    let teams = value
        .get("teams")
        .and_then(Value::as_array)
        .ok_or_else(|| parse_error("payload has no teams array"))?;

    let team_value = teams
        .iter()
        .find(|t| t.get("id").and_then(id_string).as_deref() == Some(team_id.as_str()))
        .ok_or_else(|| parse_error(format!("team {} not present in league payload", team_id)))?;

    let team: Team = serde_json::from_value(team_value.clone())
        .map_err(|e| parse_error(format!("team {}: {}", team_id, e)))?;

    let entries = team_value
        .get("roster")
        .and_then(|r| r.get("entries"))
        .and_then(Value::as_array)
        .ok_or_else(|| parse_error(format!("team {} has no roster entries", team_id)))?;

    let mut deg = Degradations::default();
    let mut dropped = 0;
    let mut players = Vec::with_capacity(entries.len());

    for entry in entries {
        let Ok(entry) = serde_json::from_value::<RosterEntry>(entry.clone()) else {
            dropped += 1;
            continue;
        };
        let Some(player) = entry.player_pool_entry.and_then(|p| p.player) else {
            dropped += 1;
            continue;
        };
        let starter = entry
            .lineup_slot_id
            .is_some_and(|slot| !NON_STARTER_SLOTS.contains(&slot));
        players.push(canonical_player(&player, starter));
    }
    deg.note_count(dropped, "roster entries without player data dropped");

    Ok(deg.finish(Payload::Roster(CanonicalRoster {
        team_id: team_id.clone(),
        team_name: team.display_name(),
        players,
    })))
}

fn team_ref(id: Option<i64>) -> Option<TeamId> {
    id.filter(|id| *id > 0).map(|id| TeamId::from(id.unsigned_abs()))
}

fn transaction_kind(tx: &Transaction) -> Option<TransactionKind> {
    let kind = tx.kind.as_deref().unwrap_or_default().to_uppercase();
    match kind.as_str() {
        "WAIVER" => Some(TransactionKind::Waiver),
        k if k.starts_with("TRADE") => Some(TransactionKind::Trade),
        "FREEAGENT" => {
            let adds = tx
                .items
                .iter()
                .any(|i| i.kind.as_deref() == Some("ADD"));
            Some(if adds {
                TransactionKind::Add
            } else {
                TransactionKind::Drop
            })
        }
        other => TransactionKind::from_text(other),
    }
}

fn transaction_moves(tx: &Transaction) -> Vec<TransactionMove> {
    let mut moves = Vec::new();
    for item in &tx.items {
        let Some(player_id) = item.player_id else {
            continue;
        };
        let player_id = PlayerId::from(player_id.unsigned_abs());
        let mut push = |direction, team_id| {
            moves.push(TransactionMove {
                player_id: player_id.clone(),
                player_name: None,
                direction,
                team_id,
            })
        };
        match item.kind.as_deref() {
            Some("ADD") => push(MoveDirection::In, team_ref(item.to_team_id)),
            Some("DROP") => push(MoveDirection::Out, team_ref(item.from_team_id)),
            Some("TRADE") => {
                push(MoveDirection::Out, team_ref(item.from_team_id));
                push(MoveDirection::In, team_ref(item.to_team_id));
            }
            _ => {}
        }
    }
    moves
}

fn transactions(value: &Value) -> Result<Normalized, TierError> {
    let list = value
        .get("transactions")
        .and_then(Value::as_array)
        .ok_or_else(|| parse_error("payload has no transactions array"))?;

    let mut deg = Degradations::default();
    let mut unreadable = 0;
    let mut raw_only = 0;
    let mut undated = 0;
    let mut out = Vec::with_capacity(list.len());

    for item in list {
        let Ok(tx) = serde_json::from_value::<Transaction>(item.clone()) else {
            unreadable += 1;
            continue;
        };
        if tx.status.as_deref().is_some_and(|s| s != "EXECUTED") {
            continue;
        }
        if matches!(tx.kind.as_deref(), Some("ROSTER") | Some("FUTURE_ROSTER")) {
            continue;
        }
        let Some(kind) = transaction_kind(&tx) else {
            unreadable += 1;
            continue;
        };

        let date = match tx
            .process_date
            .or(tx.proposed_date)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        {
            Some(date) => date,
            None => {
                undated += 1;
                Utc::now()
            }
        };

        let moves = transaction_moves(&tx);
        let raw_text = if moves.is_empty() {
            raw_only += 1;
            Some(item.to_string())
        } else {
            None
        };

        let bid = match kind {
            TransactionKind::Waiver => tx
                .bid_amount
                .filter(|b| b.is_finite() && *b > 0.0)
                .map(|b| b.round() as u32),
            _ => None,
        };

        out.push(CanonicalTransaction {
            date,
            kind,
            moves,
            bid,
            raw_text,
        });
    }

    deg.note_count(unreadable, "transactions of unknown shape skipped");
    deg.note_count(raw_only, "transactions kept as raw text");
    deg.note_count(undated, "transactions without a date");

    out.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(deg.finish(Payload::Transactions(out)))
}

fn user_profile(value: &Value, user_id: &UserId, season: Season) -> Result<Normalized, TierError> {
    let profile: FanProfile = serde_json::from_value(value.clone())
        .map_err(|e| parse_error(format!("fan profile: {}", e)))?;

    let details = profile.profile.as_ref();
    let display_name = profile
        .display_name
        .clone()
        .or_else(|| details.and_then(|d| d.display_name.clone()))
        .or_else(|| details.and_then(|d| d.user_name.clone()))
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| user_id.to_string());

    let mut leagues: Vec<LeagueMembership> = Vec::new();
    let entries = profile
        .preferences
        .iter()
        .filter_map(|p| p.meta_data.as_ref()?.entry.as_ref())
        .filter(|e| e.game_id.unwrap_or(1) == 1)
        .filter(|e| e.season_id.map_or(true, |s| s == season.as_u16()));

    for entry in entries {
        let team_name = [entry.entry_location.as_deref(), entry.entry_nickname.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
        for group in &entry.groups {
            let league_id = LeagueId::from(group.group_id.unsigned_abs());
            if leagues.iter().any(|l| l.league_id == league_id) {
                continue;
            }
            leagues.push(LeagueMembership {
                league_id,
                league_name: group.group_name.clone(),
                team_id: team_ref(entry.entry_id),
                team_name: Some(team_name.clone()).filter(|n| !n.is_empty()),
            });
        }
    }

    Ok(Normalized::clean(Payload::UserProfile(CanonicalUserProfile {
        user_id: UserId::new(profile.id),
        display_name,
        avatar: details.and_then(|d| d.avatar_url.clone()),
        leagues,
    })))
}

fn league_settings(
    value: &Value,
    league_id: &LeagueId,
    season: Season,
) -> Result<Normalized, TierError> {
    let envelope: LeagueEnvelope = serde_json::from_value(value.clone())
        .map_err(|e| parse_error(format!("league settings: {}", e)))?;
    let settings = envelope.settings;
    let mut deg = Degradations::default();

    let name = match settings.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            deg.note("league name missing");
            format!("League {}", league_id)
        }
    };

    let team_count = settings
        .size
        .unwrap_or_else(|| envelope.teams.len() as u32);
    if team_count == 0 {
        deg.note("team count missing");
    }

    let mut roster_positions = Vec::new();
    let mut unreadable = 0;
    let mut slot_counts = BTreeMap::new();
    for (key, raw_count) in &settings.roster_settings.lineup_slot_counts {
        match (key.trim().parse::<u8>(), raw_count.as_u64()) {
            (Ok(slot), Some(count)) => {
                slot_counts.insert(slot, count);
            }
            _ => unreadable += 1,
        }
    }
    for (slot, count) in slot_counts {
        if count == 0 || NON_STARTER_SLOTS.contains(&slot) {
            continue;
        }
        match slot_label(slot) {
            Some(label) => {
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                push_lineup_slots(&mut roster_positions, label, count, &mut deg);
            }
            None => deg.note(format!("unknown lineup slot {}", slot)),
        }
    }
    deg.note_count(unreadable, "unreadable lineup slot counts skipped");

    let reception_points = settings
        .scoring_settings
        .scoring_items
        .iter()
        .find(|item| item.stat_id == RECEPTION_STAT_ID)
        .map(|item| item.points)
        .unwrap_or(0.0);

    let acquisition = &settings.acquisition_settings;
    let waiver_budget = if acquisition.is_using_acquisition_budget == Some(false) {
        None
    } else {
        acquisition.acquisition_budget.filter(|b| *b > 0)
    };

    Ok(deg.finish(Payload::LeagueSettings(CanonicalLeagueSettings {
        league_id: envelope
            .id
            .map(|id| LeagueId::from(id.unsigned_abs()))
            .unwrap_or_else(|| league_id.clone()),
        name,
        season: envelope.season_id.map(Season::new).unwrap_or(season),
        team_count,
        roster_positions,
        reception_points,
        scoring_format: ScoringFormat::from_reception_points(reception_points),
        waiver_budget,
    })))
}

fn players(value: &Value) -> Result<Normalized, TierError> {
    // players_wl returns a bare array; kona views wrap each player in {"player": {...}}
    let list = match value {
        Value::Array(items) => items,
        other => other
            .get("players")
            .and_then(Value::as_array)
            .ok_or_else(|| parse_error("payload is not a player list"))?,
    };

    let mut deg = Degradations::default();
    let mut dropped = 0;
    let mut out = Vec::with_capacity(list.len());

    for item in list {
        let raw = item.get("player").unwrap_or(item);
        let Ok(player) = serde_json::from_value::<Player>(raw.clone()) else {
            dropped += 1;
            continue;
        };
        // IDP and coaching entries are not fantasy-relevant
        if player.default_position_id.and_then(position_from_id).is_none() {
            continue;
        }
        out.push(canonical_player(&player, false));
    }
    deg.note_count(dropped, "directory entries without an id dropped");

    Ok(deg.finish(Payload::Players(out)))
}
