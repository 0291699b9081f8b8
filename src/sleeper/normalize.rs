//! Sleeper payloads -> canonical models.
//!
//! Sleeper rosters only carry player ids, so roster normalization resolves
//! names and positions through the player directory. Team defenses use the
//! team abbreviation as their id and resolve without it.

use crate::cli::types::{LeagueId, PlayerId, Season, TeamId, UserId};
use crate::error::TierError;
use crate::models::{
    CanonicalLeagueSettings, CanonicalPlayer, CanonicalRoster, CanonicalTransaction,
    CanonicalUserProfile, InjuryStatus, LeagueMembership, MoveDirection, Payload, Position,
    ScoringFormat, TransactionKind, TransactionMove,
};
use crate::normalize::{id_string, Degradations, Normalized};
use crate::request::LogicalRequest;
use crate::sleeper::types::{League, LeagueSummary, Player, Roster, SleeperRaw, Transaction, User};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{HashMap, HashSet};


const CONTEXT: &str = "sleeper normalizer";

/// Roster slots that are not part of the starting lineup.
const RESERVE_SLOTS: [&str; 4] = ["BN", "IR", "TAXI", "RES"];

/// Waiver type for FAAB bidding.
const FAAB_WAIVER_TYPE: u8 = 2;

fn parse_error(message: impl Into<String>) -> TierError {
    TierError::parse(CONTEXT, message)
}

pub fn normalize(request: &LogicalRequest, raw: SleeperRaw) -> Result<Normalized, TierError> {
    match (request, raw) {
        (
            LogicalRequest::Roster { team_id, .. },
            SleeperRaw::Roster {
                rosters,
                users,
                directory,
            },
        ) => roster(team_id, &rosters, &users, directory.as_deref()),
        (LogicalRequest::Transactions { .. }, SleeperRaw::Transactions(value)) => {
            transactions(&value)
        }
        (LogicalRequest::LeagueSettings { league_id, season }, SleeperRaw::League(value)) => {
            league_settings(&value, league_id, *season)
        }
        (LogicalRequest::UserProfile { .. }, SleeperRaw::User { user, leagues }) => {
            user_profile(&user, &leagues)
        }
        (LogicalRequest::PlayerDirectory { .. }, SleeperRaw::Players(value)) => players(&value),
        (request, _) => Err(parse_error(format!(
            "raw payload does not match a {} request",
            request.operation()
        ))),
    }
}

/// Team defenses are keyed by their abbreviation ("KC", "SF").
fn is_team_defense_id(id: &str) -> bool {
    !id.is_empty() && id.len() <= 3 && id.chars().all(|c| c.is_ascii_alphabetic())
}

fn roster(
    team_id: &TeamId,
    rosters: &Value,
    users: &Value,
    directory: Option<&[CanonicalPlayer]>,
) -> Result<Normalized, TierError> {
    let rosters = rosters
        .as_array()
        .ok_or_else(|| parse_error("rosters payload is not an array"))?;

    let raw_roster = rosters
        .iter()
        .find(|r| r.get("roster_id").and_then(id_string).as_deref() == Some(team_id.as_str()))
        .ok_or_else(|| parse_error(format!("roster {} not present in league", team_id)))?;
    let roster: Roster = serde_json::from_value(raw_roster.clone())
        .map_err(|e| parse_error(format!("roster {}: {}", team_id, e)))?;

    let mut deg = Degradations::default();

    let owner = roster.owner_id.as_deref().and_then(|owner_id| {
        users
            .as_array()?
            .iter()
            .filter_map(|u| serde_json::from_value::<User>(u.clone()).ok())
            .find(|u| u.user_id == owner_id)
    });
    let team_name = owner
        .as_ref()
        .and_then(|u| {
            u.metadata
                .as_ref()
                .and_then(|m| m.team_name.clone())
                .filter(|n| !n.trim().is_empty())
                .or_else(|| u.display_name.clone())
        })
        .unwrap_or_else(|| format!("Team {}", roster.roster_id));
    if roster.owner_id.is_some() && owner.is_none() {
        deg.note("league users unavailable; team name is generic");
    }

    let index: HashMap<&str, &CanonicalPlayer> = directory
        .unwrap_or_default()
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();

    let starters: Vec<&str> = roster
        .starters
        .iter()
        .flatten()
        .map(String::as_str)
        .filter(|id| *id != "0")
        .collect();
    let starter_set: HashSet<&str> = starters.iter().copied().collect();

    // Starters in lineup order, then the bench in roster order
    let ordered = starters.iter().copied().chain(
        roster
            .players
            .iter()
            .flatten()
            .map(String::as_str)
            .filter(|id| !starter_set.contains(id)),
    );

    let mut unresolved = 0;
    let mut players = Vec::new();
    for id in ordered {
        let starter = starter_set.contains(id);
        let player = match index.get(id) {
            Some(known) => CanonicalPlayer {
                starter,
                ..(*known).clone()
            },
            None if is_team_defense_id(id) => team_defense(id, starter),
            None => {
                unresolved += 1;
                placeholder(id, starter)
            }
        };
        players.push(player);
    }

    if directory.is_none() && unresolved > 0 {
        deg.note(format!(
            "player directory unavailable; {} players unresolved",
            unresolved
        ));
    } else {
        deg.note_count(unresolved, "roster players missing from the player directory");
    }

    Ok(deg.finish(Payload::Roster(CanonicalRoster {
        team_id: team_id.clone(),
        team_name,
        players,
    })))
}

fn team_defense(abbrev: &str, starter: bool) -> CanonicalPlayer {
    let (projected_points, projection_estimated) =
        CanonicalPlayer::projection_or_estimate(Position::DEF, None);
    CanonicalPlayer {
        id: PlayerId::new(abbrev),
        name: format!("{} Defense", abbrev),
        position: Position::DEF,
        pro_team: abbrev.to_string(),
        injury_status: InjuryStatus::Active,
        projected_points,
        projection_estimated,
        starter,
    }
}

fn placeholder(id: &str, starter: bool) -> CanonicalPlayer {
    let (projected_points, projection_estimated) =
        CanonicalPlayer::projection_or_estimate(Position::FALLBACK, None);
    CanonicalPlayer {
        id: PlayerId::new(id),
        name: format!("Player {}", id),
        position: Position::FALLBACK,
        pro_team: "FA".to_string(),
        injury_status: InjuryStatus::Active,
        projected_points,
        projection_estimated,
        starter,
    }
}

fn moves_from(map: Option<&std::collections::BTreeMap<String, i64>>, direction: MoveDirection) -> Vec<TransactionMove> {
    map.into_iter()
        .flatten()
        .map(|(player_id, roster_id)| TransactionMove {
            player_id: PlayerId::new(player_id.as_str()),
            player_name: None,
            direction,
            team_id: Some(TeamId::from(roster_id.unsigned_abs())),
        })
        .collect()
}

fn transactions(value: &Value) -> Result<Normalized, TierError> {
    let list = value
        .as_array()
        .ok_or_else(|| parse_error("transactions payload is not an array"))?;

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
        if tx.status.as_deref().is_some_and(|s| s != "complete") {
            continue;
        }

        let has_adds = tx.adds.as_ref().is_some_and(|a| !a.is_empty());
        let kind = match tx.kind.as_deref() {
            Some("trade") => TransactionKind::Trade,
            Some("waiver") => TransactionKind::Waiver,
            Some("free_agent") if has_adds => TransactionKind::Add,
            Some("free_agent") => TransactionKind::Drop,
            other => match other.and_then(TransactionKind::from_text) {
                Some(kind) => kind,
                None => {
                    unreadable += 1;
                    continue;
                }
            },
        };

        let date = match tx
            .status_updated
            .or(tx.created)
            .and_then(DateTime::<Utc>::from_timestamp_millis)
        {
            Some(date) => date,
            None => {
                undated += 1;
                Utc::now()
            }
        };

        let mut moves = moves_from(tx.drops.as_ref(), MoveDirection::Out);
        moves.extend(moves_from(tx.adds.as_ref(), MoveDirection::In));

        let raw_text = if moves.is_empty() {
            raw_only += 1;
            Some(item.to_string())
        } else {
            None
        };

        let bid = match kind {
            TransactionKind::Waiver => tx.settings.as_ref().and_then(|s| s.waiver_bid),
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

fn league_settings(
    value: &Value,
    league_id: &LeagueId,
    season: Season,
) -> Result<Normalized, TierError> {
    let league: League = serde_json::from_value(value.clone())
        .map_err(|e| parse_error(format!("league: {}", e)))?;
    let mut deg = Degradations::default();

    let name = match league.name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => {
            deg.note("league name missing");
            format!("League {}", league_id)
        }
    };

    let team_count = league.total_rosters.unwrap_or_else(|| {
        deg.note("team count missing");
        0
    });

    let roster_positions = league
        .roster_positions
        .iter()
        .filter(|slot| !RESERVE_SLOTS.contains(&slot.as_str()))
        .cloned()
        .collect();

    let reception_points = league.scoring_settings.get("rec").copied().unwrap_or(0.0);

    let block = league.settings.unwrap_or_default();
    let waiver_budget = if block.waiver_type == Some(FAAB_WAIVER_TYPE) {
        block.waiver_budget
    } else {
        None
    };

    Ok(deg.finish(Payload::LeagueSettings(CanonicalLeagueSettings {
        league_id: LeagueId::new(league.league_id),
        name,
        season: league
            .season
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(season),
        team_count,
        roster_positions,
        reception_points,
        scoring_format: ScoringFormat::from_reception_points(reception_points),
        waiver_budget,
    })))
}

fn user_profile(user: &Value, leagues: &Value) -> Result<Normalized, TierError> {
    let user: User =
        serde_json::from_value(user.clone()).map_err(|e| parse_error(format!("user: {}", e)))?;
    let mut deg = Degradations::default();

    let leagues = match leagues.as_array() {
        Some(list) => list
            .iter()
            .filter_map(|l| serde_json::from_value::<LeagueSummary>(l.clone()).ok())
            .map(|l| LeagueMembership {
                league_id: LeagueId::new(l.league_id),
                league_name: l.name,
                team_id: None,
                team_name: None,
            })
            .collect(),
        None => {
            deg.note("league list unavailable");
            Vec::new()
        }
    };

    let display_name = user
        .display_name
        .clone()
        .or_else(|| user.username.clone())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| user.user_id.clone());

    Ok(deg.finish(Payload::UserProfile(CanonicalUserProfile {
        user_id: UserId::new(user.user_id),
        display_name,
        avatar: user
            .avatar
            .map(|a| format!("https://sleepercdn.com/avatars/{}", a)),
        leagues,
    })))
}

fn players(value: &Value) -> Result<Normalized, TierError> {
    let map = value
        .as_object()
        .ok_or_else(|| parse_error("player directory is not an object"))?;

    let mut out = Vec::new();
    for (id, raw) in map {
        let Ok(player) = serde_json::from_value::<Player>(raw.clone()) else {
            continue;
        };
        let position = player
            .position
            .as_deref()
            .and_then(Position::parse_label)
            .or_else(|| {
                player
                    .fantasy_positions
                    .iter()
                    .flatten()
                    .find_map(|p| Position::parse_label(p))
            });
        // Offensive linemen, IDP and retired entries are not fantasy-relevant
        let Some(position) = position else {
            continue;
        };

        let (projected_points, projection_estimated) =
            CanonicalPlayer::projection_or_estimate(position, None);
        out.push(CanonicalPlayer {
            id: PlayerId::new(id.as_str()),
            name: player
                .display_name()
                .unwrap_or_else(|| format!("Player {}", id)),
            position,
            pro_team: player.team.clone().unwrap_or_else(|| "FA".to_string()),
            injury_status: InjuryStatus::from_label(player.injury_status.as_deref()),
            projected_points,
            projection_estimated,
            starter: false,
        });
    }

    Ok(Normalized::clean(Payload::Players(out)))
}
