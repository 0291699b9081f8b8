//! Scraped pages -> canonical models.
//!
//! Pages are tried two ways. If the page embeds application state, the JSON
//! is located and handed to the platform normalizer as if it came from the
//! API. Otherwise the visible tables are read, which recovers less: roster
//! ids are derived from names and transactions keep only their text.

use crate::cli::types::{LeagueId, Platform, PlayerId, Season, TeamId};
use crate::core::html::{extract_embedded_json, table_rows};
use crate::error::TierError;
use crate::models::{
    CanonicalLeagueSettings, CanonicalPlayer, CanonicalRoster, CanonicalTransaction,
    InjuryStatus, Payload, Position, ScoringFormat, TransactionKind,
};
use crate::normalize::{find_object_with_key, push_lineup_slots, Degradations, Normalized};
use crate::request::LogicalRequest;
use crate::sleeper::types::SleeperRaw;
use chrono::{NaiveDate, TimeZone, Utc};
use serde_json::Value;
use tracing::debug;

/// Slots that mark a rostered player as not starting.
const BENCH_SLOTS: [&str; 6] = ["BE", "BN", "BENCH", "IR", "RES", "TAXI"];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%b %d, %Y", "%B %d, %Y"];

fn context(platform: Platform) -> String {
    format!("{} page normalizer", platform)
}

pub fn normalize_page(
    platform: Platform,
    request: &LogicalRequest,
    body: &str,
) -> Result<Normalized, TierError> {
    let embedded = extract_embedded_json(body).map(|state| from_state(platform, request, &state));

    match embedded {
        Some(Ok(normalized)) => Ok(normalized),
        Some(Err(state_err)) => {
            debug!("Embedded page state unusable ({}), reading tables", state_err);
            from_tables(platform, request, body).map_err(|_| state_err)
        }
        None => from_tables(platform, request, body),
    }
}

/// Route embedded page state to the platform normalizer.
fn from_state(
    platform: Platform,
    request: &LogicalRequest,
    state: &Value,
) -> Result<Normalized, TierError> {
    let missing = |key: &str| {
        TierError::parse(
            context(platform),
            format!("embedded state has no {} object", key),
        )
    };

    match (platform, request) {
        (Platform::Espn, LogicalRequest::Roster { .. }) => {
            let league = find_object_with_key(state, "teams").ok_or_else(|| missing("teams"))?;
            crate::espn::normalize::normalize(request, league)
        }
        (Platform::Espn, LogicalRequest::Transactions { .. }) => {
            let block =
                find_object_with_key(state, "transactions").ok_or_else(|| missing("transactions"))?;
            crate::espn::normalize::normalize(request, block)
        }
        (Platform::Espn, LogicalRequest::LeagueSettings { .. }) => {
            let league =
                find_object_with_key(state, "settings").ok_or_else(|| missing("settings"))?;
            crate::espn::normalize::normalize(request, league)
        }
        (Platform::Sleeper, LogicalRequest::Roster { .. }) => {
            let block = find_object_with_key(state, "rosters").ok_or_else(|| missing("rosters"))?;
            let users = block
                .get("users")
                .cloned()
                .or_else(|| find_object_with_key(state, "users").and_then(|u| u.get("users").cloned()))
                .unwrap_or_else(|| Value::Array(Vec::new()));
            let raw = SleeperRaw::Roster {
                rosters: block["rosters"].clone(),
                users,
                directory: None,
            };
            crate::sleeper::normalize::normalize(request, raw)
        }
        (Platform::Sleeper, LogicalRequest::Transactions { .. }) => {
            let block =
                find_object_with_key(state, "transactions").ok_or_else(|| missing("transactions"))?;
            let raw = SleeperRaw::Transactions(block["transactions"].clone());
            crate::sleeper::normalize::normalize(request, raw)
        }
        (Platform::Sleeper, LogicalRequest::LeagueSettings { .. }) => {
            let league = find_object_with_key(state, "roster_positions")
                .ok_or_else(|| missing("league"))?;
            crate::sleeper::normalize::normalize(request, SleeperRaw::League(league.clone()))
        }
        (_, request) => Err(TierError::parse(
            context(platform),
            format!("pages do not carry {} data", request.operation()),
        )),
    }
}

fn from_tables(
    platform: Platform,
    request: &LogicalRequest,
    body: &str,
) -> Result<Normalized, TierError> {
    let rows: Vec<Vec<String>> = table_rows(body)
        .into_iter()
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();
    if rows.is_empty() {
        return Err(TierError::parse(
            context(platform),
            "page has neither embedded state nor tables",
        ));
    }

    match request {
        LogicalRequest::Roster { team_id, .. } => roster_table(platform, team_id, &rows),
        LogicalRequest::Transactions { .. } => Ok(transaction_table(&rows)),
        LogicalRequest::LeagueSettings { league_id, season } => {
            settings_table(platform, league_id, *season, &rows)
        }
        other => Err(TierError::parse(
            context(platform),
            format!("pages do not carry {} data", other.operation()),
        )),
    }
}

fn column(header: &[String], names: &[&str]) -> Option<usize> {
    header.iter().position(|cell| {
        let cell = cell.trim().to_lowercase();
        names.iter().any(|name| cell == *name || cell.starts_with(name))
    })
}

/// Stable id for a player known only by name.
fn name_id(platform: Platform, name: &str) -> PlayerId {
    let slug: String = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect();
    PlayerId::new(format!("{}-page-{}", platform, slug.trim_matches('-')))
}

fn roster_table(
    platform: Platform,
    team_id: &TeamId,
    rows: &[Vec<String>],
) -> Result<Normalized, TierError> {
    let header_idx = rows
        .iter()
        .position(|row| column(row, &["player"]).is_some())
        .ok_or_else(|| TierError::parse(context(platform), "page has no roster table"))?;
    let header = &rows[header_idx];
    let player_col = column(header, &["player"]).unwrap_or(0);
    let pos_col = column(header, &["pos"]);
    let slot_col = column(header, &["slot"]);
    let proj_col = column(header, &["proj"]);
    let team_col = column(header, &["team", "nfl"]);
    let status_col = column(header, &["status", "inj"]);

    let cell = |row: &Vec<String>, col: Option<usize>| -> Option<String> {
        col.and_then(|c| row.get(c))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    };

    let mut players = Vec::new();
    for row in &rows[header_idx + 1..] {
        let Some(name) = cell(row, Some(player_col)) else {
            continue;
        };
        if column(row, &["player"]).is_some() {
            // Repeated header, e.g. starters and bench as separate tables
            continue;
        }

        let position = match cell(row, pos_col).as_deref().and_then(Position::parse_label) {
            Some(position) => position,
            None => {
                debug!("No readable position for {}, using {}", name, Position::FALLBACK);
                Position::FALLBACK
            }
        };
        let starter = cell(row, slot_col)
            .map(|slot| !BENCH_SLOTS.contains(&slot.to_uppercase().as_str()))
            .unwrap_or(true);
        let projected = cell(row, proj_col).and_then(|p| p.parse::<f64>().ok());
        let (projected_points, projection_estimated) =
            CanonicalPlayer::projection_or_estimate(position, projected);

        players.push(CanonicalPlayer {
            id: name_id(platform, &name),
            name,
            position,
            pro_team: cell(row, team_col).unwrap_or_else(|| "FA".to_string()),
            injury_status: InjuryStatus::from_label(cell(row, status_col).as_deref()),
            projected_points,
            projection_estimated,
            starter,
        });
    }

    if players.is_empty() {
        return Err(TierError::parse(context(platform), "roster table has no player rows"));
    }

    let mut deg = Degradations::default();
    deg.note(format!(
        "roster read from page table; {} player ids derived from names",
        players.len()
    ));

    Ok(deg.finish(Payload::Roster(CanonicalRoster {
        team_id: team_id.clone(),
        team_name: format!("Team {}", team_id),
        players,
    })))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text.trim(), format).ok())
}

fn is_header_row(row: &[String]) -> bool {
    column(row, &["date"]).is_some() && column(row, &["type", "action", "detail"]).is_some()
}

fn transaction_table(rows: &[Vec<String>]) -> Normalized {
    let mut deg = Degradations::default();
    let mut undated = 0;
    let mut out = Vec::new();

    for row in rows.iter().filter(|row| !is_header_row(row)) {
        let text = row
            .iter()
            .filter(|cell| !cell.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        // Lineup changes and other non-transactions share the activity table
        let Some(kind) = TransactionKind::from_text(&text) else {
            continue;
        };

        let day = row
            .iter()
            .find_map(|cell| parse_date(cell))
            .and_then(|day| day.and_hms_opt(0, 0, 0));
        let date = match day {
            Some(day) => Utc.from_utc_datetime(&day),
            None => {
                undated += 1;
                Utc::now()
            }
        };

        out.push(CanonicalTransaction {
            date,
            kind,
            moves: Vec::new(),
            bid: None,
            raw_text: Some(text),
        });
    }

    out.sort_by(|a, b| b.date.cmp(&a.date));
    deg.note_count(out.len(), "transactions kept as raw text");
    deg.note_count(undated, "transactions without a readable date");
    deg.finish(Payload::Transactions(out))
}

fn reception_points(value: &str) -> Option<f64> {
    let lower = value.trim().to_lowercase();
    if let Ok(points) = lower.parse::<f64>() {
        return Some(points);
    }
    if lower.contains("half") {
        Some(0.5)
    } else if lower.contains("ppr") && !lower.contains("non") {
        Some(1.0)
    } else if lower.contains("standard") || lower.contains("non") {
        Some(0.0)
    } else {
        None
    }
}

fn leading_number(value: &str) -> Option<u32> {
    let digits: String = value
        .trim()
        .trim_start_matches('$')
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn settings_table(
    platform: Platform,
    league_id: &LeagueId,
    season: Season,
    rows: &[Vec<String>],
) -> Result<Normalized, TierError> {
    let mut name = None;
    let mut team_count = None;
    let mut reception = None;
    let mut budget = None;
    let mut roster_positions = Vec::new();
    let mut recognized = 0;
    let mut deg = Degradations::default();

    for row in rows.iter().filter(|row| row.len() >= 2) {
        let label = row[0].trim().to_lowercase();
        let value = row[1].trim();

        if label.contains("league name") || label == "name" {
            name = Some(value.to_string()).filter(|v| !v.is_empty());
        } else if label.contains("number of teams") || label == "teams" {
            team_count = leading_number(value);
        } else if label.contains("reception") || label.contains("ppr") || label.contains("scoring type") {
            reception = reception_points(value).or(reception);
        } else if label.contains("faab") || label.contains("budget") {
            budget = leading_number(value);
        } else if let Some(slot) = lineup_slot(&row[0]) {
            let count = leading_number(value).unwrap_or(0);
            push_lineup_slots(&mut roster_positions, &slot, count, &mut deg);
        } else {
            continue;
        }
        recognized += 1;
    }

    if recognized == 0 {
        return Err(TierError::parse(context(platform), "page has no settings table"));
    }

    let name = name.unwrap_or_else(|| {
        deg.note("league name missing");
        format!("League {}", league_id)
    });
    let team_count = team_count.unwrap_or_else(|| {
        deg.note("team count missing");
        0
    });
    let reception_points = reception.unwrap_or(0.0);

    Ok(deg.finish(Payload::LeagueSettings(CanonicalLeagueSettings {
        league_id: league_id.clone(),
        name,
        season,
        team_count,
        roster_positions,
        reception_points,
        scoring_format: ScoringFormat::from_reception_points(reception_points),
        waiver_budget: budget,
    })))
}

/// Starting-slot labels as they appear on settings pages.
fn lineup_slot(label: &str) -> Option<String> {
    let upper = label.trim().to_uppercase();
    match upper.as_str() {
        "FLEX" | "RB/WR/TE" | "W/R/T" => Some("FLEX".to_string()),
        "SUPER_FLEX" | "SUPERFLEX" | "OP" | "Q/W/R/T" => Some("SUPER_FLEX".to_string()),
        _ => Position::parse_label(&upper).map(|p| p.to_string()),
    }
}
