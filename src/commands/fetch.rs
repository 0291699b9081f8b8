//! `get` command: resolve one logical request and print the envelope.

use crate::{
    cli::{CommonArgs, GetCmd},
    config::AggregatorConfig,
    facade::Aggregator,
    models::{FetchResult, InjuryStatus, MoveDirection, Payload, Position},
    LogicalRequest, Platform, Result,
};

use super::resolve_league_id;

/// Turn a parsed subcommand into the platform and logical request it names.
pub fn request_for(cmd: &GetCmd, default_season: crate::Season) -> Result<(Platform, LogicalRequest)> {
    let season = |common: &CommonArgs| common.season.unwrap_or(default_season);

    let pair = match cmd {
        GetCmd::Roster {
            common,
            league_id,
            team_id,
        } => (
            common.platform,
            LogicalRequest::Roster {
                league_id: resolve_league_id(league_id.clone())?,
                team_id: team_id.clone(),
                season: season(common),
            },
        ),
        GetCmd::Transactions {
            common,
            league_id,
            week,
        } => (
            common.platform,
            LogicalRequest::Transactions {
                league_id: resolve_league_id(league_id.clone())?,
                period: *week,
                season: season(common),
            },
        ),
        GetCmd::Profile { common, user_id } => (
            common.platform,
            LogicalRequest::UserProfile {
                user_id: user_id.clone(),
                season: season(common),
            },
        ),
        GetCmd::Settings { common, league_id } => (
            common.platform,
            LogicalRequest::LeagueSettings {
                league_id: resolve_league_id(league_id.clone())?,
                season: season(common),
            },
        ),
        GetCmd::Players { common } => (
            common.platform,
            LogicalRequest::PlayerDirectory {
                season: season(common),
            },
        ),
    };
    Ok(pair)
}

fn common(cmd: &GetCmd) -> &CommonArgs {
    match cmd {
        GetCmd::Roster { common, .. }
        | GetCmd::Transactions { common, .. }
        | GetCmd::Profile { common, .. }
        | GetCmd::Settings { common, .. }
        | GetCmd::Players { common } => common,
    }
}

/// Handle `get <what>`: fetch through the aggregator and print the result.
pub async fn handle_get(cmd: GetCmd) -> Result<FetchResult> {
    let config = AggregatorConfig::from_env()?;
    let (platform, request) = request_for(&cmd, config.season)?;
    let args = common(&cmd);

    // tarpaulin::skip - network and disk I/O, exercised by the integration tests
    let aggregator = Aggregator::new(config)?;
    if args.refresh {
        aggregator.invalidate(&request.fingerprint(platform));
    }
    let result = aggregator.fetch(platform, request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("{}", render_text(&result));
    }
    Ok(result)
}

/// Human-readable rendering of an envelope.
pub fn render_text(result: &FetchResult) -> String {
    let mut lines = Vec::new();

    let source = result
        .source
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string());
    lines.push(format!(
        "{} {}: {} (source: {})",
        result.platform,
        result.fetched_at.format("%Y-%m-%d %H:%M:%S"),
        result.status,
        source
    ));
    if let Some(message) = &result.message {
        lines.push(format!("note: {}", message));
    }

    match &result.payload {
        Some(Payload::Roster(roster)) => {
            lines.push(format!("{} (team {})", roster.team_name, roster.team_id));
            for player in &roster.players {
                let mut line = format!(
                    "{} {:<3} {:<26} {:<4} {:>5.1}{}",
                    if player.starter { "*" } else { " " },
                    player.position.to_string(),
                    player.name,
                    player.pro_team,
                    player.projected_points,
                    if player.projection_estimated { "~" } else { "" }
                );
                if player.injury_status != InjuryStatus::Active {
                    line.push_str(&format!("  {}", player.injury_status));
                }
                lines.push(line);
            }
        }
        Some(Payload::Transactions(transactions)) => {
            if transactions.is_empty() {
                lines.push("No transactions".to_string());
            }
            for tx in transactions {
                let detail = match &tx.raw_text {
                    Some(text) if tx.moves.is_empty() => text.clone(),
                    _ => tx
                        .moves
                        .iter()
                        .map(|m| {
                            let sign = match m.direction {
                                MoveDirection::In => "+",
                                MoveDirection::Out => "-",
                            };
                            let who = m.player_name.clone().unwrap_or_else(|| m.player_id.to_string());
                            match &m.team_id {
                                Some(team) => format!("{}{} (team {})", sign, who, team),
                                None => format!("{}{}", sign, who),
                            }
                        })
                        .collect::<Vec<_>>()
                        .join(", "),
                };
                let bid = tx.bid.map(|b| format!(" [${}]", b)).unwrap_or_default();
                lines.push(format!(
                    "{} {:<6} {}{}",
                    tx.date.format("%Y-%m-%d"),
                    tx.kind.to_string(),
                    detail,
                    bid
                ));
            }
        }
        Some(Payload::UserProfile(profile)) => {
            lines.push(format!("{} ({})", profile.display_name, profile.user_id));
            for league in &profile.leagues {
                let name = league.league_name.as_deref().unwrap_or("unnamed league");
                match (&league.team_id, &league.team_name) {
                    (Some(id), Some(team)) => {
                        lines.push(format!("  {} [{}]: {} (team {})", name, league.league_id, team, id))
                    }
                    _ => lines.push(format!("  {} [{}]", name, league.league_id)),
                }
            }
        }
        Some(Payload::LeagueSettings(settings)) => {
            lines.push(format!("{} ({} season)", settings.name, settings.season));
            lines.push(format!("Teams: {}", settings.team_count));
            lines.push(format!("Lineup: {}", settings.roster_positions.join(", ")));
            lines.push(format!(
                "Scoring: {:?} ({} per reception)",
                settings.scoring_format, settings.reception_points
            ));
            if let Some(budget) = settings.waiver_budget {
                lines.push(format!("FAAB budget: ${}", budget));
            }
        }
        Some(Payload::Players(players)) => {
            lines.push(format!("{} players", players.len()));
            for position in Position::ALL {
                let count = players.iter().filter(|p| p.position == position).count();
                lines.push(format!("  {:<3} {}", position.to_string(), count));
            }
        }
        None => {}
    }

    lines.join("\n")
}
