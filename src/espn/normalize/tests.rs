use super::*;
use crate::error::TierErrorKind;
use crate::normalize::MAX_SLOTS_PER_LABEL;
use serde_json::json;

fn roster_request(team: &str) -> LogicalRequest {
    LogicalRequest::Roster {
        league_id: LeagueId::new("83806"),
        team_id: TeamId::new(team),
        season: Season::new(2025),
    }
}

fn entry(id: i64, name: &str, position_id: i64, slot: u8, projection: Option<f64>) -> Value {
    let stats = match projection {
        Some(points) => json!([
            { "statSourceId": 0, "statSplitTypeId": 1, "appliedTotal": 3.0 },
            { "statSourceId": 1, "statSplitTypeId": 1, "appliedTotal": points }
        ]),
        None => json!([]),
    };
    json!({
        "playerId": id,
        "lineupSlotId": slot,
        "playerPoolEntry": {
            "player": {
                "id": id,
                "fullName": name,
                "defaultPositionId": position_id,
                "proTeamId": 12,
                "injuryStatus": "QUESTIONABLE",
                "stats": stats
            }
        }
    })
}

fn league(entries: Vec<Value>) -> Value {
    json!({
        "id": 83806,
        "teams": [
            { "id": 3, "name": "Other Team", "roster": { "entries": [] } },
            { "id": 7, "location": "Gridiron", "nickname": "Gang", "roster": { "entries": entries } }
        ]
    })
}

#[test]
fn test_roster_normalization() {
    let value = league(vec![
        entry(1, "Patrick Mahomes", 1, 0, Some(22.4)),
        entry(2, "Harrison Butker", 5, 17, None),
        entry(3, "Chiefs D/ST", 16, 20, Some(6.0)),
    ]);

    let normalized = normalize(&roster_request("7"), &value).unwrap();
    assert!(normalized.degradations.is_empty());

    let roster = normalized.payload.as_roster().unwrap();
    assert_eq!(roster.team_name, "Gridiron Gang");
    assert_eq!(roster.players.len(), 3);

    let qb = &roster.players[0];
    assert_eq!(qb.position, Position::QB);
    assert_eq!(qb.pro_team, "KC");
    assert_eq!(qb.injury_status, InjuryStatus::Questionable);
    assert_eq!(qb.projected_points, 22.4);
    assert!(!qb.projection_estimated);
    assert!(qb.starter);

    let kicker = &roster.players[1];
    assert_eq!(kicker.position, Position::K);
    assert!(kicker.projection_estimated);
    assert_eq!(kicker.projected_points, Position::K.estimated_points());

    let defense = &roster.players[2];
    assert_eq!(defense.position, Position::DEF);
    assert!(!defense.starter);
}

#[test]
fn test_unknown_position_id_falls_back() {
    let value = league(vec![entry(9, "Mystery Man", 99, 23, Some(5.0))]);
    let normalized = normalize(&roster_request("7"), &value).unwrap();
    let roster = normalized.payload.as_roster().unwrap();
    assert_eq!(roster.players[0].position, Position::FALLBACK);
}

#[test]
fn test_entries_without_player_are_dropped_and_reported() {
    let value = league(vec![
        entry(1, "Patrick Mahomes", 1, 0, Some(22.4)),
        json!({ "playerId": 2, "lineupSlotId": 2 }),
    ]);
    let normalized = normalize(&roster_request("7"), &value).unwrap();
    assert_eq!(normalized.payload.as_roster().unwrap().players.len(), 1);
    assert_eq!(normalized.degradations.len(), 1);
    assert!(normalized.degradations[0].contains("dropped"));
}

#[test]
fn test_roster_shape_errors() {
    let err = normalize(&roster_request("7"), &json!({"status": "ok"})).unwrap_err();
    assert_eq!(err.kind(), TierErrorKind::Parse);

    let err = normalize(&roster_request("42"), &league(vec![])).unwrap_err();
    assert_eq!(err.kind(), TierErrorKind::Parse);

    let no_roster = json!({ "teams": [{ "id": 7, "name": "No view" }] });
    assert!(normalize(&roster_request("7"), &no_roster).is_err());
}

#[test]
fn test_transactions_normalization() {
    let request = LogicalRequest::Transactions {
        league_id: LeagueId::new("83806"),
        period: crate::cli::types::Week::new(3),
        season: Season::new(2025),
    };
    let value = json!({
        "transactions": [
            {
                "id": "a", "type": "WAIVER", "status": "EXECUTED",
                "processDate": 1726000000000i64, "bidAmount": 17,
                "items": [
                    { "playerId": 100, "type": "ADD", "toTeamId": 7, "fromTeamId": 0 },
                    { "playerId": 200, "type": "DROP", "fromTeamId": 7, "toTeamId": 0 }
                ]
            },
            {
                "id": "b", "type": "TRADE_ACCEPT", "status": "EXECUTED",
                "processDate": 1727000000000i64,
                "items": [{ "playerId": 300, "type": "TRADE", "fromTeamId": 3, "toTeamId": 7 }]
            },
            { "id": "c", "type": "WAIVER", "status": "FAILED_INVALIDPLAYERSOURCE", "items": [] },
            { "id": "d", "type": "ROSTER", "status": "EXECUTED", "items": [] },
            { "id": "e", "type": "FREEAGENT", "status": "EXECUTED", "processDate": 1725000000000i64, "items": [] }
        ]
    });

    let normalized = normalize(&request, &value).unwrap();
    let txs = normalized.payload.as_transactions().unwrap();
    assert_eq!(txs.len(), 3);

    // Newest first
    assert_eq!(txs[0].kind, TransactionKind::Trade);
    assert_eq!(txs[0].moves.len(), 2);
    assert_eq!(txs[0].moves[0].direction, MoveDirection::Out);
    assert_eq!(txs[0].moves[0].team_id, Some(TeamId::new("3")));

    let waiver = &txs[1];
    assert_eq!(waiver.kind, TransactionKind::Waiver);
    assert_eq!(waiver.bid, Some(17));
    assert_eq!(waiver.moves[0].team_id, Some(TeamId::new("7")));
    assert_eq!(waiver.moves[1].direction, MoveDirection::Out);

    // Free-agent move with no items keeps its raw text
    assert_eq!(txs[2].kind, TransactionKind::Drop);
    assert!(txs[2].raw_text.is_some());
    assert_eq!(normalized.degradations, vec!["1 transactions kept as raw text"]);
}

#[test]
fn test_league_settings_normalization() {
    let request = LogicalRequest::LeagueSettings {
        league_id: LeagueId::new("83806"),
        season: Season::new(2025),
    };
    let value = json!({
        "id": 83806,
        "seasonId": 2025,
        "settings": {
            "name": "Dynasty Warriors",
            "size": 12,
            "rosterSettings": {
                "lineupSlotCounts": { "0": 1, "2": 2, "4": 2, "6": 1, "16": 1, "17": 1, "20": 7, "21": 1, "23": 1, "8": 0 }
            },
            "scoringSettings": {
                "scoringItems": [
                    { "statId": 53, "points": 0.5 },
                    { "statId": 1, "points": 4.0 }
                ]
            },
            "acquisitionSettings": { "acquisitionBudget": 100, "isUsingAcquisitionBudget": true }
        }
    });

    let normalized = normalize(&request, &value).unwrap();
    assert!(normalized.degradations.is_empty());
    let settings = normalized.payload.as_league_settings().unwrap();
    assert_eq!(settings.name, "Dynasty Warriors");
    assert_eq!(settings.team_count, 12);
    assert_eq!(
        settings.roster_positions,
        vec!["QB", "RB", "RB", "WR", "WR", "TE", "DEF", "K", "FLEX"]
    );
    assert_eq!(settings.scoring_format, ScoringFormat::HalfPpr);
    assert_eq!(settings.waiver_budget, Some(100));
}

fn settings_request() -> LogicalRequest {
    LogicalRequest::LeagueSettings {
        league_id: LeagueId::new("83806"),
        season: Season::new(2025),
    }
}

#[test]
fn test_bad_scoring_override_key_does_not_reject_settings() {
    let value = json!({
        "id": 83806,
        "settings": {
            "name": "Dynasty Warriors",
            "size": 10,
            "scoringSettings": {
                "scoringItems": [{ "statId": 53, "points": 1.0, "pointsOverrides": { "x": 2.0 } }]
            }
        }
    });

    let normalized = normalize(&settings_request(), &value).unwrap();
    let settings = normalized.payload.as_league_settings().unwrap();
    assert_eq!(settings.reception_points, 1.0);
    assert_eq!(settings.scoring_format, ScoringFormat::Ppr);
}

#[test]
fn test_unreadable_slot_counts_are_skipped_and_noted() {
    let value = json!({
        "id": 83806,
        "settings": {
            "name": "Dynasty Warriors",
            "size": 10,
            "rosterSettings": { "lineupSlotCounts": { "QB": 1, "0": "one", "2": 2 } }
        }
    });

    let normalized = normalize(&settings_request(), &value).unwrap();
    let settings = normalized.payload.as_league_settings().unwrap();
    assert_eq!(settings.roster_positions, vec!["RB", "RB"]);
    assert_eq!(
        normalized.degradations,
        vec!["2 unreadable lineup slot counts skipped".to_string()]
    );
}

#[test]
fn test_oversized_slot_count_is_clamped() {
    let value = json!({
        "id": 83806,
        "settings": {
            "name": "Dynasty Warriors",
            "size": 10,
            "rosterSettings": { "lineupSlotCounts": { "0": 3000000, "2": 2 } }
        }
    });

    let normalized = normalize(&settings_request(), &value).unwrap();
    let settings = normalized.payload.as_league_settings().unwrap();
    let qbs = settings.roster_positions.iter().filter(|p| *p == "QB").count();
    assert_eq!(qbs, MAX_SLOTS_PER_LABEL as usize);
    assert_eq!(settings.roster_positions.len(), MAX_SLOTS_PER_LABEL as usize + 2);
    assert_eq!(normalized.degradations.len(), 1);
    assert!(normalized.degradations[0].contains("3000000"));
}

#[test]
fn test_league_settings_without_settings_is_parse_error() {
    let request = LogicalRequest::LeagueSettings {
        league_id: LeagueId::new("83806"),
        season: Season::new(2025),
    };
    let err = normalize(&request, &json!({"teams": []})).unwrap_err();
    assert_eq!(err.kind(), TierErrorKind::Parse);
}

#[test]
fn test_user_profile_normalization() {
    let request = LogicalRequest::UserProfile {
        user_id: UserId::new("{ABC}"),
        season: Season::new(2025),
    };
    let value = json!({
        "id": "{ABC}",
        "profile": { "displayName": "gridiron_guru", "avatarUrl": "https://a/b.png" },
        "preferences": [
            { "metaData": { "entry": {
                "entryId": 7, "entryLocation": "Gridiron", "entryNickname": "Gang",
                "gameId": 1, "seasonId": 2025,
                "groups": [{ "groupId": 83806, "groupName": "Dynasty Warriors" }]
            } } },
            { "metaData": { "entry": { "gameId": 2, "seasonId": 2025, "groups": [{ "groupId": 5 }] } } },
            { "metaData": null }
        ]
    });

    let normalized = normalize(&request, &value).unwrap();
    let profile = normalized.payload.as_user_profile().unwrap();
    assert_eq!(profile.display_name, "gridiron_guru");
    assert_eq!(profile.avatar.as_deref(), Some("https://a/b.png"));
    assert_eq!(profile.leagues.len(), 1);
    assert_eq!(profile.leagues[0].league_id, LeagueId::new("83806"));
    assert_eq!(profile.leagues[0].team_name.as_deref(), Some("Gridiron Gang"));
}

#[test]
fn test_player_directory_normalization() {
    let request = LogicalRequest::PlayerDirectory {
        season: Season::new(2025),
    };
    let value = json!([
        { "id": 1, "fullName": "Josh Allen", "defaultPositionId": 1, "proTeamId": 2 },
        { "id": 2, "fullName": "Linebacker Larry", "defaultPositionId": 11 },
        { "fullName": "No Id" }
    ]);

    let normalized = normalize(&request, &value).unwrap();
    let players = normalized.payload.as_players().unwrap();
    assert_eq!(players.len(), 1);
    assert_eq!(players[0].pro_team, "BUF");
    assert_eq!(normalized.degradations.len(), 1);

    let wrapped = json!({ "players": [{ "player": { "id": 1, "defaultPositionId": 3 } }] });
    let normalized = normalize(&request, &wrapped).unwrap();
    assert_eq!(normalized.payload.as_players().unwrap()[0].position, Position::WR);

    assert!(normalize(&request, &json!("nope")).is_err());
}

#[test]
fn test_position_and_team_tables() {
    assert_eq!(position_from_id(0), Some(Position::QB));
    assert_eq!(position_from_id(6), Some(Position::TE));
    assert_eq!(position_from_id(17), Some(Position::K));
    assert_eq!(position_from_id(7), None);
    assert_eq!(pro_team_abbrev(33), "BAL");
    assert_eq!(pro_team_abbrev(0), "FA");
    assert_eq!(slot_label(23), Some("FLEX"));
    assert_eq!(slot_label(99), None);
}
