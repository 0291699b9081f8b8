//! Web page locations shared by the scraper, browser and proxy tiers.

use crate::cli::types::Platform;
use crate::config::Endpoints;
use crate::request::LogicalRequest;

/// Page tiers can read rosters, activity and settings pages only.
pub fn supports(request: &LogicalRequest) -> bool {
    matches!(
        request,
        LogicalRequest::Roster { .. }
            | LogicalRequest::Transactions { .. }
            | LogicalRequest::LeagueSettings { .. }
    )
}

/// Site root, used by the browser tier to set cookies before navigating.
pub fn origin(platform: Platform, endpoints: &Endpoints) -> &str {
    match platform {
        Platform::Espn => &endpoints.espn_web,
        Platform::Sleeper => &endpoints.sleeper_web,
    }
}

/// URL of the page that renders `request`, or `None` if no page does.
pub fn page_url(platform: Platform, endpoints: &Endpoints, request: &LogicalRequest) -> Option<String> {
    let base = origin(platform, endpoints).trim_end_matches('/');
    let url = match (platform, request) {
        (
            Platform::Espn,
            LogicalRequest::Roster {
                league_id,
                team_id,
                season,
            },
        ) => format!(
            "{}/football/team?leagueId={}&teamId={}&seasonId={}",
            base, league_id, team_id, season
        ),
        (
            Platform::Espn,
            LogicalRequest::Transactions {
                league_id,
                period,
                season,
            },
        ) => format!(
            "{}/football/recentactivity?leagueId={}&seasonId={}&scoringPeriodId={}",
            base, league_id, season, period
        ),
        (Platform::Espn, LogicalRequest::LeagueSettings { league_id, season }) => format!(
            "{}/football/league/settings?leagueId={}&seasonId={}",
            base, league_id, season
        ),
        (Platform::Sleeper, LogicalRequest::Roster { league_id, team_id, .. }) => {
            format!("{}/leagues/{}/team/{}", base, league_id, team_id)
        }
        (Platform::Sleeper, LogicalRequest::Transactions { league_id, period, .. }) => {
            format!("{}/leagues/{}/transactions?week={}", base, league_id, period)
        }
        (Platform::Sleeper, LogicalRequest::LeagueSettings { league_id, .. }) => {
            format!("{}/leagues/{}/settings", base, league_id)
        }
        _ => return None,
    };
    Some(url)
}
