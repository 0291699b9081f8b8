//! Command implementations for the aggregator CLI

pub mod fetch;

use crate::{error::AggregatorError, LeagueId, Result, LEAGUE_ID_ENV_VAR};


/// Use the explicit league id, else `FFL_LEAGUE_ID`.
pub fn resolve_league_id(league_id: Option<LeagueId>) -> Result<LeagueId> {
    league_id
        .or_else(|| {
            std::env::var(LEAGUE_ID_ENV_VAR)
                .ok()
                .and_then(|s| s.parse::<LeagueId>().ok())
        })
        .ok_or_else(|| AggregatorError::MissingLeagueId {
            env_var: LEAGUE_ID_ENV_VAR.to_string(),
        })
}
