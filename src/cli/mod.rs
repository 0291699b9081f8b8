//! CLI argument definitions and parsing.

pub mod types;

use clap::{Args, Parser, Subcommand};
use types::{LeagueId, Platform, Season, TeamId, UserId, Week};

/// Arguments shared by every `get` subcommand.
#[derive(Debug, Args)]
pub struct CommonArgs {
    /// Platform to query.
    #[clap(long, short, value_enum)]
    pub platform: Platform,

    /// Season year (defaults to `FFL_SEASON`, then the current season).
    #[clap(long, short)]
    pub season: Option<Season>,

    /// Print the full result envelope as JSON.
    #[clap(long)]
    pub json: bool,

    /// Drop any cached answer before fetching.
    #[clap(long)]
    pub refresh: bool,
}

#[derive(Debug, Subcommand)]
pub enum GetCmd {
    /// One team's roster.
    Roster {
        #[clap(flatten)]
        common: CommonArgs,

        /// League ID (or set `FFL_LEAGUE_ID` env var).
        #[clap(long, short)]
        league_id: Option<LeagueId>,

        /// Team ID within the league.
        #[clap(long, short)]
        team_id: TeamId,
    },

    /// Completed transactions for one scoring period.
    Transactions {
        #[clap(flatten)]
        common: CommonArgs,

        /// League ID (or set `FFL_LEAGUE_ID` env var).
        #[clap(long, short)]
        league_id: Option<LeagueId>,

        /// Scoring period.
        #[clap(long, short, default_value_t = Week::default())]
        week: Week,
    },

    /// A user's profile and league memberships.
    Profile {
        #[clap(flatten)]
        common: CommonArgs,

        /// ESPN SWID or Sleeper user id / username.
        #[clap(long, short)]
        user_id: UserId,
    },

    /// League name, size, lineup and scoring format.
    Settings {
        #[clap(flatten)]
        common: CommonArgs,

        /// League ID (or set `FFL_LEAGUE_ID` env var).
        #[clap(long, short)]
        league_id: Option<LeagueId>,
    },

    /// The platform's full player directory.
    Players {
        #[clap(flatten)]
        common: CommonArgs,
    },
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Fetch normalized data through the fallback chain.
    Get {
        #[clap(subcommand)]
        cmd: GetCmd,
    },
}

#[derive(Debug, Parser)]
#[clap(
    name = "ffl-aggregator",
    about = "Fantasy football data from ESPN and Sleeper, with tiered fallback"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_roster() {
        let cli = Cli::try_parse_from([
            "ffl-aggregator",
            "get",
            "roster",
            "--platform",
            "espn",
            "--league-id",
            "83806",
            "--team-id",
            "7",
            "--json",
        ])
        .unwrap();

        match cli.command {
            Commands::Get {
                cmd:
                    GetCmd::Roster {
                        common,
                        league_id,
                        team_id,
                    },
            } => {
                assert_eq!(common.platform, Platform::Espn);
                assert!(common.json);
                assert!(common.season.is_none());
                assert_eq!(league_id, Some(LeagueId::new("83806")));
                assert_eq!(team_id, TeamId::new("7"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_transactions_defaults_week() {
        let cli = Cli::try_parse_from([
            "ffl-aggregator",
            "get",
            "transactions",
            "-p",
            "sleeper",
            "--season",
            "2024",
        ])
        .unwrap();

        match cli.command {
            Commands::Get {
                cmd: GetCmd::Transactions { common, week, league_id },
            } => {
                assert_eq!(common.season, Some(Season::new(2024)));
                assert_eq!(week, Week::new(1));
                assert!(league_id.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_unknown_platform_is_rejected() {
        assert!(Cli::try_parse_from(["ffl-aggregator", "get", "players", "-p", "yahoo"]).is_err());
    }
}
