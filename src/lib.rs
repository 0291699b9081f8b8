//! Fantasy Football Platform Aggregator Library
//!
//! Fetches rosters, transactions, user profiles, league settings and player
//! directories from ESPN and Sleeper, and always answers: each platform has a
//! chain of acquisition tiers (native API, authenticated scraper, browser
//! automation, scraping proxy, synthetic data) tried in order until one
//! produces data that normalizes into the canonical model.
//!
//! ## Features
//!
//! - **Tiered Fallback**: per-platform provider chains with per-tier rate limits and deadlines
//! - **Canonical Models**: one player/roster/transaction/settings shape for every platform
//! - **Provenance**: every result records its source tier and every attempt made
//! - **Caching**: sharded TTL + LRU memory cache, with a disk tier for the player directory
//! - **Credential Safety**: secrets are only turned into headers and never logged
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ffl_aggregator::{Aggregator, AggregatorConfig, LeagueId, Platform, TeamId};
//!
//! # async fn example() -> ffl_aggregator::Result<()> {
//! let aggregator = Aggregator::new(AggregatorConfig::from_env()?)?;
//! let result = aggregator
//!     .get_roster(Platform::Espn, LeagueId::new("83806"), TeamId::new("7"))
//!     .await;
//!
//! println!("{} via {:?}", result.status, result.source);
//! # Ok(())
//! # }
//! ```
//!
//! ## Environment Configuration
//!
//! Credentials and defaults are read from the environment:
//! ```bash
//! export ESPN_SWID='{...}' ESPN_S2='...'
//! export SLEEPER_TOKEN='...'
//! export FFL_LEAGUE_ID=83806
//! ```

pub mod chain;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod error;
pub mod espn;
pub mod facade;
pub mod models;
pub mod normalize;
pub mod registry;
pub mod request;
pub mod sleeper;
pub mod strategies;

// Re-export commonly used types
pub use cli::types::{LeagueId, Platform, PlayerId, Season, TeamId, UserId, Week};
pub use config::AggregatorConfig;
pub use error::{AggregatorError, Result, TierError, TierErrorKind};
pub use facade::Aggregator;
pub use models::{FetchResult, FetchStatus, Payload, Position, StrategyKind};
pub use request::{Fingerprint, LogicalRequest};

pub const LEAGUE_ID_ENV_VAR: &str = "FFL_LEAGUE_ID";
