//! Type-safe wrappers for platforms, identifiers and scoring periods.

pub mod ids;
pub mod platform;
pub mod time;

pub use ids::{LeagueId, PlayerId, TeamId, UserId};
pub use platform::Platform;
pub use time::{Season, Week};
