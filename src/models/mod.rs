//! Canonical data model shared by every platform and tier.

pub mod envelope;
pub mod league;
pub mod player;

pub use envelope::{
    AttemptOutcome, FetchResult, FetchStatus, Payload, SkipReason, StrategyKind, TierAttempt,
};
pub use league::{
    CanonicalLeagueSettings, CanonicalRoster, CanonicalTransaction, CanonicalUserProfile,
    LeagueMembership, MoveDirection, ScoringFormat, TransactionKind, TransactionMove,
};
pub use player::{CanonicalPlayer, InjuryStatus, Position};
