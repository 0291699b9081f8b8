//! The [`FetchResult`] envelope returned by every facade call, plus provenance types.

use crate::cli::types::Platform;
use crate::error::TierErrorKind;
use crate::models::league::{
    CanonicalLeagueSettings, CanonicalRoster, CanonicalTransaction, CanonicalUserProfile,
};
use crate::models::player::CanonicalPlayer;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which acquisition tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    NativeApi,
    AuthenticatedScraper,
    BrowserAutomation,
    ScrapingProxy,
    Synthetic,
}

impl StrategyKind {
    /// Fallback order, most reliable first.
    pub const ALL: [StrategyKind; 5] = [
        StrategyKind::NativeApi,
        StrategyKind::AuthenticatedScraper,
        StrategyKind::BrowserAutomation,
        StrategyKind::ScrapingProxy,
        StrategyKind::Synthetic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::NativeApi => "native_api",
            StrategyKind::AuthenticatedScraper => "authenticated_scraper",
            StrategyKind::BrowserAutomation => "browser_automation",
            StrategyKind::ScrapingProxy => "scraping_proxy",
            StrategyKind::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Partial,
    Error,
}

impl fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchStatus::Success => "success",
            FetchStatus::Partial => "partial",
            FetchStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Canonical data carried by an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Roster(CanonicalRoster),
    Transactions(Vec<CanonicalTransaction>),
    UserProfile(CanonicalUserProfile),
    LeagueSettings(CanonicalLeagueSettings),
    Players(Vec<CanonicalPlayer>),
}

impl Payload {
    pub fn as_roster(&self) -> Option<&CanonicalRoster> {
        match self {
            Payload::Roster(roster) => Some(roster),
            _ => None,
        }
    }

    pub fn as_transactions(&self) -> Option<&[CanonicalTransaction]> {
        match self {
            Payload::Transactions(transactions) => Some(transactions),
            _ => None,
        }
    }

    pub fn as_user_profile(&self) -> Option<&CanonicalUserProfile> {
        match self {
            Payload::UserProfile(profile) => Some(profile),
            _ => None,
        }
    }

    pub fn as_league_settings(&self) -> Option<&CanonicalLeagueSettings> {
        match self {
            Payload::LeagueSettings(settings) => Some(settings),
            _ => None,
        }
    }

    pub fn as_players(&self) -> Option<&[CanonicalPlayer]> {
        match self {
            Payload::Players(players) => Some(players),
            _ => None,
        }
    }
}

/// Why a tier was passed over without being called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Required credential or endpoint is not configured.
    NotConfigured,
    /// The tier has no way to serve this kind of request.
    Unsupported,
    /// The local sliding-window limiter denied the call.
    RateLimited,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    Skipped { reason: SkipReason },
    Failed { kind: TierErrorKind, message: String },
}

/// One step of a chain resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierAttempt {
    pub strategy: StrategyKind,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// Envelope returned for every logical request. Callers must branch on `status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    pub status: FetchStatus,
    pub platform: Platform,
    /// Tier that satisfied the request; `None` only when no tier could.
    pub source: Option<StrategyKind>,
    pub fetched_at: DateTime<Utc>,
    pub message: Option<String>,
    pub payload: Option<Payload>,
    pub attempts: Vec<TierAttempt>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, FetchStatus::Success | FetchStatus::Partial)
    }

    pub fn is_synthetic(&self) -> bool {
        self.source == Some(StrategyKind::Synthetic)
    }

    /// Envelope for a tier's normalized answer. Any degradations make it `Partial`.
    pub fn success(
        platform: Platform,
        source: StrategyKind,
        payload: Payload,
        degradations: Vec<String>,
        attempts: Vec<TierAttempt>,
    ) -> Self {
        let (status, message) = if degradations.is_empty() {
            (FetchStatus::Success, None)
        } else {
            (FetchStatus::Partial, Some(degradations.join("; ")))
        };

        Self {
            status,
            platform,
            source: Some(source),
            fetched_at: Utc::now(),
            message,
            payload: Some(payload),
            attempts,
        }
    }

    /// Envelope for a resolution where every tier was skipped or failed.
    pub fn exhausted(platform: Platform, attempts: Vec<TierAttempt>) -> Self {
        let summary = attempts
            .iter()
            .map(|a| match &a.outcome {
                AttemptOutcome::Success => format!("{}: SUCCESS", a.strategy),
                AttemptOutcome::Skipped { reason } => {
                    format!("{}: SKIPPED ({:?})", a.strategy, reason)
                }
                AttemptOutcome::Failed { message, .. } => {
                    format!("{}: ERROR ({})", a.strategy, message)
                }
            })
            .collect::<Vec<_>>()
            .join(" -> ");

        let message = if summary.is_empty() {
            "no acquisition tiers configured".to_string()
        } else {
            format!("all tiers exhausted: {}", summary)
        };

        Self {
            status: FetchStatus::Error,
            platform,
            source: None,
            fetched_at: Utc::now(),
            message: Some(message),
            payload: None,
            attempts,
        }
    }
}
