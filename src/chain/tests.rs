use super::*;
use crate::cli::types::{LeagueId, Season, TeamId};
use crate::core::RateLimitConfig;
use crate::models::{FetchStatus, Payload};
use crate::normalize::RawPayload;
use crate::strategies::SyntheticStrategy;
use async_trait::async_trait;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Strategy returning a fixed result and counting its calls.
struct MockStrategy {
    kind: StrategyKind,
    result: fn() -> Result<RawPayload, TierError>,
    calls: AtomicUsize,
    supports: bool,
    delay: Option<Duration>,
}

impl MockStrategy {
    fn new(kind: StrategyKind, result: fn() -> Result<RawPayload, TierError>) -> Self {
        Self {
            kind,
            result,
            calls: AtomicUsize::new(0),
            supports: true,
            delay: None,
        }
    }

    fn unsupported(mut self) -> Self {
        self.supports = false;
        self
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AcquisitionStrategy for MockStrategy {
    fn kind(&self) -> StrategyKind {
        self.kind
    }

    fn platform(&self) -> Platform {
        Platform::Espn
    }

    fn supports(&self, _request: &LogicalRequest) -> bool {
        self.supports
    }

    async fn fetch(&self, _request: &LogicalRequest) -> Result<RawPayload, TierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        (self.result)()
    }
}

fn upstream_down() -> Result<RawPayload, TierError> {
    Err(TierError::upstream("mock", "HTTP 503"))
}

fn auth_failure() -> Result<RawPayload, TierError> {
    Err(TierError::Authentication {
        context: "mock".to_string(),
    })
}

fn unrelated_json() -> Result<RawPayload, TierError> {
    Ok(RawPayload::Espn(json!({ "status": "maintenance" })))
}

fn espn_roster() -> Result<RawPayload, TierError> {
    Ok(RawPayload::Espn(json!({
        "teams": [{
            "id": 7,
            "name": "Live Team",
            "roster": { "entries": [{
                "playerId": 1,
                "lineupSlotId": 0,
                "playerPoolEntry": { "player": { "id": 1, "fullName": "Josh Allen", "defaultPositionId": 1, "proTeamId": 2 } }
            }] }
        }]
    })))
}

fn request() -> LogicalRequest {
    LogicalRequest::Roster {
        league_id: LeagueId::new("83806"),
        team_id: TeamId::new("7"),
        season: Season::new(2025),
    }
}

fn outcomes(result: &FetchResult) -> Vec<(StrategyKind, AttemptOutcome)> {
    result
        .attempts
        .iter()
        .map(|a| (a.strategy, a.outcome.clone()))
        .collect()
}

#[tokio::test]
async fn test_first_success_wins_and_later_tiers_are_not_called() {
    let native = Arc::new(MockStrategy::new(StrategyKind::NativeApi, espn_roster));
    let scraper = Arc::new(MockStrategy::new(StrategyKind::AuthenticatedScraper, espn_roster));
    let chain = ProviderChain::builder(Platform::Espn)
        .tier(scraper.clone())
        .tier(native.clone())
        .build();

    let result = chain.resolve(&request()).await;
    assert_eq!(result.status, FetchStatus::Success);
    assert_eq!(result.source, Some(StrategyKind::NativeApi));
    assert_eq!(native.calls(), 1);
    assert_eq!(scraper.calls(), 0);
}

#[tokio::test]
async fn test_failures_fall_through_to_synthetic() {
    let chain = ProviderChain::builder(Platform::Espn)
        .tier(Arc::new(MockStrategy::new(StrategyKind::NativeApi, auth_failure)))
        .tier(Arc::new(MockStrategy::new(StrategyKind::AuthenticatedScraper, upstream_down)))
        .disabled(StrategyKind::BrowserAutomation)
        .tier(Arc::new(
            MockStrategy::new(StrategyKind::ScrapingProxy, espn_roster).unsupported(),
        ))
        .tier(Arc::new(SyntheticStrategy::new(Platform::Espn)))
        .build();

    let result = chain.resolve(&request()).await;
    assert!(result.is_synthetic());
    assert_eq!(result.status, FetchStatus::Success);

    let outcomes = outcomes(&result);
    assert_eq!(outcomes.len(), 5);
    assert!(matches!(
        &outcomes[0],
        (StrategyKind::NativeApi, AttemptOutcome::Failed { kind: TierErrorKind::Authentication, .. })
    ));
    assert!(matches!(
        &outcomes[1],
        (StrategyKind::AuthenticatedScraper, AttemptOutcome::Failed { kind: TierErrorKind::UpstreamUnavailable, .. })
    ));
    assert_eq!(
        outcomes[2],
        (
            StrategyKind::BrowserAutomation,
            AttemptOutcome::Skipped {
                reason: SkipReason::NotConfigured
            }
        )
    );
    assert_eq!(
        outcomes[3],
        (
            StrategyKind::ScrapingProxy,
            AttemptOutcome::Skipped {
                reason: SkipReason::Unsupported
            }
        )
    );
    assert_eq!(outcomes[4], (StrategyKind::Synthetic, AttemptOutcome::Success));
}

#[tokio::test]
async fn test_unparseable_payload_moves_to_next_tier() {
    let chain = ProviderChain::builder(Platform::Espn)
        .tier(Arc::new(MockStrategy::new(StrategyKind::NativeApi, unrelated_json)))
        .tier(Arc::new(MockStrategy::new(StrategyKind::AuthenticatedScraper, espn_roster)))
        .build();

    let result = chain.resolve(&request()).await;
    assert_eq!(result.source, Some(StrategyKind::AuthenticatedScraper));
    assert!(matches!(
        result.attempts[0].outcome,
        AttemptOutcome::Failed {
            kind: TierErrorKind::Parse,
            ..
        }
    ));
}

#[tokio::test]
async fn test_rate_limited_tier_is_skipped_without_calling_upstream() {
    let key = RateLimiter::key("espn", "native_api");
    let limiter = Arc::new(
        RateLimiter::new(RateLimitConfig::per_minute(100))
            .with_limit(key.clone(), RateLimitConfig::per_minute(1)),
    );
    let native = Arc::new(MockStrategy::new(StrategyKind::NativeApi, upstream_down));
    let chain = ProviderChain::builder(Platform::Espn)
        .with_limiter(limiter.clone())
        .tier(native.clone())
        .tier(Arc::new(SyntheticStrategy::new(Platform::Espn)))
        .build();

    chain.resolve(&request()).await;
    let second = chain.resolve(&request()).await;

    assert_eq!(native.calls(), 1);
    assert_eq!(
        second.attempts[0].outcome,
        AttemptOutcome::Skipped {
            reason: SkipReason::RateLimited
        }
    );
    assert_eq!(limiter.recorded(&key), 1);
    // Synthetic never touches the limiter
    assert_eq!(limiter.recorded(&RateLimiter::key("espn", "synthetic")), 0);
}

#[tokio::test]
async fn test_success_is_cached_and_failure_is_not() {
    let cache = Arc::new(CacheStore::new(32));
    let failing = ProviderChain::builder(Platform::Espn)
        .with_cache(cache.clone())
        .tier(Arc::new(MockStrategy::new(StrategyKind::NativeApi, upstream_down)))
        .build();

    let result = failing.resolve(&request()).await;
    assert_eq!(result.status, FetchStatus::Error);
    assert!(result.source.is_none());
    assert!(cache.get(&request().fingerprint(Platform::Espn)).is_none());

    let working = ProviderChain::builder(Platform::Espn)
        .with_cache(cache.clone())
        .tier(Arc::new(MockStrategy::new(StrategyKind::NativeApi, espn_roster)))
        .build();
    let result = working.resolve(&request()).await;
    let cached = cache.get(&request().fingerprint(Platform::Espn)).unwrap();
    assert_eq!(cached, result);
    assert!(matches!(cached.payload, Some(Payload::Roster(_))));
}

#[tokio::test]
async fn test_slow_tier_hits_deadline() {
    let slow = Arc::new(
        MockStrategy::new(StrategyKind::NativeApi, espn_roster).slow(Duration::from_secs(5)),
    );
    let chain = ProviderChain::builder(Platform::Espn)
        .with_tier_deadline(Duration::from_millis(50))
        .tier(slow)
        .tier(Arc::new(SyntheticStrategy::new(Platform::Espn)))
        .build();

    let result = chain.resolve(&request()).await;
    assert!(result.is_synthetic());
    assert!(matches!(
        result.attempts[0].outcome,
        AttemptOutcome::Failed {
            kind: TierErrorKind::Timeout,
            ..
        }
    ));
}

#[test]
fn test_builder_sorts_into_fallback_order() {
    let chain = ProviderChain::builder(Platform::Sleeper)
        .tier(Arc::new(SyntheticStrategy::new(Platform::Sleeper)))
        .disabled(StrategyKind::ScrapingProxy)
        .disabled(StrategyKind::NativeApi)
        .build();

    assert_eq!(
        chain.order(),
        vec![
            StrategyKind::NativeApi,
            StrategyKind::ScrapingProxy,
            StrategyKind::Synthetic
        ]
    );
    assert_eq!(chain.configured(), vec![StrategyKind::Synthetic]);
}

#[tokio::test]
async fn test_empty_chain_is_exhausted() {
    let chain = ProviderChain::builder(Platform::Espn).build();
    let result = chain.resolve(&request()).await;
    assert_eq!(result.status, FetchStatus::Error);
    assert!(result.attempts.is_empty());
}
