//! Ordered fallback across acquisition tiers for one platform.
//!
//! A chain walks its tiers most-reliable-first and returns the first answer
//! that normalizes. Every tier error is absorbed here and recorded as an
//! attempt; callers only ever see a [`FetchResult`]. Successful results are
//! written to the cache, failures never are.

use crate::cli::types::Platform;
use crate::core::{CacheStore, RateLimiter};
use crate::error::{TierError, TierErrorKind};
use crate::models::{AttemptOutcome, FetchResult, SkipReason, StrategyKind, TierAttempt};
use crate::normalize::{self, Normalized};
use crate::request::{LogicalRequest, TtlClass};
use crate::strategies::AcquisitionStrategy;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// One slot in the chain. A slot without a strategy is a tier that exists in
/// the fallback order but could not be configured.
struct ChainTier {
    kind: StrategyKind,
    strategy: Option<Arc<dyn AcquisitionStrategy>>,
}

enum TierOutcome {
    Success(Normalized),
    Skipped(SkipReason),
    Failed(TierError),
}

pub struct ProviderChain {
    platform: Platform,
    tiers: Vec<ChainTier>,
    limiter: Arc<RateLimiter>,
    cache: Arc<CacheStore>,
    volatile_ttl: Duration,
    reference_ttl: Duration,
    tier_deadline: Duration,
}

pub struct ProviderChainBuilder {
    platform: Platform,
    tiers: Vec<ChainTier>,
    limiter: Option<Arc<RateLimiter>>,
    cache: Option<Arc<CacheStore>>,
    volatile_ttl: Duration,
    reference_ttl: Duration,
    tier_deadline: Duration,
}

impl ProviderChainBuilder {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            tiers: Vec::new(),
            limiter: None,
            cache: None,
            volatile_ttl: Duration::from_secs(5 * 60),
            reference_ttl: Duration::from_secs(24 * 60 * 60),
            tier_deadline: Duration::from_secs(30),
        }
    }

    pub fn with_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn with_cache(mut self, cache: Arc<CacheStore>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_ttls(mut self, volatile: Duration, reference: Duration) -> Self {
        self.volatile_ttl = volatile;
        self.reference_ttl = reference;
        self
    }

    /// Upper bound on a single tier's fetch, on top of any per-request timeout.
    pub fn with_tier_deadline(mut self, deadline: Duration) -> Self {
        self.tier_deadline = deadline;
        self
    }

    pub fn tier(mut self, strategy: Arc<dyn AcquisitionStrategy>) -> Self {
        self.tiers.push(ChainTier {
            kind: strategy.kind(),
            strategy: Some(strategy),
        });
        self
    }

    /// Record a tier that is part of the order but not configured.
    pub fn disabled(mut self, kind: StrategyKind) -> Self {
        self.tiers.push(ChainTier {
            kind,
            strategy: None,
        });
        self
    }

    pub fn build(mut self) -> ProviderChain {
        // Stable: tiers of the same kind keep insertion order
        self.tiers.sort_by_key(|tier| tier.kind);

        ProviderChain {
            platform: self.platform,
            tiers: self.tiers,
            limiter: self
                .limiter
                .unwrap_or_else(|| Arc::new(RateLimiter::new(Default::default()))),
            cache: self.cache.unwrap_or_else(|| Arc::new(CacheStore::new(256))),
            volatile_ttl: self.volatile_ttl,
            reference_ttl: self.reference_ttl,
            tier_deadline: self.tier_deadline,
        }
    }
}

impl ProviderChain {
    pub fn builder(platform: Platform) -> ProviderChainBuilder {
        ProviderChainBuilder::new(platform)
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Tier kinds in the order they are tried.
    pub fn order(&self) -> Vec<StrategyKind> {
        self.tiers.iter().map(|tier| tier.kind).collect()
    }

    /// Kinds that have a configured strategy.
    pub fn configured(&self) -> Vec<StrategyKind> {
        self.tiers
            .iter()
            .filter(|tier| tier.strategy.is_some())
            .map(|tier| tier.kind)
            .collect()
    }

    fn ttl_for(&self, request: &LogicalRequest) -> Duration {
        match request.ttl_class() {
            TtlClass::Volatile => self.volatile_ttl,
            TtlClass::Reference => self.reference_ttl,
        }
    }

    /// Try each tier in order and return the first normalized answer.
    pub async fn resolve(&self, request: &LogicalRequest) -> FetchResult {
        let mut attempts = Vec::with_capacity(self.tiers.len());

        for tier in &self.tiers {
            let outcome = self.attempt(tier, request).await;
            match outcome {
                TierOutcome::Success(normalized) => {
                    attempts.push(TierAttempt {
                        strategy: tier.kind,
                        outcome: AttemptOutcome::Success,
                    });
                    info!(
                        "{} {} served by {}",
                        self.platform,
                        request.operation(),
                        tier.kind
                    );
                    let result = FetchResult::success(
                        self.platform,
                        tier.kind,
                        normalized.payload,
                        normalized.degradations,
                        attempts,
                    );
                    self.store(request, &result);
                    return result;
                }
                TierOutcome::Skipped(reason) => {
                    debug!("{} {}: skipped ({:?})", self.platform, tier.kind, reason);
                    attempts.push(TierAttempt {
                        strategy: tier.kind,
                        outcome: AttemptOutcome::Skipped { reason },
                    });
                }
                TierOutcome::Failed(err) => {
                    log_failure(self.platform, tier.kind, &err);
                    attempts.push(TierAttempt {
                        strategy: tier.kind,
                        outcome: AttemptOutcome::Failed {
                            kind: err.kind(),
                            message: err.to_string(),
                        },
                    });
                }
            }
        }

        warn!(
            "{} {}: every tier failed or was skipped",
            self.platform,
            request.operation()
        );
        FetchResult::exhausted(self.platform, attempts)
    }

    async fn attempt(&self, tier: &ChainTier, request: &LogicalRequest) -> TierOutcome {
        let Some(strategy) = tier.strategy.as_ref() else {
            return TierOutcome::Skipped(SkipReason::NotConfigured);
        };
        if !strategy.supports(request) {
            return TierOutcome::Skipped(SkipReason::Unsupported);
        }
        if strategy.is_rate_limited() {
            let key = RateLimiter::key(self.platform.as_str(), tier.kind.as_str());
            if !self.limiter.allow(&key) {
                return TierOutcome::Skipped(SkipReason::RateLimited);
            }
        }

        let raw = match tokio::time::timeout(self.tier_deadline, strategy.fetch(request)).await {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => return TierOutcome::Failed(err),
            Err(_) => {
                return TierOutcome::Failed(TierError::Timeout {
                    context: format!("{} {}", self.platform, tier.kind),
                })
            }
        };

        match normalize::normalize(self.platform, request, raw) {
            Ok(normalized) => TierOutcome::Success(normalized),
            Err(err) => TierOutcome::Failed(err),
        }
    }

    fn store(&self, request: &LogicalRequest, result: &FetchResult) {
        let fingerprint = request.fingerprint(self.platform);
        let ttl = self.ttl_for(request);
        match request.ttl_class() {
            TtlClass::Reference => self.cache.put_persistent(fingerprint, result.clone(), ttl),
            TtlClass::Volatile => self.cache.put(fingerprint, result.clone(), ttl),
        }
    }
}

/// Credential and throttling failures are expected; the rest point at an upstream problem.
fn log_failure(platform: Platform, kind: StrategyKind, err: &TierError) {
    match err.kind() {
        TierErrorKind::Authentication | TierErrorKind::RateLimitExceeded => {
            debug!("{} {} failed: {}", platform, kind, err)
        }
        TierErrorKind::UpstreamUnavailable | TierErrorKind::Parse | TierErrorKind::Timeout => {
            warn!("{} {} failed: {}", platform, kind, err)
        }
    }
}
