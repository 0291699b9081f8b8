//! The aggregator facade: the only entry point the rest of an application needs.
//!
//! Every call answers with a [`FetchResult`]. Fresh cached answers are served
//! without touching any tier; misses go to the platform's provider chain.

use crate::chain::ProviderChain;
use crate::cli::types::{LeagueId, Platform, TeamId, UserId, Week};
use crate::config::AggregatorConfig;
use crate::core::{CacheStats, CacheStore, RateLimiter};
use crate::error::Result;
use crate::models::FetchResult;
use crate::registry::ProviderRegistry;
use crate::request::{Fingerprint, LogicalRequest};
use std::sync::Arc;
use tracing::debug;

pub struct Aggregator {
    config: AggregatorConfig,
    registry: ProviderRegistry,
    cache: Arc<CacheStore>,
    limiter: Arc<RateLimiter>,
}

impl Aggregator {
    /// Build the cache, limiter and one chain per platform from `config`.
    ///
    /// Missing credentials only shorten the chains; the only construction
    /// errors are an unbuildable HTTP client.
    pub fn new(config: AggregatorConfig) -> Result<Self> {
        let mut cache = CacheStore::new(config.cache_capacity);
        if let Some(dir) = &config.cache_dir {
            cache = cache.with_disk_dir(dir);
        }
        let cache = Arc::new(cache);
        let limiter = Arc::new(ProviderRegistry::limiter_for(&config));
        Self::from_parts(config, cache, limiter)
    }

    /// Assemble around an existing cache and limiter, e.g. to share them or observe them in tests.
    pub fn from_parts(
        config: AggregatorConfig,
        cache: Arc<CacheStore>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let registry = ProviderRegistry::from_config(&config, Arc::clone(&cache), Arc::clone(&limiter))?;
        Ok(Self {
            config,
            registry,
            cache,
            limiter,
        })
    }

    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn chain(&self, platform: Platform) -> Option<&ProviderChain> {
        self.registry.chain(platform)
    }

    /// Resolve any logical request: cache first, then the provider chain.
    pub async fn fetch(&self, platform: Platform, request: LogicalRequest) -> FetchResult {
        let fingerprint = request.fingerprint(platform);
        if let Some(cached) = self.cache.get(&fingerprint) {
            debug!("Cache hit: {}", fingerprint);
            return cached;
        }
        debug!("Cache miss: {}", fingerprint);

        match self.registry.chain(platform) {
            Some(chain) => chain.resolve(&request).await,
            None => FetchResult::exhausted(platform, Vec::new()),
        }
    }

    pub async fn get_roster(&self, platform: Platform, league_id: LeagueId, team_id: TeamId) -> FetchResult {
        let request = LogicalRequest::Roster {
            league_id,
            team_id,
            season: self.config.season,
        };
        self.fetch(platform, request).await
    }

    pub async fn get_transactions(&self, platform: Platform, league_id: LeagueId, period: Week) -> FetchResult {
        let request = LogicalRequest::Transactions {
            league_id,
            period,
            season: self.config.season,
        };
        self.fetch(platform, request).await
    }

    pub async fn get_user_profile(&self, platform: Platform, user_id: UserId) -> FetchResult {
        let request = LogicalRequest::UserProfile {
            user_id,
            season: self.config.season,
        };
        self.fetch(platform, request).await
    }

    pub async fn get_league_settings(&self, platform: Platform, league_id: LeagueId) -> FetchResult {
        let request = LogicalRequest::LeagueSettings {
            league_id,
            season: self.config.season,
        };
        self.fetch(platform, request).await
    }

    pub async fn get_player_directory(&self, platform: Platform) -> FetchResult {
        let request = LogicalRequest::PlayerDirectory {
            season: self.config.season,
        };
        self.fetch(platform, request).await
    }

    pub fn invalidate(&self, fingerprint: &Fingerprint) {
        self.cache.invalidate(fingerprint);
    }

    /// Drop every in-memory entry.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
