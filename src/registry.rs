//! Builds one provider chain per platform from configuration.
//!
//! The registry is assembled once at startup and is read-only afterwards.
//! A tier whose prerequisites are missing stays in the chain as a disabled
//! slot, so its absence shows up in every result's attempt list.

use crate::chain::ProviderChain;
use crate::cli::types::Platform;
use crate::config::AggregatorConfig;
use crate::core::http::build_client;
use crate::core::{CacheStore, RateLimiter};
use crate::error::Result;
use crate::espn::EspnApiClient;
use crate::models::StrategyKind;
use crate::sleeper::SleeperApiClient;
use crate::strategies::{BrowserStrategy, ProxyStrategy, ScraperStrategy, SyntheticStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

pub struct ProviderRegistry {
    chains: HashMap<Platform, ProviderChain>,
}

impl ProviderRegistry {
    pub fn from_config(
        config: &AggregatorConfig,
        cache: Arc<CacheStore>,
        limiter: Arc<RateLimiter>,
    ) -> Result<Self> {
        let api_client = build_client(config.request_timeout)?;
        let page_client = build_client(config.navigation_timeout)?;
        let tier_deadline = config.navigation_timeout + config.request_timeout;

        let mut chains = HashMap::new();
        for platform in Platform::ALL {
            let mut builder = ProviderChain::builder(platform)
                .with_cache(Arc::clone(&cache))
                .with_limiter(Arc::clone(&limiter))
                .with_ttls(config.volatile_ttl, config.reference_ttl)
                .with_tier_deadline(tier_deadline);

            let credential = config.credentials.for_platform(platform).cloned();
            let endpoints = config.endpoints.clone();

            builder = match &credential {
                Some(credential) => match platform {
                    Platform::Espn => builder.tier(Arc::new(EspnApiClient::new(
                        api_client.clone(),
                        endpoints.clone(),
                        credential.clone(),
                    ))),
                    Platform::Sleeper => builder.tier(Arc::new(SleeperApiClient::new(
                        api_client.clone(),
                        endpoints.clone(),
                        credential.clone(),
                        Arc::clone(&cache),
                        Arc::clone(&limiter),
                        config.reference_ttl,
                    ))),
                },
                None => builder.disabled(StrategyKind::NativeApi),
            };

            builder = match &credential {
                Some(credential) => builder.tier(Arc::new(ScraperStrategy::new(
                    platform,
                    api_client.clone(),
                    endpoints.clone(),
                    credential.clone(),
                ))),
                None => builder.disabled(StrategyKind::AuthenticatedScraper),
            };

            builder = match (&credential, &config.webdriver_url) {
                (Some(credential), Some(webdriver_url)) => builder.tier(Arc::new(BrowserStrategy::new(
                    platform,
                    page_client.clone(),
                    webdriver_url.clone(),
                    endpoints.clone(),
                    credential.clone(),
                    config.navigation_timeout,
                ))),
                _ => builder.disabled(StrategyKind::BrowserAutomation),
            };

            builder = match (&credential, &config.credentials.scraper_api_key) {
                (Some(credential), Some(api_key)) => builder.tier(Arc::new(ProxyStrategy::new(
                    platform,
                    page_client.clone(),
                    endpoints.clone(),
                    credential.clone(),
                    api_key.clone(),
                ))),
                _ => builder.disabled(StrategyKind::ScrapingProxy),
            };

            builder = if config.synthetic_enabled {
                builder.tier(Arc::new(SyntheticStrategy::new(platform)))
            } else {
                builder.disabled(StrategyKind::Synthetic)
            };

            let chain = builder.build();
            info!("{} chain configured with tiers {:?}", platform, chain.configured());
            chains.insert(platform, chain);
        }

        Ok(Self { chains })
    }

    /// Limiter with one window configuration per platform tier.
    pub fn limiter_for(config: &AggregatorConfig) -> RateLimiter {
        let mut limiter = RateLimiter::new(Default::default());
        for platform in Platform::ALL {
            for kind in StrategyKind::ALL {
                limiter = limiter.with_limit(
                    RateLimiter::key(platform.as_str(), kind.as_str()),
                    config.rate_limit_for(kind),
                );
            }
        }
        limiter.with_limit(
            crate::sleeper::http::directory_limit_key(),
            config.directory_rate_limit,
        )
    }

    pub fn chain(&self, platform: Platform) -> Option<&ProviderChain> {
        self.chains.get(&platform)
    }
}
