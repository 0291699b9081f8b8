//! Runtime configuration, read from the environment.
//!
//! Missing credentials are never an error: they only shorten the tier chain.

use crate::cli::types::{Platform, Season};
use crate::core::{Credential, RateLimitConfig};
use crate::error::{AggregatorError, Result};
use crate::models::StrategyKind;
use crate::request::TtlClass;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

pub const ESPN_SWID_ENV_VAR: &str = "ESPN_SWID";
pub const ESPN_S2_ENV_VAR: &str = "ESPN_S2";
pub const SLEEPER_TOKEN_ENV_VAR: &str = "SLEEPER_TOKEN";
pub const SCRAPER_API_KEY_ENV_VAR: &str = "SCRAPER_API_KEY";
pub const WEBDRIVER_URL_ENV_VAR: &str = "WEBDRIVER_URL";
pub const SEASON_ENV_VAR: &str = "FFL_SEASON";
pub const CACHE_DIR_ENV_VAR: &str = "FFL_CACHE_DIR";

/// Base URLs for every upstream. Overridden in tests to point at mock servers.
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// ESPN fantasy v3 API, e.g. `.../apis/v3/games/ffl`.
    pub espn_api: String,
    /// ESPN fan profile API.
    pub espn_fan_api: String,
    /// ESPN fantasy web pages.
    pub espn_web: String,
    pub sleeper_api: String,
    pub sleeper_web: String,
    pub scraper_proxy: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            espn_api: "https://lm-api-reads.fantasy.espn.com/apis/v3/games/ffl".to_string(),
            espn_fan_api: "https://fan.api.espn.com/apis/v2/fans".to_string(),
            espn_web: "https://fantasy.espn.com".to_string(),
            sleeper_api: "https://api.sleeper.app/v1".to_string(),
            sleeper_web: "https://sleeper.com".to_string(),
            scraper_proxy: "https://api.scraperapi.com".to_string(),
        }
    }
}

/// Credentials supplied by the external credential store.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    platforms: HashMap<Platform, Credential>,
    pub scraper_api_key: Option<Credential>,
}

impl Credentials {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform, credential: Credential) -> Self {
        self.platforms.insert(platform, credential);
        self
    }

    pub fn with_scraper_api_key(mut self, key: impl Into<String>) -> Self {
        self.scraper_api_key = Some(Credential::api_key(key));
        self
    }

    pub fn for_platform(&self, platform: Platform) -> Option<&Credential> {
        self.platforms.get(&platform)
    }

    /// Read credentials from `ESPN_SWID`/`ESPN_S2`, `SLEEPER_TOKEN` and `SCRAPER_API_KEY`.
    pub fn from_env() -> Self {
        let mut credentials = Self::none();

        if let (Some(swid), Some(s2)) = (env_non_empty(ESPN_SWID_ENV_VAR), env_non_empty(ESPN_S2_ENV_VAR)) {
            credentials = credentials.with_platform(Platform::Espn, Credential::espn(&swid, &s2));
        }
        if let Some(token) = env_non_empty(SLEEPER_TOKEN_ENV_VAR) {
            credentials = credentials.with_platform(Platform::Sleeper, Credential::bearer(token));
        }
        if let Some(key) = env_non_empty(SCRAPER_API_KEY_ENV_VAR) {
            credentials = credentials.with_scraper_api_key(key);
        }
        credentials
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    pub season: Season,
    pub endpoints: Endpoints,
    pub credentials: Credentials,
    /// WebDriver endpoint for the browser tier; `None` disables it.
    pub webdriver_url: Option<String>,
    pub volatile_ttl: Duration,
    pub reference_ttl: Duration,
    pub cache_capacity: usize,
    /// Disk tier for reference data; `None` keeps everything in memory.
    pub cache_dir: Option<PathBuf>,
    pub request_timeout: Duration,
    pub navigation_timeout: Duration,
    pub synthetic_enabled: bool,
    pub rate_limits: HashMap<StrategyKind, RateLimitConfig>,
    /// Window for player directory downloads made while resolving a roster.
    pub directory_rate_limit: RateLimitConfig,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        let rate_limits = HashMap::from([
            (StrategyKind::NativeApi, RateLimitConfig::per_minute(30)),
            (StrategyKind::AuthenticatedScraper, RateLimitConfig::per_minute(10)),
            (StrategyKind::BrowserAutomation, RateLimitConfig::per_minute(4)),
            (StrategyKind::ScrapingProxy, RateLimitConfig::per_minute(5)),
        ]);

        Self {
            season: Season::default(),
            endpoints: Endpoints::default(),
            credentials: Credentials::none(),
            webdriver_url: None,
            volatile_ttl: Duration::from_secs(5 * 60),
            reference_ttl: Duration::from_secs(24 * 60 * 60),
            cache_capacity: 512,
            cache_dir: None,
            request_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(20),
            synthetic_enabled: true,
            rate_limits,
            directory_rate_limit: RateLimitConfig {
                max_calls: 2,
                window: Duration::from_secs(60 * 60),
            },
        }
    }
}

impl AggregatorConfig {
    pub fn from_env() -> Result<Self> {
        let season = match env_non_empty(SEASON_ENV_VAR) {
            Some(raw) => raw.parse().map_err(|_| AggregatorError::Config {
                message: format!("{} must be a year, got {:?}", SEASON_ENV_VAR, raw),
            })?,
            None => Season::default(),
        };

        let cache_dir = env_non_empty(CACHE_DIR_ENV_VAR)
            .map(PathBuf::from)
            .or_else(|| Some(crate::core::cache::default_cache_dir()));

        Ok(Self {
            season,
            credentials: Credentials::from_env(),
            webdriver_url: env_non_empty(WEBDRIVER_URL_ENV_VAR),
            cache_dir,
            ..Self::default()
        })
    }

    pub fn ttl_for(&self, class: TtlClass) -> Duration {
        match class {
            TtlClass::Volatile => self.volatile_ttl,
            TtlClass::Reference => self.reference_ttl,
        }
    }

    pub fn rate_limit_for(&self, strategy: StrategyKind) -> RateLimitConfig {
        self.rate_limits
            .get(&strategy)
            .copied()
            .unwrap_or_default()
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CredentialKind;

    #[test]
    fn test_defaults() {
        let config = AggregatorConfig::default();
        assert_eq!(config.volatile_ttl, Duration::from_secs(300));
        assert!(config.reference_ttl > config.volatile_ttl * 100);
        assert!(config.synthetic_enabled);
        assert!(config.webdriver_url.is_none());
        assert_eq!(
            config.rate_limit_for(StrategyKind::BrowserAutomation).max_calls,
            4
        );
    }

    #[test]
    fn test_ttl_for_class() {
        let config = AggregatorConfig::default();
        assert_eq!(config.ttl_for(TtlClass::Volatile), config.volatile_ttl);
        assert_eq!(config.ttl_for(TtlClass::Reference), config.reference_ttl);
    }

    #[test]
    fn test_credentials_builder() {
        let credentials = Credentials::none()
            .with_platform(Platform::Sleeper, Credential::bearer("tok"))
            .with_scraper_api_key("key");

        assert!(credentials.for_platform(Platform::Espn).is_none());
        assert_eq!(
            credentials.for_platform(Platform::Sleeper).unwrap().kind(),
            CredentialKind::Bearer
        );
        assert!(credentials.scraper_api_key.is_some());
    }

    #[test]
    fn test_credentials_from_env() {
        std::env::set_var(ESPN_SWID_ENV_VAR, "{SWID}");
        std::env::set_var(ESPN_S2_ENV_VAR, "s2");
        std::env::remove_var(SLEEPER_TOKEN_ENV_VAR);

        let credentials = Credentials::from_env();
        assert!(credentials.for_platform(Platform::Espn).is_some());
        assert!(credentials.for_platform(Platform::Sleeper).is_none());

        // ESPN needs both cookies
        std::env::remove_var(ESPN_S2_ENV_VAR);
        let credentials = Credentials::from_env();
        assert!(credentials.for_platform(Platform::Espn).is_none());

        std::env::remove_var(ESPN_SWID_ENV_VAR);
    }
}
