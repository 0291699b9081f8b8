//! Acquisition tiers.
//!
//! Every tier implements [`AcquisitionStrategy`]. The native API clients live
//! with their platform (`espn::http`, `sleeper::http`); the page-based tiers
//! and the synthetic generator live here:
//!
//! - `scraper`: authenticated HTTP fetch of the platform's web pages
//! - `browser`: WebDriver-rendered pages, one scoped session per call
//! - `proxy`: pages rendered by a third-party scraping service
//! - `synthetic`: randomized, structurally valid data that cannot fail

pub mod browser;
pub mod pages;
pub mod proxy;
pub mod scraper;
pub mod synthetic;

use crate::cli::types::Platform;
use crate::error::TierError;
use crate::models::StrategyKind;
use crate::normalize::RawPayload;
use crate::request::LogicalRequest;
use async_trait::async_trait;

pub use browser::BrowserStrategy;
pub use proxy::ProxyStrategy;
pub use scraper::ScraperStrategy;
pub use synthetic::SyntheticStrategy;

/// One way of acquiring data for a platform.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    fn platform(&self) -> Platform;

    /// Whether this tier can serve `request` at all. Unsupported requests are
    /// skipped without consuming rate-limit budget.
    fn supports(&self, _request: &LogicalRequest) -> bool {
        true
    }

    /// Whether calls go through the per-tier rate limiter.
    fn is_rate_limited(&self) -> bool {
        true
    }

    async fn fetch(&self, request: &LogicalRequest) -> Result<RawPayload, TierError>;
}
