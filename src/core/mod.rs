//! Core plumbing shared by every tier
//!
//! - `cache`: TTL + LRU store for normalized results, with an optional disk tier
//! - `credential`: redacted platform secrets and their request headers
//! - `html`: embedded-state and table slicing for scraped pages
//! - `http`: client construction and status/timeout mapping
//! - `rate_limit`: per-tier sliding-window limiter

pub mod cache;
pub mod credential;
pub mod html;
pub mod http;
pub mod rate_limit;

// Re-export commonly used items for convenience
pub use cache::{CacheStats, CacheStore};
pub use credential::{Credential, CredentialKind};
pub use rate_limit::{RateLimitConfig, RateLimiter};
