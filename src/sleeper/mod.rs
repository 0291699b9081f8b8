//! Sleeper: wire types, the native API tier and its normalizer.

pub mod http;
pub mod normalize;
pub mod types;

pub use http::SleeperApiClient;
