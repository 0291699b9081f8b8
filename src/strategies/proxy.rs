//! Third-party scraping proxy tier.
//!
//! One proxy call per page. The proxy renders the page with the forwarded
//! session headers and returns the markup for local parsing.

use crate::cli::types::Platform;
use crate::config::Endpoints;
use crate::core::http::{page_headers, send_for_text};
use crate::core::Credential;
use crate::error::TierError;
use crate::models::StrategyKind;
use crate::normalize::RawPayload;
use crate::request::LogicalRequest;
use crate::strategies::{pages, AcquisitionStrategy};
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

pub struct ProxyStrategy {
    platform: Platform,
    client: Client,
    endpoints: Endpoints,
    credential: Credential,
    api_key: Credential,
}

impl ProxyStrategy {
    pub fn new(
        platform: Platform,
        client: Client,
        endpoints: Endpoints,
        credential: Credential,
        api_key: Credential,
    ) -> Self {
        Self {
            platform,
            client,
            endpoints,
            credential,
            api_key,
        }
    }
}

#[async_trait]
impl AcquisitionStrategy for ProxyStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ScrapingProxy
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn supports(&self, request: &LogicalRequest) -> bool {
        pages::supports(request)
    }

    async fn fetch(&self, request: &LogicalRequest) -> Result<RawPayload, TierError> {
        let context = format!("{} scraping proxy", self.platform);
        let target = pages::page_url(self.platform, &self.endpoints, request)
            .ok_or_else(|| TierError::parse(&context, "no page renders this request"))?;
        let headers = page_headers(Some(&self.credential)).map_err(|_| TierError::Authentication {
            context: context.clone(),
        })?;

        debug!("Fetching {} through scraping proxy", target);
        let request = self
            .client
            .get(&self.endpoints.scraper_proxy)
            .query(&[
                ("api_key", self.api_key.expose()),
                ("url", target.as_str()),
                ("render", "true"),
                ("keep_headers", "true"),
            ])
            .headers(headers);

        // A blocked target comes back as a proxy 5xx, which maps to UpstreamUnavailable
        let body = send_for_text(request, &context).await?;
        if body.trim().is_empty() {
            return Err(TierError::upstream(&context, "proxy returned an empty body"));
        }

        Ok(RawPayload::Page {
            platform: self.platform,
            body,
        })
    }
}
