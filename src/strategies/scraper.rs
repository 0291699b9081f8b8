//! Authenticated scraper: replays the session credential against web pages.

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

pub struct ScraperStrategy {
    platform: Platform,
    client: Client,
    endpoints: Endpoints,
    credential: Credential,
}

impl ScraperStrategy {
    pub fn new(platform: Platform, client: Client, endpoints: Endpoints, credential: Credential) -> Self {
        Self {
            platform,
            client,
            endpoints,
            credential,
        }
    }

    fn context(&self) -> String {
        format!("{} scraper", self.platform)
    }
}

#[async_trait]
impl AcquisitionStrategy for ScraperStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AuthenticatedScraper
    }

    fn platform(&self) -> Platform {
        self.platform
    }

    fn supports(&self, request: &LogicalRequest) -> bool {
        pages::supports(request)
    }

    async fn fetch(&self, request: &LogicalRequest) -> Result<RawPayload, TierError> {
        let context = self.context();
        let url = pages::page_url(self.platform, &self.endpoints, request)
            .ok_or_else(|| TierError::parse(&context, "no page renders this request"))?;
        let headers = page_headers(Some(&self.credential))
            .map_err(|_| TierError::Authentication {
                context: context.clone(),
            })?;

        debug!("Scraping {}", url);
        let body = send_for_text(self.client.get(&url).headers(headers), &context).await?;

        Ok(RawPayload::Page {
            platform: self.platform,
            body,
        })
    }
}
