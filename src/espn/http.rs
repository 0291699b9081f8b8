//! ESPN native tier: the fantasy v3 API and the fan profile API.

use crate::cli::types::{LeagueId, Platform, Season};
use crate::config::Endpoints;
use crate::core::http::{json_headers, send_for_json};
use crate::core::Credential;
use crate::error::TierError;
use crate::models::StrategyKind;
use crate::normalize::RawPayload;
use crate::request::LogicalRequest;
use crate::strategies::AcquisitionStrategy;
use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

const CONTEXT: &str = "espn api";

/// Header the players endpoint reads its server-side filter from.
const FANTASY_FILTER_HEADER: &str = "x-fantasy-filter";

pub struct EspnApiClient {
    client: Client,
    endpoints: Endpoints,
    credential: Credential,
}

impl EspnApiClient {
    pub fn new(client: Client, endpoints: Endpoints, credential: Credential) -> Self {
        Self {
            client,
            endpoints,
            credential,
        }
    }

    fn league_url(&self, league_id: &LeagueId, season: Season) -> String {
        format!(
            "{}/seasons/{}/segments/0/leagues/{}",
            self.endpoints.espn_api.trim_end_matches('/'),
            season,
            league_id
        )
    }

    fn headers(&self) -> Result<reqwest::header::HeaderMap, TierError> {
        json_headers(Some(&self.credential)).map_err(|_| TierError::Authentication {
            context: CONTEXT.to_string(),
        })
    }

    async fn get(&self, url: &str, params: &[(&str, String)]) -> Result<RawPayload, TierError> {
        self.get_with(url, params, self.headers()?).await
    }

    async fn get_with(
        &self,
        url: &str,
        params: &[(&str, String)],
        headers: reqwest::header::HeaderMap,
    ) -> Result<RawPayload, TierError> {
        debug!("GET {} {:?}", url, params);
        let request = self.client.get(url).headers(headers).query(params);
        let value = send_for_json(request, CONTEXT).await?;
        Ok(RawPayload::Espn(value))
    }
}

#[async_trait]
impl AcquisitionStrategy for EspnApiClient {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NativeApi
    }

    fn platform(&self) -> Platform {
        Platform::Espn
    }

    async fn fetch(&self, request: &LogicalRequest) -> Result<RawPayload, TierError> {
        match request {
            LogicalRequest::Roster {
                league_id, season, ..
            } => {
                let params = [("view", "mRoster".to_string()), ("view", "mTeam".to_string())];
                self.get(&self.league_url(league_id, *season), &params).await
            }
            LogicalRequest::Transactions {
                league_id,
                period,
                season,
            } => {
                let params = [
                    ("view", "mTransactions2".to_string()),
                    ("scoringPeriodId", period.to_string()),
                ];
                self.get(&self.league_url(league_id, *season), &params).await
            }
            LogicalRequest::LeagueSettings { league_id, season } => {
                let params = [("view", "mSettings".to_string()), ("view", "mTeam".to_string())];
                self.get(&self.league_url(league_id, *season), &params).await
            }
            LogicalRequest::UserProfile { user_id, .. } => {
                let url = format!(
                    "{}/{}",
                    self.endpoints.espn_fan_api.trim_end_matches('/'),
                    user_id
                );
                let params = [
                    ("displayHiddenPrefs", "true".to_string()),
                    ("context", "fantasy".to_string()),
                    ("useCookieAuth", "true".to_string()),
                ];
                self.get(&url, &params).await
            }
            LogicalRequest::PlayerDirectory { season } => {
                let url = format!(
                    "{}/seasons/{}/players",
                    self.endpoints.espn_api.trim_end_matches('/'),
                    season
                );
                let filter = json!({ "filterActive": { "value": true } }).to_string();
                let mut headers = self.headers()?;
                headers.insert(
                    FANTASY_FILTER_HEADER,
                    HeaderValue::from_str(&filter)
                        .map_err(|e| TierError::parse(CONTEXT, e.to_string()))?,
                );
                self.get_with(&url, &[("view", "players_wl".to_string())], headers)
                    .await
            }
        }
    }
}
