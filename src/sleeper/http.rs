//! Sleeper native tier over the public v1 API.
//!
//! Rosters only list player ids, so the client also loads the player
//! directory. The directory is several megabytes and changes daily; it goes
//! through the shared cache under the same fingerprint a direct
//! `PlayerDirectory` request would use. Refreshes made on a roster's behalf
//! draw from their own rate-limit window.

use crate::cli::types::{Platform, Season};
use crate::config::Endpoints;
use crate::core::http::{json_headers, send_for_json};
use crate::core::{CacheStore, Credential, RateLimiter};
use crate::error::TierError;
use crate::models::{
    AttemptOutcome, CanonicalPlayer, FetchResult, Payload, StrategyKind, TierAttempt,
};
use crate::normalize::RawPayload;
use crate::request::LogicalRequest;
use crate::sleeper::types::SleeperRaw;
use crate::strategies::AcquisitionStrategy;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const CONTEXT: &str = "sleeper api";

/// Limiter key for directory downloads made while fetching a roster.
pub fn directory_limit_key() -> String {
    RateLimiter::key(Platform::Sleeper.as_str(), "player_directory")
}

pub struct SleeperApiClient {
    client: Client,
    endpoints: Endpoints,
    credential: Credential,
    cache: Arc<CacheStore>,
    limiter: Arc<RateLimiter>,
    directory_ttl: Duration,
}

impl SleeperApiClient {
    pub fn new(
        client: Client,
        endpoints: Endpoints,
        credential: Credential,
        cache: Arc<CacheStore>,
        limiter: Arc<RateLimiter>,
        directory_ttl: Duration,
    ) -> Self {
        Self {
            client,
            endpoints,
            credential,
            cache,
            limiter,
            directory_ttl,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.endpoints.sleeper_api.trim_end_matches('/'), path)
    }

    async fn get(&self, path: &str) -> Result<Value, TierError> {
        let headers = json_headers(Some(&self.credential)).map_err(|_| TierError::Authentication {
            context: CONTEXT.to_string(),
        })?;
        let url = self.url(path);
        debug!("GET {}", url);
        send_for_json(self.client.get(&url).headers(headers), CONTEXT).await
    }

    /// Normalized player directory, from the cache when fresh. `None` if it cannot be loaded.
    pub async fn directory(&self, season: Season) -> Option<Vec<CanonicalPlayer>> {
        let request = LogicalRequest::PlayerDirectory { season };
        let fingerprint = request.fingerprint(Platform::Sleeper);

        if let Some(Payload::Players(players)) = self.cache.get(&fingerprint).and_then(|r| r.payload) {
            debug!("Player directory served from cache ({} players)", players.len());
            return Some(players);
        }

        if !self.limiter.allow(&directory_limit_key()) {
            debug!("Player directory refresh rate limited; resolving roster without it");
            return None;
        }

        let raw = match self.get("/players/nfl").await {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Sleeper player directory unavailable: {}", e);
                return None;
            }
        };
        let normalized = match crate::sleeper::normalize::normalize(&request, SleeperRaw::Players(raw)) {
            Ok(normalized) => normalized,
            Err(e) => {
                warn!("Sleeper player directory unreadable: {}", e);
                return None;
            }
        };

        let players = normalized.payload.as_players().map(<[CanonicalPlayer]>::to_vec)?;
        let result = FetchResult::success(
            Platform::Sleeper,
            StrategyKind::NativeApi,
            normalized.payload,
            normalized.degradations,
            vec![TierAttempt {
                strategy: StrategyKind::NativeApi,
                outcome: AttemptOutcome::Success,
            }],
        );
        self.cache.put_persistent(fingerprint, result, self.directory_ttl);
        Some(players)
    }
}

#[async_trait]
impl AcquisitionStrategy for SleeperApiClient {
    fn kind(&self) -> StrategyKind {
        StrategyKind::NativeApi
    }

    fn platform(&self) -> Platform {
        Platform::Sleeper
    }

    async fn fetch(&self, request: &LogicalRequest) -> Result<RawPayload, TierError> {
        let raw = match request {
            LogicalRequest::Roster {
                league_id, season, ..
            } => {
                let rosters_path = format!("/league/{}/rosters", league_id);
                let users_path = format!("/league/{}/users", league_id);
                let (rosters, users) = tokio::join!(self.get(&rosters_path), self.get(&users_path));
                let rosters = rosters?;
                let users = users.unwrap_or_else(|e| {
                    warn!("Sleeper league users unavailable, team names will be generic: {}", e);
                    Value::Array(Vec::new())
                });
                SleeperRaw::Roster {
                    rosters,
                    users,
                    directory: self.directory(*season).await,
                }
            }
            LogicalRequest::Transactions {
                league_id, period, ..
            } => SleeperRaw::Transactions(
                self.get(&format!("/league/{}/transactions/{}", league_id, period))
                    .await?,
            ),
            LogicalRequest::LeagueSettings { league_id, .. } => {
                SleeperRaw::League(self.get(&format!("/league/{}", league_id)).await?)
            }
            LogicalRequest::UserProfile { user_id, season } => {
                let user = self.get(&format!("/user/{}", user_id)).await?;
                // Usernames resolve too; the leagues endpoint needs the numeric id
                let canonical_id = user
                    .get("user_id")
                    .and_then(Value::as_str)
                    .unwrap_or(user_id.as_str())
                    .to_string();
                let leagues = self
                    .get(&format!("/user/{}/leagues/nfl/{}", canonical_id, season))
                    .await
                    .unwrap_or_else(|e| {
                        warn!("Sleeper leagues for user {} unavailable: {}", canonical_id, e);
                        Value::Null
                    });
                SleeperRaw::User { user, leagues }
            }
            LogicalRequest::PlayerDirectory { .. } => {
                SleeperRaw::Players(self.get("/players/nfl").await?)
            }
        };
        Ok(RawPayload::Sleeper(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::types::{LeagueId, TeamId, UserId};
    use crate::core::http::build_client;
    use crate::core::RateLimitConfig;
    use crate::error::TierErrorKind;
    use serde_json::json;
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    fn client_with_limiter(
        server: &MockServer,
        cache: Arc<CacheStore>,
        limiter: Arc<RateLimiter>,
    ) -> SleeperApiClient {
        let endpoints = Endpoints {
            sleeper_api: format!("{}/v1", server.uri()),
            ..Endpoints::default()
        };
        SleeperApiClient::new(
            build_client(Duration::from_secs(5)).unwrap(),
            endpoints,
            Credential::bearer("tok"),
            cache,
            limiter,
            Duration::from_secs(3600),
        )
    }

    fn client(server: &MockServer, cache: Arc<CacheStore>) -> SleeperApiClient {
        client_with_limiter(server, cache, Arc::new(RateLimiter::new(Default::default())))
    }

    fn roster_request() -> LogicalRequest {
        LogicalRequest::Roster {
            league_id: LeagueId::new("998877"),
            team_id: TeamId::new("1"),
            season: Season::new(2025),
        }
    }

    async fn mount_league(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/v1/league/998877/rosters"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "roster_id": 1, "owner_id": "u1", "players": ["4046", "KC"], "starters": ["4046", "KC"] }
            ])))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/league/998877/users"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "user_id": "u1", "display_name": "alpha" }])),
            )
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_roster_loads_directory_once() {
        let server = MockServer::start().await;
        mount_league(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/players/nfl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "4046": { "full_name": "Patrick Mahomes", "position": "QB", "team": "KC" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cache = Arc::new(CacheStore::new(16));
        let sleeper = client(&server, cache.clone());

        for _ in 0..2 {
            match sleeper.fetch(&roster_request()).await.unwrap() {
                RawPayload::Sleeper(SleeperRaw::Roster { directory, .. }) => {
                    let directory = directory.unwrap();
                    assert_eq!(directory.len(), 1);
                    assert_eq!(directory[0].name, "Patrick Mahomes");
                }
                other => panic!("unexpected payload {:?}", other),
            }
        }
        assert_eq!(cache.stats().memory_entries, 1);
    }

    #[tokio::test]
    async fn test_roster_without_directory() {
        let server = MockServer::start().await;
        mount_league(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/players/nfl"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let sleeper = client(&server, Arc::new(CacheStore::new(16)));
        match sleeper.fetch(&roster_request()).await.unwrap() {
            RawPayload::Sleeper(SleeperRaw::Roster { directory, rosters, .. }) => {
                assert!(directory.is_none());
                assert!(rosters.is_array());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_directory_download_draws_from_its_own_window() {
        let server = MockServer::start().await;
        mount_league(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/players/nfl"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let limiter = Arc::new(
            RateLimiter::new(Default::default())
                .with_limit(directory_limit_key(), RateLimitConfig::per_minute(1)),
        );
        let sleeper = client_with_limiter(&server, Arc::new(CacheStore::new(16)), limiter.clone());

        // The first failed download is not cached; the second is held back by the limiter
        for _ in 0..2 {
            match sleeper.fetch(&roster_request()).await.unwrap() {
                RawPayload::Sleeper(SleeperRaw::Roster { directory, .. }) => assert!(directory.is_none()),
                other => panic!("unexpected payload {:?}", other),
            }
        }
        assert_eq!(limiter.recorded(&directory_limit_key()), 1);
    }

    #[tokio::test]
    async fn test_failed_users_call_yields_generic_team_name() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/league/998877/rosters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "roster_id": 1, "owner_id": "u1", "players": ["KC"], "starters": ["KC"] }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/league/998877/users"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/players/nfl"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let raw = client(&server, Arc::new(CacheStore::new(16)))
            .fetch(&roster_request())
            .await
            .unwrap();
        let normalized = crate::normalize::normalize(Platform::Sleeper, &roster_request(), raw).unwrap();
        assert_eq!(normalized.payload.as_roster().unwrap().team_name, "Team 1");
        assert_eq!(
            normalized.degradations,
            vec!["league users unavailable; team name is generic".to_string()]
        );
    }

    #[tokio::test]
    async fn test_user_profile_follows_canonical_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/user/gridironguru"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user_id": "123456", "display_name": "GridironGuru"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/user/123456/leagues/nfl/2025"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([{ "league_id": "998877", "name": "Degens" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let raw = client(&server, Arc::new(CacheStore::new(16)))
            .fetch(&LogicalRequest::UserProfile {
                user_id: UserId::new("gridironguru"),
                season: Season::new(2025),
            })
            .await
            .unwrap();
        match raw {
            RawPayload::Sleeper(SleeperRaw::User { leagues, .. }) => {
                assert_eq!(leagues[0]["league_id"], "998877")
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_error_is_upstream_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/league/998877"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client(&server, Arc::new(CacheStore::new(16)))
            .fetch(&LogicalRequest::LeagueSettings {
                league_id: LeagueId::new("998877"),
                season: Season::new(2025),
            })
            .await
            .unwrap_err();
        assert_eq!(err.kind(), TierErrorKind::UpstreamUnavailable);
    }
}
