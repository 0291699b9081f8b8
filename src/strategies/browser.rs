//! Browser-automation tier over the W3C WebDriver HTTP protocol.
//!
//! Each fetch opens its own session, injects the platform credential, renders
//! the page and reads back the DOM. The session is closed on every exit path:
//! explicitly after use, and from `Drop` if the calling future is abandoned
//! mid-flight. Navigation runs under a hard deadline; hitting it is a
//! `Timeout` for this tier only.

use crate::cli::types::Platform;
use crate::config::Endpoints;
use crate::core::http::send_for_json;
use crate::core::{Credential, CredentialKind};
use crate::error::TierError;
use crate::models::StrategyKind;
use crate::normalize::RawPayload;
use crate::request::LogicalRequest;
use crate::strategies::{pages, AcquisitionStrategy};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

pub struct BrowserStrategy {
    platform: Platform,
    client: Client,
    webdriver_url: String,
    endpoints: Endpoints,
    credential: Credential,
    navigation_timeout: Duration,
}

impl BrowserStrategy {
    pub fn new(
        platform: Platform,
        client: Client,
        webdriver_url: impl Into<String>,
        endpoints: Endpoints,
        credential: Credential,
        navigation_timeout: Duration,
    ) -> Self {
        Self {
            platform,
            client,
            webdriver_url: webdriver_url.into().trim_end_matches('/').to_string(),
            endpoints,
            credential,
            navigation_timeout,
        }
    }

    fn context(&self) -> String {
        format!("{} browser", self.platform)
    }

    /// Navigate with the credential in place and return the rendered DOM.
    async fn render(&self, session: &BrowserSession, url: &str) -> Result<String, TierError> {
        let origin = pages::origin(self.platform, &self.endpoints);

        // Cookies can only be set on the document's own origin
        session.navigate(origin).await?;
        match self.credential.kind() {
            CredentialKind::Cookie => {
                for (name, value) in self.credential.cookie_pairs() {
                    session.add_cookie(&name, &value).await?;
                }
            }
            CredentialKind::Bearer => {
                session
                    .execute(
                        "window.localStorage.setItem('token', arguments[0]);",
                        json!([self.credential.expose()]),
                    )
                    .await?;
            }
            CredentialKind::ApiKey => {}
        }

        session.navigate(url).await?;
        session.page_source().await
    }
}

#[async_trait]
impl AcquisitionStrategy for BrowserStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BrowserAutomation
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

        let session = BrowserSession::open(&self.client, &self.webdriver_url, &context).await?;
        let rendered = tokio::time::timeout(self.navigation_timeout, self.render(&session, &url)).await;
        session.close().await;

        let body = match rendered {
            Ok(result) => result?,
            Err(_) => {
                return Err(TierError::Timeout {
                    context: format!("{} navigation to {}", context, url),
                })
            }
        };

        Ok(RawPayload::Page {
            platform: self.platform,
            body,
        })
    }
}

/// An open WebDriver session. Dropped without [`close`](Self::close), it
/// schedules the DELETE on the current runtime.
struct BrowserSession {
    client: Client,
    base: String,
    id: String,
    context: String,
    closed: bool,
}

impl BrowserSession {
    async fn open(client: &Client, webdriver_url: &str, context: &str) -> Result<Self, TierError> {
        let capabilities = json!({
            "capabilities": {
                "alwaysMatch": {
                    "browserName": "chrome",
                    "goog:chromeOptions": { "args": ["--headless=new", "--disable-gpu", "--no-sandbox"] }
                }
            }
        });
        let response = send_for_json(
            client
                .post(format!("{}/session", webdriver_url))
                .json(&capabilities),
            context,
        )
        .await?;

        let id = response
            .pointer("/value/sessionId")
            .or_else(|| response.get("sessionId"))
            .and_then(Value::as_str)
            .ok_or_else(|| TierError::parse(context, "WebDriver response has no sessionId"))?
            .to_string();

        debug!("Opened WebDriver session {}", id);
        Ok(Self {
            client: client.clone(),
            base: format!("{}/session/{}", webdriver_url, id),
            id,
            context: context.to_string(),
            closed: false,
        })
    }

    async fn command(&self, method: reqwest::Method, path: &str, body: Option<Value>) -> Result<Value, TierError> {
        let mut request = self
            .client
            .request(method, format!("{}{}", self.base, path));
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = send_for_json(request, &self.context).await?;
        if let Some(error) = response.pointer("/value/error").and_then(Value::as_str) {
            return Err(TierError::upstream(&self.context, format!("WebDriver error: {}", error)));
        }
        Ok(response)
    }

    async fn navigate(&self, url: &str) -> Result<(), TierError> {
        self.command(reqwest::Method::POST, "/url", Some(json!({ "url": url })))
            .await
            .map(|_| ())
    }

    async fn add_cookie(&self, name: &str, value: &str) -> Result<(), TierError> {
        self.command(
            reqwest::Method::POST,
            "/cookie",
            Some(json!({ "cookie": { "name": name, "value": value } })),
        )
        .await
        .map(|_| ())
    }

    async fn execute(&self, script: &str, args: Value) -> Result<Value, TierError> {
        self.command(
            reqwest::Method::POST,
            "/execute/sync",
            Some(json!({ "script": script, "args": args })),
        )
        .await
    }

    async fn page_source(&self) -> Result<String, TierError> {
        let response = self.command(reqwest::Method::GET, "/source", None).await?;
        response
            .get("value")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| TierError::parse(&self.context, "WebDriver page source is not a string"))
    }

    async fn close(mut self) {
        self.closed = true;
        if let Err(e) = self.client.delete(&self.base).send().await {
            warn!("Failed to close WebDriver session {}: {}", self.id, e);
        } else {
            debug!("Closed WebDriver session {}", self.id);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!("WebDriver session {} leaked: no runtime to close it", self.id);
            return;
        };
        let client = self.client.clone();
        let url = self.base.clone();
        debug!("Closing abandoned WebDriver session {}", self.id);
        handle.spawn(async move {
            let _ = client.delete(url).send().await;
        });
    }
}
