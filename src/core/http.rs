//! HTTP utilities shared by every network tier

use crate::core::credential::Credential;
use crate::error::{AggregatorError, Result, TierError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36";

/// Build a client whose every request carries `timeout`.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .build()
        .map_err(AggregatorError::from)
}

/// `Accept: application/json` plus the credential's auth header, if any.
pub fn json_headers(credential: Option<&Credential>) -> Result<HeaderMap> {
    let mut headers = match credential {
        Some(credential) => credential.header_map()?,
        None => HeaderMap::new(),
    };
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    Ok(headers)
}

/// Headers that make a page request look like an ordinary browser visit.
pub fn page_headers(credential: Option<&Credential>) -> Result<HeaderMap> {
    let mut headers = match credential {
        Some(credential) => credential.header_map()?,
        None => HeaderMap::new(),
    };
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8"),
    );
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    Ok(headers)
}

/// Send a request and return the body text, mapping failures onto the tier taxonomy.
pub async fn send_for_text(request: RequestBuilder, context: &str) -> std::result::Result<String, TierError> {
    let response = request
        .send()
        .await
        .map_err(|e| TierError::from_reqwest(context, &e))?;

    if let Some(err) = TierError::from_status(context, response.status()) {
        return Err(err);
    }

    response
        .text()
        .await
        .map_err(|e| TierError::from_reqwest(context, &e))
}

/// Send a request and parse the body as JSON. A non-JSON body is a `Parse` failure.
pub async fn send_for_json(request: RequestBuilder, context: &str) -> std::result::Result<Value, TierError> {
    let body = send_for_text(request, context).await?;
    serde_json::from_str(&body).map_err(|e| {
        TierError::parse(
            context,
            format!("body is not JSON ({}): {}", e, preview(&body)),
        )
    })
}

/// First characters of a body, for diagnosing upstream format changes in logs.
pub fn preview(body: &str) -> String {
    const LIMIT: usize = 120;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(LIMIT) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TierErrorKind;
    use reqwest::header::{AUTHORIZATION, COOKIE};
    use wiremock::{
        matchers::{header, method, path},
        Mock, MockServer, ResponseTemplate,
    };

    #[test]
    fn test_json_headers_without_credential() {
        let headers = json_headers(None).unwrap();
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
        assert!(!headers.contains_key(COOKIE));
    }

    #[test]
    fn test_json_headers_with_cookie() {
        let credential = Credential::espn("{S}", "s2");
        let headers = json_headers(Some(&credential)).unwrap();
        assert!(headers.contains_key(COOKIE));
        assert!(headers.contains_key(ACCEPT));
    }

    #[test]
    fn test_page_headers_with_bearer() {
        let credential = Credential::bearer("tok");
        let headers = page_headers(Some(&credential)).unwrap();
        assert!(headers.contains_key(AUTHORIZATION));
        assert!(headers.contains_key(USER_AGENT));
    }

    #[test]
    fn test_preview_truncates() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.len(), 123);
        assert_eq!(preview("  short  "), "short");
    }

    #[tokio::test]
    async fn test_send_for_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .and(header("accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"a": 1})))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();
        let request = client
            .get(format!("{}/ok", server.uri()))
            .headers(json_headers(None).unwrap());
        let value = send_for_json(request, "test").await.unwrap();
        assert_eq!(value["a"], 1);
    }

    #[tokio::test]
    async fn test_send_for_json_maps_statuses() {
        let server = MockServer::start().await;
        Mock::given(path("/boom"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        Mock::given(path("/denied"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;
        Mock::given(path("/html"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_secs(5)).unwrap();

        let err = send_for_json(client.get(format!("{}/boom", server.uri())), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), TierErrorKind::UpstreamUnavailable);

        let err = send_for_json(client.get(format!("{}/denied", server.uri())), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), TierErrorKind::Authentication);

        let err = send_for_json(client.get(format!("{}/html", server.uri())), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), TierErrorKind::Parse);
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let server = MockServer::start().await;
        Mock::given(path("/slow"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client = build_client(Duration::from_millis(50)).unwrap();
        let err = send_for_text(client.get(format!("{}/slow", server.uri())), "t")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), TierErrorKind::Timeout);
    }
}
