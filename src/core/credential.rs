//! Platform credentials.
//!
//! The secret is only ever turned into request headers or browser cookies;
//! `Debug` output is redacted so credentials cannot leak through logs.

use crate::error::Result;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, COOKIE};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CredentialKind {
    /// `name=value; name2=value2` session cookies.
    Cookie,
    /// Bearer token for an `Authorization` header.
    Bearer,
    /// API key for the scraping proxy.
    ApiKey,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    kind: CredentialKind,
    secret: String,
}

impl Credential {
    pub fn cookie(cookie: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::Cookie,
            secret: cookie.into(),
        }
    }

    /// ESPN session cookie pair. Curly braces are kept on the SWID since ESPN expects them.
    pub fn espn(swid: &str, espn_s2: &str) -> Self {
        Self::cookie(format!("SWID={}; espn_s2={}", swid.trim(), espn_s2.trim()))
    }

    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::Bearer,
            secret: token.into(),
        }
    }

    pub fn api_key(key: impl Into<String>) -> Self {
        Self {
            kind: CredentialKind::ApiKey,
            secret: key.into(),
        }
    }

    pub fn kind(&self) -> CredentialKind {
        self.kind
    }

    /// Raw secret, for building requests only.
    pub fn expose(&self) -> &str {
        &self.secret
    }

    /// Headers carrying this credential. API keys travel as query parameters, so they add none.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        match self.kind {
            CredentialKind::Cookie => {
                let mut value = HeaderValue::from_str(&self.secret)?;
                value.set_sensitive(true);
                headers.insert(COOKIE, value);
            }
            CredentialKind::Bearer => {
                let mut value = HeaderValue::from_str(&format!("Bearer {}", self.secret))?;
                value.set_sensitive(true);
                headers.insert(AUTHORIZATION, value);
            }
            CredentialKind::ApiKey => {}
        }
        Ok(headers)
    }

    /// Split a cookie credential into `(name, value)` pairs.
    pub fn cookie_pairs(&self) -> Vec<(String, String)> {
        if self.kind != CredentialKind::Cookie {
            return Vec::new();
        }
        self.secret
            .split(';')
            .filter_map(|part| {
                let (name, value) = part.split_once('=')?;
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some((name.to_string(), value.trim().to_string()))
            })
            .collect()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("kind", &self.kind)
            .field("secret", &"<redacted>")
            .finish()
    }
}
