//! Raw tier payloads and their conversion into canonical models.
//!
//! Every tier hands back a [`RawPayload`]. Each variant is consumed only by
//! the normalizer for its own source shape:
//!
//! - `Espn`: ESPN v3 / fan API JSON, see [`crate::espn::normalize`]
//! - `Sleeper`: Sleeper API JSON, see [`crate::sleeper::normalize`]
//! - `Page`: HTML fetched by a scraping tier, see [`html`]
//! - `Canonical`: already canonical (synthetic tier)
//!
//! Normalization is total for parseable input: a bad field degrades to a
//! default and is noted in [`Normalized::degradations`]. Input that matches
//! no known shape is a [`TierError::Parse`].

pub mod html;

use crate::cli::types::Platform;
use crate::error::TierError;
use crate::models::Payload;
use crate::request::LogicalRequest;
use crate::sleeper::types::SleeperRaw;
use serde_json::Value;


#[derive(Debug, Clone)]
pub enum RawPayload {
    Espn(Value),
    Sleeper(SleeperRaw),
    Page { platform: Platform, body: String },
    Canonical(Payload),
}

/// Canonical payload plus the field-level fallbacks taken while building it.
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    pub payload: Payload,
    pub degradations: Vec<String>,
}

impl Normalized {
    pub fn clean(payload: Payload) -> Self {
        Self {
            payload,
            degradations: Vec::new(),
        }
    }
}

/// Collects degradation notes while a normalizer walks a payload.
#[derive(Debug, Default)]
pub struct Degradations(Vec<String>);

impl Degradations {
    pub fn note(&mut self, message: impl Into<String>) {
        self.0.push(message.into());
    }

    /// Record `count` dropped items under one summary line.
    pub fn note_count(&mut self, count: usize, what: &str) {
        if count > 0 {
            self.0.push(format!("{} {}", count, what));
        }
    }

    pub fn finish(self, payload: Payload) -> Normalized {
        Normalized {
            payload,
            degradations: self.0,
        }
    }
}

/// Most lineup slots of one label a real league carries.
pub const MAX_SLOTS_PER_LABEL: u32 = 20;

/// Append `count` copies of a lineup label, clamped to [`MAX_SLOTS_PER_LABEL`].
pub fn push_lineup_slots(out: &mut Vec<String>, label: &str, count: u32, deg: &mut Degradations) {
    let kept = count.min(MAX_SLOTS_PER_LABEL);
    if kept < count {
        deg.note(format!(
            "lineup slot {} claims {} entries, kept {}",
            label, count, kept
        ));
    }
    out.extend(std::iter::repeat(label.to_string()).take(kept as usize));
}

pub fn normalize(
    platform: Platform,
    request: &LogicalRequest,
    raw: RawPayload,
) -> Result<Normalized, TierError> {
    let normalized = match raw {
        RawPayload::Espn(value) => crate::espn::normalize::normalize(request, &value)?,
        RawPayload::Sleeper(raw) => crate::sleeper::normalize::normalize(request, raw)?,
        RawPayload::Page { platform, body } => html::normalize_page(platform, request, &body)?,
        RawPayload::Canonical(payload) => Normalized::clean(payload),
    };

    if !matches_request(&normalized.payload, request) {
        return Err(TierError::parse(
            format!("{} normalizer", platform),
            format!(
                "payload kind does not answer a {} request",
                request.operation()
            ),
        ));
    }
    Ok(normalized)
}

fn matches_request(payload: &Payload, request: &LogicalRequest) -> bool {
    matches!(
        (payload, request),
        (Payload::Roster(_), LogicalRequest::Roster { .. })
            | (Payload::Transactions(_), LogicalRequest::Transactions { .. })
            | (Payload::UserProfile(_), LogicalRequest::UserProfile { .. })
            | (Payload::LeagueSettings(_), LogicalRequest::LeagueSettings { .. })
            | (Payload::Players(_), LogicalRequest::PlayerDirectory { .. })
    )
}

/// Depth-first search for the first JSON object carrying `key`.
pub fn find_object_with_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if map.contains_key(key) {
                return Some(value);
            }
            map.values().find_map(|v| find_object_with_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_object_with_key(v, key)),
        _ => None,
    }
}

/// Numeric or string JSON id as a string.
pub fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
