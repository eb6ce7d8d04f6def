use chrono::{DateTime, Utc};
use log::{debug, warn};
use reqwest::blocking::Client;
use serde_json::{Map, Value};

use crate::category::RankingCategory;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::http_client::http_client;

const RANK_KEYS: &[&str] = &["RankingPosition", "Rank", "Position", "CurrentRank"];
const NAME_KEYS: &[&str] = &["PlayerName", "Name", "FullName", "Players"];
const POINTS_KEYS: &[&str] = &["RankingPointsYTD", "Points", "RankingPoints", "TotalPoints"];

/// One competitor row exactly as the backend sent it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankingEntry {
    fields: Map<String, Value>,
}

impl RankingEntry {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Non-object rows become empty entries so they still count towards totals.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self { fields },
            _ => Self::default(),
        }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn country(&self) -> Option<&str> {
        self.fields
            .get("CountryName")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn rank(&self) -> Option<String> {
        pick_text(&self.fields, RANK_KEYS)
    }

    pub fn name(&self) -> Option<String> {
        pick_text(&self.fields, NAME_KEYS)
    }

    pub fn points(&self) -> Option<String> {
        pick_text(&self.fields, POINTS_KEYS)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankingResponse {
    pub category: RankingCategory,
    pub entries: Vec<RankingEntry>,
    pub updated_at: String,
}

impl RankingResponse {
    pub fn empty(category: RankingCategory, now: DateTime<Utc>) -> Self {
        Self {
            category,
            entries: Vec::new(),
            updated_at: now.to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RankingClient {
    base_url: String,
    client: Client,
}

impl RankingClient {
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, ApiError> {
        let client = http_client(config)?.clone();
        Ok(Self::new(config.api_url.clone(), client))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn fetch_ranking(&self, category: RankingCategory) -> Result<RankingResponse, ApiError> {
        let url = format!("{}/api/rankings/{}", self.base_url, category.code());
        debug!("GET {url}");
        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            warn!("ranking fetch for {} failed with {status}", category.code());
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        let ranking = parse_ranking_json(category, &body, Utc::now())?;
        debug!(
            "ranking {} loaded with {} entries",
            category.code(),
            ranking.entries.len()
        );
        Ok(ranking)
    }

    /// Asks the backend to refresh its own source. Callers re-fetch afterwards.
    pub fn trigger_update(&self) -> Result<(), ApiError> {
        let url = format!("{}/api/update", self.base_url);
        debug!("POST {url}");
        let resp = self.client.post(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    pub fn health(&self) -> Result<bool, ApiError> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send()?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Http {
                status: status.as_u16(),
            });
        }
        let body = resp.text()?;
        let root: Value = serde_json::from_str(body.trim())?;
        Ok(root
            .get("status")
            .and_then(Value::as_str)
            .is_some_and(|s| s.eq_ignore_ascii_case("ok")))
    }
}

/// Parses `{ data: { Result: [...] }, updated_at? }`.
///
/// A missing list is an empty ranking, and a missing timestamp becomes `now`.
pub fn parse_ranking_json(
    category: RankingCategory,
    raw: &str,
    now: DateTime<Utc>,
) -> Result<RankingResponse, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(RankingResponse::empty(category, now));
    }

    let root: Value = serde_json::from_str(trimmed)?;
    let entries = root
        .get("data")
        .and_then(|data| data.get("Result"))
        .and_then(Value::as_array)
        .map(|rows| rows.iter().cloned().map(RankingEntry::from_value).collect())
        .unwrap_or_default();
    let updated_at = root
        .get("updated_at")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| now.to_rfc3339());

    Ok(RankingResponse {
        category,
        entries,
        updated_at,
    })
}

fn pick_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match fields.get(*key) {
            Some(Value::String(s)) if !s.trim().is_empty() => return Some(s.trim().to_string()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}
