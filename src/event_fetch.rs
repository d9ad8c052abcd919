use std::env;
use std::fs;
use std::path::Path;

use chrono::Utc;
use reqwest::header::{COOKIE, HOST, REFERER, USER_AGENT};
use serde::Deserialize;
use tracing::debug;

use crate::error::FetchError;
use crate::http_client::{BROWSER_AGENT, http_client, read_body};
use crate::types::EventFeed;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryCookie {
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(alias = "Value")]
    pub value: String,
}

/// Endpoint and session details for the PM feed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EventQuery {
    /// URL prefix; the hour interval is appended directly to it.
    #[serde(alias = "BaseUri", alias = "baseUri")]
    pub base_uri: String,
    #[serde(default, alias = "Referer")]
    pub referer: String,
    #[serde(default, alias = "Host")]
    pub host: String,
    #[serde(default, alias = "Cookies")]
    pub cookies: Vec<QueryCookie>,
}

impl EventQuery {
    pub fn from_file(path: &Path) -> Result<Self, FetchError> {
        let raw = fs::read_to_string(path).map_err(|source| FetchError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| FetchError::parse("query", e))
    }

    pub fn from_env() -> Result<Self, FetchError> {
        let base_uri = env::var("PM_BASE_URI")
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(FetchError::MissingConfig("PM_BASE_URI"))?;
        Ok(Self {
            base_uri,
            referer: env::var("PM_REFERER").unwrap_or_default(),
            host: env::var("PM_HOST").unwrap_or_default(),
            cookies: env::var("PM_COOKIES")
                .map(|raw| parse_cookies(&raw))
                .unwrap_or_default(),
        })
    }

    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        Some(
            self.cookies
                .iter()
                .map(|c| format!("{}={}", c.name, c.value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// The request URL for `interval_hours`, with a millisecond cache buster.
    pub fn url(&self, interval_hours: u32, now_millis: i64) -> String {
        format!("{}{}&_={}", self.base_uri, interval_hours, now_millis)
    }
}

/// Parse `name=value; name=value` into cookies, skipping malformed pairs.
pub fn parse_cookies(raw: &str) -> Vec<QueryCookie> {
    raw.split(';')
        .filter_map(|pair| {
            let (name, value) = pair.split_once('=')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(QueryCookie {
                name: name.to_string(),
                value: value.trim().to_string(),
            })
        })
        .collect()
}

pub fn fetch_events(query: &EventQuery, interval_hours: u32) -> Result<EventFeed, FetchError> {
    let url = query.url(interval_hours, Utc::now().timestamp_millis());
    let client = http_client()?;

    let mut req = client
        .get(&url)
        .header(USER_AGENT, BROWSER_AGENT)
        .header("Accept", "application/json, text/plain, */*")
        .header("X-Requested-With", "XMLHttpRequest");
    if !query.referer.is_empty() {
        req = req.header(REFERER, &query.referer);
    }
    if !query.host.is_empty() {
        req = req.header(HOST, &query.host);
    }
    if let Some(cookies) = query.cookie_header() {
        req = req.header(COOKIE, cookies);
    }

    let body = read_body(req.send()?)?;
    let feed = parse_event_json(&body)?;
    debug!(events = feed.events.len(), reported = feed.record_count, "pm feed fetched");
    Ok(feed)
}

pub fn parse_event_json(raw: &str) -> Result<EventFeed, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(EventFeed::default());
    }
    serde_json::from_str(trimmed).map_err(|e| FetchError::parse("event", e))
}

pub fn load_event_file(path: &Path) -> Result<EventFeed, FetchError> {
    let raw = fs::read_to_string(path).map_err(|source| FetchError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_event_json(&raw)
}
