use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use reqwest::header::USER_AGENT;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::http_client::{http_client, read_body};
use crate::types::LeagueFeed;

const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com/v3/odds/";
const DEFAULT_LEAGUES: &[&str] = &[
    "soccer_epl",
    "soccer_efl_champ",
    "soccer_spain_la_liga",
    "soccer_italy_serie_a",
    "soccer_germany_bundesliga",
];

#[derive(Debug, Clone)]
pub struct OddsApiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub region: String,
    pub market: String,
    pub leagues: Vec<String>,
}

impl OddsApiConfig {
    pub fn from_env() -> Self {
        let api_key = ["ODDS_APIKEY", "ODDS_API_KEY"]
            .iter()
            .filter_map(|key| env::var(key).ok())
            .map(|s| s.trim().to_string())
            .find(|s| !s.is_empty());
        let base_url = env_or("ODDS_API_BASE_URL", DEFAULT_BASE_URL);
        let region = env_or("ODDS_REGION", "uk").to_ascii_lowercase();
        let market = env_or("ODDS_MARKET", "h2h").to_ascii_lowercase();
        let leagues = env::var("ODDS_LEAGUES")
            .ok()
            .map(|raw| split_list(&raw))
            .filter(|list| !list.is_empty())
            .unwrap_or_else(|| DEFAULT_LEAGUES.iter().map(|s| s.to_string()).collect());

        Self {
            base_url,
            api_key,
            region,
            market,
            leagues,
        }
    }
}

/// Where league fixtures come from.
#[derive(Debug, Clone)]
pub enum LeagueSource {
    Remote(OddsApiConfig),
    /// A directory holding one `<league>.json` per league.
    Dir(PathBuf),
}

pub fn fetch_league(cfg: &OddsApiConfig, league: &str) -> Result<LeagueFeed, FetchError> {
    let Some(api_key) = cfg.api_key.as_deref() else {
        return Err(FetchError::MissingConfig("ODDS_APIKEY"));
    };

    let client = http_client()?;
    let resp = client
        .get(&cfg.base_url)
        .query(&[
            ("apiKey", api_key),
            ("sport", league),
            ("region", cfg.region.as_str()),
            ("market", cfg.market.as_str()),
        ])
        .header(USER_AGENT, "oddsreader/0.1")
        .send()?;
    let body = read_body(resp)?;
    let feed = parse_league_json(&body)?;
    debug!(league, fixtures = feed.fixtures.len(), "league fetched");
    Ok(feed)
}

pub fn parse_league_json(raw: &str) -> Result<LeagueFeed, FetchError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(LeagueFeed::default());
    }
    serde_json::from_str(trimmed).map_err(|e| FetchError::parse("league", e))
}

pub fn load_league_file(path: &Path) -> Result<LeagueFeed, FetchError> {
    let raw = fs::read_to_string(path).map_err(|source| FetchError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse_league_json(&raw)
}

/// Fetch every league on a bounded pool. Results keep the order of `leagues`.
pub fn fetch_leagues(
    source: &LeagueSource,
    leagues: &[String],
) -> Vec<(String, Result<LeagueFeed, FetchError>)> {
    let fetch_one = |league: &String| {
        let result = match source {
            LeagueSource::Remote(cfg) => fetch_league(cfg, league),
            LeagueSource::Dir(dir) => load_league_file(&dir.join(format!("{league}.json"))),
        };
        (league.clone(), result)
    };

    let pool = build_fetch_pool();
    info!(leagues = leagues.len(), "fetching leagues");
    with_fetch_pool(&pool, || leagues.par_iter().map(fetch_one).collect())
}

/// True when there were leagues to fetch and none of them succeeded.
pub fn all_failed(results: &[(String, Result<LeagueFeed, FetchError>)]) -> bool {
    !results.is_empty() && results.iter().all(|(_, result)| result.is_err())
}

fn build_fetch_pool() -> Option<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(fetch_parallelism())
        .build()
        .ok()
}

fn with_fetch_pool<T>(pool: &Option<rayon::ThreadPool>, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    if let Some(pool) = pool.as_ref() {
        pool.install(action)
    } else {
        action()
    }
}

fn fetch_parallelism() -> usize {
    env::var("FETCH_PARALLELISM")
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(6)
        .clamp(2, 32)
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
