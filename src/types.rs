use serde::{Deserialize, Serialize};

/// Back and lay prices for one market, indexed by outcome (first team, second team, draw).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Offers {
    #[serde(default)]
    pub h2h: Vec<f64>,
    #[serde(default)]
    pub h2h_lay: Vec<f64>,
}

/// A bookmaker or exchange offering prices on a fixture.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Site {
    #[serde(rename = "site_key")]
    pub id: String,
    #[serde(rename = "site_nice", default)]
    pub name: String,
    #[serde(rename = "last_update", default)]
    pub last_update: i64,
    #[serde(rename = "odds", default)]
    pub offers: Offers,
}

impl Site {
    pub fn quote(&self, outcome_idx: usize, outcome: &str) -> Quote {
        Quote {
            participant: self.id.clone(),
            outcome: outcome.to_string(),
            back: self.offers.h2h.get(outcome_idx).copied(),
            lay: self.offers.h2h_lay.get(outcome_idx).copied(),
        }
    }
}

/// One participant's prices for a single outcome.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub participant: String,
    pub outcome: String,
    pub back: Option<f64>,
    pub lay: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(rename = "sport_key", default)]
    pub league_id: String,
    #[serde(rename = "sport_nice", default)]
    pub league_name: String,
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(rename = "commence_time", default)]
    pub kickoff: i64,
    #[serde(rename = "sites", default)]
    pub sites: Vec<Site>,
}

impl Fixture {
    pub fn label(&self) -> String {
        let home = self.teams.first().map(String::as_str).unwrap_or("?");
        let away = self.teams.get(1).map(String::as_str).unwrap_or("?");
        format!("{home} v {away}")
    }
}

/// Response body of the league odds endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LeagueFeed {
    #[serde(rename = "success", default)]
    pub success: bool,
    #[serde(rename = "data", default)]
    pub fixtures: Vec<Fixture>,
}

impl LeagueFeed {
    pub fn league_name(&self) -> Option<&str> {
        self.fixtures
            .iter()
            .map(|f| f.league_name.as_str())
            .find(|name| !name.is_empty())
    }
}

/// One flattened (fixture, runner, bookmaker, exchange) record from the PM feed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub exchange: String,
    #[serde(rename = "event_name", default)]
    pub fixture: String,
    #[serde(rename = "team1", default)]
    pub home: String,
    #[serde(rename = "team2", default)]
    pub away: String,
    #[serde(rename = "competition", default)]
    pub league_name: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(rename = "runner_name", default)]
    pub runner: String,
    #[serde(rename = "bookmaker_name", default)]
    pub bookmaker: String,
    #[serde(rename = "bookmaker_odds", default, deserialize_with = "de_price_string")]
    pub back_raw: String,
    #[serde(rename = "betfair_odds", default, deserialize_with = "de_price_string")]
    pub lay_raw: String,
}

impl Event {
    pub fn back_odds(&self) -> f64 {
        parse_price(&self.back_raw)
    }

    pub fn lay_odds(&self) -> f64 {
        parse_price(&self.lay_raw)
    }

    pub fn label(&self) -> String {
        format!("{} v {}", self.home, self.away)
    }

    pub fn display_date(&self) -> String {
        format!("{} {}", self.date, self.time)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFeed {
    #[serde(rename = "data", default)]
    pub events: Vec<Event>,
    // Upstream spelling.
    #[serde(rename = "data_lenght", default)]
    pub record_count: usize,
}

/// Prices arrive as strings; unparseable or missing values count as zero.
pub fn parse_price(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

// The feed occasionally sends numbers or nulls where strings are expected.
fn de_price_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// A single accepted back/lay comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OddsLine {
    pub exchange: String,
    pub team: String,
    pub back_stake: f64,
    pub back_odds: f64,
    pub lay_stake: f64,
    pub lay_odds: f64,
    pub qualifying_loss: f64,
    pub profit: f64,
    pub comparative_odds: f64,
}

/// All accepted comparisons for one fixture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub fixture: String,
    pub date: String,
    pub lines: Vec<OddsLine>,
}

impl Report {
    pub fn new(fixture: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            fixture: fixture.into(),
            date: date.into(),
            lines: Vec::new(),
        }
    }
}
