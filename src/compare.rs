use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use tracing::{debug, trace, warn};

use crate::arbitrage::{SkipReason, Thresholds, assess};
use crate::commission::commission_for;
use crate::types::{Event, Fixture, OddsLine, Quote, Report, Site};

pub const LEAGUE_HORIZON_HOURS: i64 = 168;

#[derive(Debug, Clone)]
pub struct CompareSettings {
    pub bookmaker: String,
    pub exchanges: Vec<String>,
    pub back_stake: f64,
    pub thresholds: Thresholds,
    pub horizon_secs: i64,
}

impl CompareSettings {
    pub fn new(bookmaker: impl Into<String>, exchanges: Vec<String>, back_stake: f64) -> Self {
        Self {
            bookmaker: bookmaker.into(),
            exchanges,
            back_stake,
            thresholds: Thresholds::new(0.0, None),
            horizon_secs: LEAGUE_HORIZON_HOURS * 3600,
        }
    }

    pub fn with_thresholds(mut self, odds_limit: f64, ql_limit: Option<f64>) -> Self {
        self.thresholds = Thresholds::new(odds_limit, ql_limit);
        self
    }

    pub fn with_horizon_hours(mut self, hours: i64) -> Self {
        self.horizon_secs = hours.saturating_mul(3600);
        self
    }

    fn lists_exchange(&self, exchange: &str) -> bool {
        self.exchanges
            .iter()
            .any(|ex| ex.eq_ignore_ascii_case(exchange))
    }
}

/// Find the bookmaker's and the exchange's sites on a fixture.
///
/// The first site carrying an id wins; later duplicates are ignored. A site
/// is never compared against itself.
pub fn match_sites<'a>(
    sites: &'a [Site],
    bookmaker: &str,
    exchange: &str,
) -> Result<(&'a Site, &'a Site), SkipReason> {
    if bookmaker == exchange {
        return Err(SkipReason::InputAbsent);
    }
    let bm = first_site(sites, bookmaker).ok_or(SkipReason::InputAbsent)?;
    let ex = first_site(sites, exchange).ok_or(SkipReason::InputAbsent)?;
    Ok((bm, ex))
}

fn first_site<'a>(sites: &'a [Site], id: &str) -> Option<&'a Site> {
    let mut found = sites.iter().filter(|s| !s.id.is_empty() && s.id == id);
    let first = found.next()?;
    if found.next().is_some() {
        warn!(site = id, "duplicate site on fixture, using first");
    }
    Some(first)
}

/// Price one outcome: back from the bookmaker quote, lay from the exchange quote.
pub fn compare_quotes(
    back: &Quote,
    lay: &Quote,
    settings: &CompareSettings,
) -> Result<OddsLine, SkipReason> {
    let (Some(back_odds), Some(lay_odds)) = (back.back, lay.lay) else {
        return Err(SkipReason::InputAbsent);
    };
    price_line(
        &lay.participant,
        &back.outcome,
        back_odds,
        lay_odds,
        settings,
    )
}

fn price_line(
    exchange: &str,
    team: &str,
    back_odds: f64,
    lay_odds: f64,
    settings: &CompareSettings,
) -> Result<OddsLine, SkipReason> {
    if !is_price(back_odds) || !is_price(lay_odds) {
        return Err(SkipReason::InputAbsent);
    }
    let commission = commission_for(exchange);
    let hedge = assess(
        settings.back_stake,
        back_odds,
        lay_odds,
        commission,
        &settings.thresholds,
    )?;
    Ok(OddsLine {
        exchange: exchange.to_string(),
        team: team.to_string(),
        back_stake: settings.back_stake,
        back_odds,
        lay_stake: hedge.lay_stake,
        lay_odds,
        qualifying_loss: hedge.qualifying_loss,
        profit: hedge.profit,
        comparative_odds: hedge.comparative_odds,
    })
}

fn is_price(odds: f64) -> bool {
    odds.is_finite() && odds > 1.0
}

fn beyond_horizon(kickoff: i64, now: i64, horizon_secs: i64) -> bool {
    kickoff.saturating_sub(now) > horizon_secs
}

/// Evaluate one league fixture against every configured exchange.
pub fn compare_fixture(fixture: &Fixture, settings: &CompareSettings, now: i64) -> Option<Report> {
    if beyond_horizon(fixture.kickoff, now, settings.horizon_secs) {
        trace!(fixture = %fixture.label(), "kickoff beyond horizon");
        return None;
    }
    if fixture.teams.len() < 2 {
        debug!(league = %fixture.league_id, "fixture without two teams");
        return None;
    }

    let mut report = Report::new(fixture.label(), format_kickoff(fixture.kickoff));
    for exchange in &settings.exchanges {
        let (bm, ex) = match match_sites(&fixture.sites, &settings.bookmaker, exchange) {
            Ok(pair) => pair,
            Err(reason) => {
                trace!(fixture = %report.fixture, exchange = %exchange, %reason, "skip exchange");
                continue;
            }
        };

        for (idx, team) in fixture.teams.iter().take(2).enumerate() {
            match compare_quotes(&bm.quote(idx, team), &ex.quote(idx, team), settings) {
                Ok(line) => report.lines.push(line),
                Err(reason) => {
                    trace!(
                        fixture = %report.fixture,
                        exchange = %ex.id,
                        team = %team,
                        %reason,
                        "skip outcome"
                    );
                }
            }
        }
    }

    if report.lines.is_empty() {
        None
    } else {
        Some(report)
    }
}

pub fn compare_fixtures(fixtures: &[Fixture], settings: &CompareSettings, now: i64) -> Vec<Report> {
    fixtures
        .iter()
        .filter_map(|f| compare_fixture(f, settings, now))
        .collect()
}

/// Evaluate a single PM feed record. Produces at most one line.
pub fn compare_event(event: &Event, settings: &CompareSettings, now: i64) -> Option<Report> {
    if event.runner.trim().eq_ignore_ascii_case("draw") {
        return None;
    }
    if !settings.lists_exchange(&event.exchange) {
        return None;
    }
    if !settings.bookmaker.is_empty() && !settings.bookmaker.eq_ignore_ascii_case(&event.bookmaker)
    {
        return None;
    }
    if let Some(kickoff) = parse_event_kickoff(&event.date, &event.time)
        && beyond_horizon(kickoff, now, settings.horizon_secs)
    {
        trace!(fixture = %event.label(), "kickoff beyond horizon");
        return None;
    }

    match price_line(
        &event.exchange,
        &event.runner,
        event.back_odds(),
        event.lay_odds(),
        settings,
    ) {
        Ok(line) => {
            let mut report = Report::new(event.label(), event.display_date());
            report.lines.push(line);
            Some(report)
        }
        Err(reason) => {
            trace!(fixture = %event.label(), runner = %event.runner, %reason, "skip event");
            None
        }
    }
}

/// Evaluate every PM record in feed order; one report per accepted record.
pub fn compare_events(events: &[Event], settings: &CompareSettings, now: i64) -> Vec<Report> {
    events
        .iter()
        .filter_map(|e| compare_event(e, settings, now))
        .collect()
}

pub fn format_kickoff(kickoff: i64) -> String {
    match Utc.timestamp_opt(kickoff, 0).single() {
        Some(dt) => dt.format("%-d %b %Y %H:%M UTC").to_string(),
        None => kickoff.to_string(),
    }
}

pub fn parse_event_kickoff(date: &str, time: &str) -> Option<i64> {
    let joined = format!("{} {}", date.trim(), time.trim());
    let joined = joined.trim();
    if joined.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(joined) {
        return Some(dt.timestamp());
    }
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%d/%m/%Y %H:%M:%S",
        "%d/%m/%Y %H:%M",
        "%d-%m-%Y %H:%M",
        "%d %b %Y %H:%M",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(joined, fmt) {
            return Some(Utc.from_utc_datetime(&naive).timestamp() - london_offset_secs(&naive));
        }
    }
    None
}

// PM dates are UK wall-clock time: BST runs from 01:00 UTC on the last Sunday
// of March to 01:00 UTC on the last Sunday of October.
fn london_offset_secs(local: &NaiveDateTime) -> i64 {
    let year = local.year();
    let start = last_sunday(year, 3).and_then(|d| d.and_hms_opt(1, 0, 0));
    let end = last_sunday(year, 10).and_then(|d| d.and_hms_opt(2, 0, 0));
    match (start, end) {
        (Some(start), Some(end)) if *local >= start && *local < end => 3600,
        _ => 0,
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let mut day = NaiveDate::from_ymd_opt(next_year, next_month, 1)?.pred_opt()?;
    while day.weekday() != Weekday::Sun {
        day = day.pred_opt()?;
    }
    Some(day)
}
