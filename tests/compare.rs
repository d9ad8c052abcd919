use std::path::PathBuf;

use oddsreader::compare::{CompareSettings, compare_events, compare_fixture, compare_fixtures};
use oddsreader::event_fetch::load_event_file;
use oddsreader::merge::merge_reports;
use oddsreader::odds_fetch::load_league_file;
use oddsreader::types::{Fixture, LeagueFeed, OddsLine, Offers, Site};

const NOW: i64 = 1_600_000_000;
const DAY: i64 = 86_400;

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn league() -> LeagueFeed {
    load_league_file(&fixture_path("soccer_epl.json")).expect("league fixture should load")
}

fn league_settings(odds_limit: f64) -> CompareSettings {
    CompareSettings::new(
        "williamhill",
        vec!["betfair".to_string(), "smarkets".to_string()],
        10.0,
    )
    .with_thresholds(odds_limit, None)
}

fn summary(lines: &[OddsLine]) -> Vec<(&str, &str, f64)> {
    lines
        .iter()
        .map(|l| (l.exchange.as_str(), l.team.as_str(), l.comparative_odds))
        .collect()
}

fn site(id: &str, back: [f64; 2], lay: Option<[f64; 2]>) -> Site {
    Site {
        id: id.to_string(),
        offers: Offers {
            h2h: back.to_vec(),
            h2h_lay: lay.map(|l| l.to_vec()).unwrap_or_default(),
        },
        ..Site::default()
    }
}

fn simple_fixture(kickoff: i64) -> Fixture {
    Fixture {
        teams: vec!["Team A".to_string(), "Team B".to_string()],
        kickoff,
        sites: vec![
            site("williamhill", [2.0, 3.5], None),
            site("betfair", [1.98, 3.45], Some([2.1, 3.6])),
        ],
        ..Fixture::default()
    }
}

#[test]
fn league_fixtures_follow_exchange_then_outcome_order() {
    let feed = league();
    let reports = compare_fixtures(&feed.fixtures, &league_settings(50.0), NOW);
    assert_eq!(reports.len(), 2);

    assert_eq!(reports[0].fixture, "Arsenal v Chelsea");
    assert_eq!(reports[0].date, "15 Sep 2020 12:26 UTC");
    assert_eq!(
        summary(&reports[0].lines),
        vec![
            ("betfair", "Chelsea", 83.34),
            ("smarkets", "Arsenal", 100.0),
            ("smarkets", "Chelsea", 250.0),
        ]
    );

    // Smarkets has no away price on this one; the eight-day fixture is out of range.
    assert_eq!(reports[1].fixture, "Leeds v Spurs");
    assert_eq!(
        summary(&reports[1].lines),
        vec![("betfair", "Spurs", 122.46), ("smarkets", "Leeds", 115.38)]
    );
}

#[test]
fn accepted_line_carries_hedge_figures() {
    let feed = league();
    let reports = compare_fixtures(&feed.fixtures, &league_settings(0.0), NOW);
    let line = &reports[0].lines[0];
    assert_eq!(line.exchange, "betfair");
    assert_eq!(line.team, "Arsenal");
    assert_eq!(line.back_stake, 10.0);
    assert_eq!(line.back_odds, 2.0);
    assert_eq!(line.lay_odds, 2.1);
    assert_eq!(line.lay_stake, 9.62);
    assert_eq!(line.qualifying_loss, 0.58);
    assert_eq!(line.profit, 19.43);
    assert_eq!(line.comparative_odds, 34.5);
}

#[test]
fn ql_cap_filters_league_lines() {
    let feed = league();
    let settings = league_settings(50.0).with_thresholds(50.0, Some(0.3));
    let report = compare_fixture(&feed.fixtures[0], &settings, NOW).expect("report");
    assert_eq!(
        summary(&report.lines),
        vec![("smarkets", "Arsenal", 100.0), ("smarkets", "Chelsea", 250.0)]
    );
}

#[test]
fn seven_day_horizon_bounds_fixtures() {
    let settings = league_settings(0.0);
    assert!(compare_fixture(&simple_fixture(NOW + 6 * DAY), &settings, NOW).is_some());
    assert!(compare_fixture(&simple_fixture(NOW + 8 * DAY), &settings, NOW).is_none());
    // Already started fixtures are still priced.
    assert!(compare_fixture(&simple_fixture(NOW - DAY), &settings, NOW).is_some());
}

#[test]
fn fixture_without_bookmaker_or_prices_is_dropped() {
    let feed = league();
    let settings = league_settings(0.0);
    assert!(compare_fixture(&feed.fixtures[3], &settings, NOW).is_none());
    assert!(compare_fixture(&feed.fixtures[4], &settings, NOW).is_none());
}

#[test]
fn unlisted_exchange_is_ignored() {
    let settings = CompareSettings::new("williamhill", vec!["matchbook".to_string()], 10.0);
    assert!(compare_fixture(&simple_fixture(NOW), &settings, NOW).is_none());
}

#[test]
fn higher_limit_never_adds_lines() {
    let feed = league();
    let mut previous = usize::MAX;
    for limit in [0.0, 10.0, 50.0, 100.0, 200.0, 300.0] {
        let count: usize = compare_fixtures(&feed.fixtures, &league_settings(limit), NOW)
            .iter()
            .map(|r| r.lines.len())
            .sum();
        assert!(count <= previous, "limit {limit} gave {count} > {previous}");
        previous = count;
    }
}

fn pm_settings(exchanges: &[&str]) -> CompareSettings {
    CompareSettings::new("", exchanges.iter().map(|e| e.to_string()).collect(), 10.0)
        .with_thresholds(50.0, None)
        .with_horizon_hours(48)
}

#[test]
fn pm_events_merge_by_fixture() {
    let feed = load_event_file(&fixture_path("pm_events.json")).expect("pm fixture should load");
    let raw = compare_events(&feed.events, &pm_settings(&["Betfair"]), NOW);
    assert_eq!(raw.len(), 3);
    assert!(raw.iter().all(|r| r.lines.len() == 1));

    let reports = merge_reports(raw);
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0].fixture, "Arsenal v Chelsea");
    assert_eq!(reports[0].date, "2020-09-14 15:00");
    assert_eq!(
        summary(&reports[0].lines),
        vec![("Betfair", "Arsenal", 64.51), ("Betfair", "Chelsea", 74.29)]
    );
    assert_eq!(reports[1].fixture, "Leeds v Spurs");
    assert_eq!(summary(&reports[1].lines), vec![("Betfair", "Spurs", 64.51)]);
}

#[test]
fn pm_exchanges_match_case_insensitively() {
    let feed = load_event_file(&fixture_path("pm_events.json")).expect("pm fixture should load");
    let raw = compare_events(&feed.events, &pm_settings(&["betfair", "SMARKETS"]), NOW);
    let reports = merge_reports(raw);
    assert_eq!(
        summary(&reports[0].lines),
        vec![
            ("Betfair", "Arsenal", 64.51),
            ("Betfair", "Chelsea", 74.29),
            ("Smarkets", "Chelsea", 325.0),
        ]
    );
}

#[test]
fn pm_bookmaker_filter_applies_when_set() {
    let feed = load_event_file(&fixture_path("pm_events.json")).expect("pm fixture should load");
    let mut settings = pm_settings(&["Betfair"]);
    settings.bookmaker = "bet365".to_string();
    let reports = merge_reports(compare_events(&feed.events, &settings, NOW));
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].fixture, "Arsenal v Chelsea");
}

#[test]
fn pm_ql_cap_drops_large_losses() {
    let feed = load_event_file(&fixture_path("pm_events.json")).expect("pm fixture should load");
    let settings = pm_settings(&["Betfair"]).with_thresholds(50.0, Some(0.5));
    let reports = merge_reports(compare_events(&feed.events, &settings, NOW));
    // Arsenal carries a 0.62 loss, Chelsea 0.35.
    assert_eq!(reports.len(), 1);
    assert_eq!(summary(&reports[0].lines), vec![("Betfair", "Chelsea", 74.29)]);
}
