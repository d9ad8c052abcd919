use std::path::PathBuf;

use anyhow::{Context, Result, anyhow, bail};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};

use oddsreader::compare::{CompareSettings, LEAGUE_HORIZON_HOURS, compare_events, compare_fixtures};
use oddsreader::event_fetch::{EventQuery, fetch_events, load_event_file};
use oddsreader::logging::init_logging;
use oddsreader::merge::merge_reports;
use oddsreader::odds_fetch::{LeagueSource, OddsApiConfig, all_failed, fetch_leagues};
use oddsreader::report::{render_json, render_text};
use oddsreader::types::Report;

/// Find bookmaker back prices worth hedging with an exchange lay.
#[derive(Parser, Debug)]
#[command(name = "oddsreader", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Retrieve latest league odds from the odds API and compare them
    Compare(CompareArgs),
    /// Retrieve latest selections from the PM feed and compare them
    Pm(PmArgs),
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Bookmaker site key to take back prices from
    #[arg(long)]
    bookmaker: String,
    /// Comma separated exchange site keys to compare lay prices with
    #[arg(long, value_delimiter = ',', required = true)]
    exchanges: Vec<String>,
    /// Stake of the back bet
    #[arg(long, default_value_t = 10.0)]
    back_stake: f64,
    /// Report only comparisons whose comparative odds beat this
    #[arg(long, default_value_t = 0.0)]
    odds_limit: f64,
    /// Maximum qualifying loss; zero or unset disables the cap
    #[arg(long)]
    ql_limit: Option<f64>,
    /// Ignore fixtures kicking off further ahead than this
    #[arg(long, default_value_t = LEAGUE_HORIZON_HOURS)]
    horizon_hours: i64,
    /// Comma separated league keys; defaults to ODDS_LEAGUES
    #[arg(long, value_delimiter = ',')]
    leagues: Vec<String>,
    /// Read `<league>.json` files from this directory instead of the API
    #[arg(long)]
    fixtures_dir: Option<PathBuf>,
    /// Print reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct PmArgs {
    /// JSON file with the feed endpoint, referer, host and cookies; falls back to PM_* env vars
    #[arg(long)]
    query_file: Option<PathBuf>,
    /// Only consider this bookmaker; empty accepts all
    #[arg(long, default_value = "")]
    bookmaker: String,
    /// Comma separated exchanges to accept lay prices from
    #[arg(long, value_delimiter = ',', default_value = "Betfair")]
    exchanges: Vec<String>,
    #[arg(long, default_value_t = 10.0)]
    back_stake: f64,
    #[arg(long, default_value_t = 0.0)]
    odds_limit: f64,
    #[arg(long)]
    ql_limit: Option<f64>,
    /// Hours ahead to look for fixtures
    #[arg(long, default_value_t = 48)]
    interval: u32,
    /// Read the feed from a file instead of the network
    #[arg(long)]
    events_file: Option<PathBuf>,
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    init_logging();

    match Cli::parse().command {
        Command::Compare(args) => run_compare(args),
        Command::Pm(args) => run_pm(args),
    }
}

fn run_compare(args: CompareArgs) -> Result<()> {
    check_stake(args.back_stake)?;
    let cfg = OddsApiConfig::from_env();
    let leagues = if args.leagues.is_empty() {
        cfg.leagues.clone()
    } else {
        args.leagues.clone()
    };
    if leagues.is_empty() {
        bail!("no leagues configured");
    }

    let settings = CompareSettings::new(&args.bookmaker, args.exchanges.clone(), args.back_stake)
        .with_thresholds(args.odds_limit, args.ql_limit)
        .with_horizon_hours(args.horizon_hours);
    info!(bookmaker = %settings.bookmaker, exchanges = ?settings.exchanges, "comparing leagues");

    let source = match args.fixtures_dir {
        Some(dir) => LeagueSource::Dir(dir),
        None => LeagueSource::Remote(cfg),
    };

    let now = Utc::now().timestamp();
    let results = fetch_leagues(&source, &leagues);
    let nothing_fetched = all_failed(&results);
    for (league, result) in results {
        let feed = match result {
            Ok(feed) => feed,
            Err(err) => {
                error!(league = %league, error = %err, "league fetch failed");
                continue;
            }
        };
        let reports = compare_fixtures(&feed.fixtures, &settings, now);
        info!(
            league = %league,
            fixtures = feed.fixtures.len(),
            reports = reports.len(),
            "league compared"
        );
        let title = feed.league_name().unwrap_or(&league).to_string();
        print_reports(&title, &reports, args.json)?;
    }

    if nothing_fetched {
        return Err(anyhow!("all {} league fetches failed", leagues.len()));
    }
    Ok(())
}

fn run_pm(args: PmArgs) -> Result<()> {
    check_stake(args.back_stake)?;
    let feed = match args.events_file.as_deref() {
        Some(path) => load_event_file(path).context("loading pm events file")?,
        None => {
            let query = match args.query_file.as_deref() {
                Some(path) => EventQuery::from_file(path).context("loading pm query file")?,
                None => EventQuery::from_env().context("pm query not configured")?,
            };
            fetch_events(&query, args.interval).context("pm feed request failed")?
        }
    };

    let settings = CompareSettings::new(&args.bookmaker, args.exchanges.clone(), args.back_stake)
        .with_thresholds(args.odds_limit, args.ql_limit)
        .with_horizon_hours(i64::from(args.interval));

    let raw = compare_events(&feed.events, &settings, Utc::now().timestamp());
    let accepted = raw.len();
    let reports = merge_reports(raw);
    info!(
        events = feed.events.len(),
        accepted,
        fixtures = reports.len(),
        "pm feed compared"
    );

    let title = format!("PM Selections matching Odds Criteria of {:.0}", args.odds_limit);
    print_reports(&title, &reports, args.json)
}

fn print_reports(title: &str, reports: &[Report], json: bool) -> Result<()> {
    if json {
        println!("{}", render_json(title, reports).context("serialize reports")?);
    } else {
        print!("{}", render_text(title, reports));
    }
    Ok(())
}

fn check_stake(stake: f64) -> Result<()> {
    if !stake.is_finite() || stake <= 0.0 {
        bail!("back stake must be a positive amount, got {stake}");
    }
    Ok(())
}
