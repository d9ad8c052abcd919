use std::fmt::Write as _;

use serde::Serialize;

use crate::types::Report;

#[derive(Debug, Serialize)]
struct Listing<'a> {
    title: &'a str,
    reports: &'a [Report],
}

pub fn render_text(title: &str, reports: &[Report]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "-------------------- {title} --------------------");
    for report in reports {
        let _ = writeln!(
            out,
            "{} {} Qualifying Bets on Exchanges",
            report.date, report.fixture
        );
        for line in &report.lines {
            let _ = writeln!(
                out,
                "Exchange {} -- {} Backstake £{:.2} @ {:.2}, Laystake £{:.2} @ {:.2}, QL £{:.2}, Potential Profit £{:.2} at Odds {:.2}",
                line.exchange,
                line.team,
                line.back_stake,
                line.back_odds,
                line.lay_stake,
                line.lay_odds,
                line.qualifying_loss,
                line.profit,
                line.comparative_odds,
            );
        }
        out.push('\n');
    }
    out
}

pub fn render_json(title: &str, reports: &[Report]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Listing { title, reports })
}
