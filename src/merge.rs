use std::collections::HashMap;

use crate::types::Report;

/// Fold reports sharing a fixture label into the first one seen.
///
/// Lines keep their discovery order and fixtures keep first-seen order. The
/// date of the first report for a fixture is kept.
pub fn merge_reports(raw: Vec<Report>) -> Vec<Report> {
    let mut merged: Vec<Report> = Vec::with_capacity(raw.len());
    let mut index: HashMap<String, usize> = HashMap::new();

    for report in raw {
        match index.get(&report.fixture) {
            Some(&pos) => merged[pos].lines.extend(report.lines),
            None => {
                index.insert(report.fixture.clone(), merged.len());
                merged.push(report);
            }
        }
    }

    merged
}
