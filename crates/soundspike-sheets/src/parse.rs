//! Grid parsers for the three export tabs.
//!
//! All three parsers are total over their input: malformed or too-short
//! grids (fewer than 2 rows, since row 0 is always the header) produce an
//! empty result rather than an error. Degradation to "no data" is handled
//! one level up, at the pipeline.

use chrono::NaiveDate;
use serde_json::Value;

use soundspike_core::{DailyLogEntry, RankingRecord, SoundOverviewRecord};

use crate::grid::{cell_count, cell_text};

/// Spreadsheet serial day 0. Serial 25569 is 1970-01-01.
const SERIAL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Normalize a header cell to a calendar date.
///
/// Accepts an ISO-like date string (`2024-01-15`, optionally with a time or
/// RFC 3339 suffix) or a spreadsheet serial day-number counted from
/// 1899-12-30. Anything else is treated as "no date in this column" and the
/// column's cells are dropped by the daily-log parser.
#[must_use]
pub fn normalize_header_date(cell: &Value) -> Option<NaiveDate> {
    match cell {
        Value::Number(n) => {
            let serial = if let Some(i) = n.as_i64() {
                i
            } else {
                #[allow(clippy::cast_possible_truncation)]
                n.as_f64().map(|f| f.trunc() as i64)?
            };
            let (y, m, d) = SERIAL_EPOCH;
            NaiveDate::from_ymd_opt(y, m, d)?
                .checked_add_signed(chrono::Duration::days(serial))
        }
        Value::String(s) => parse_date_string(s.trim()),
        _ => None,
    }
}

fn parse_date_string(s: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Some(dt.date());
    }
    // US-style dates show up when the sheet locale flips.
    NaiveDate::parse_from_str(s, "%m/%d/%Y").ok()
}

/// Parse the daily-log tab: column 0 is the sound name, columns 1..N are
/// per-date post counts keyed by the header row's dates.
///
/// A cell emits an entry only when its count parses to a value > 0 AND the
/// matching header cell normalizes to a date. A reported 0 is "no data for
/// that day", never "no growth", so it produces nothing.
#[must_use]
pub fn parse_daily_log(grid: &[Vec<Value>]) -> Vec<DailyLogEntry> {
    if grid.len() < 2 {
        return Vec::new();
    }

    let header = &grid[0];
    let mut entries = Vec::new();

    for row in &grid[1..] {
        let Some(sound_name) = row.first().and_then(cell_text) else {
            continue;
        };

        for (j, cell) in row.iter().enumerate().skip(1) {
            let posts = cell_count(cell);
            if posts <= 0 {
                continue;
            }
            let Some(date) = header.get(j).and_then(normalize_header_date) else {
                continue;
            };
            #[allow(clippy::cast_sign_loss)]
            entries.push(DailyLogEntry {
                date,
                sound_name: sound_name.clone(),
                daily_posts: posts as u64,
            });
        }
    }

    entries
}

/// Parse the overview tab: one row per sound with its page link and
/// latest-known live post total.
#[must_use]
pub fn parse_overview(grid: &[Vec<Value>]) -> Vec<SoundOverviewRecord> {
    if grid.len() < 2 {
        return Vec::new();
    }

    let mut records = Vec::new();
    for row in &grid[1..] {
        let Some(sound_name) = row.first().and_then(cell_text) else {
            continue;
        };
        let sound_link = row.get(1).and_then(cell_text);
        let live_posts = row.get(2).map_or(0, cell_count).max(0);
        #[allow(clippy::cast_sign_loss)]
        records.push(SoundOverviewRecord {
            sound_name,
            sound_link,
            live_posts: live_posts as u64,
        });
    }
    records
}

/// Parse the ranking tab. `performance_rank` is assigned from the 1-based
/// position among surviving rows. Row order IS the rank, deliberately; no
/// score column is consulted.
#[must_use]
pub fn parse_ranking(grid: &[Vec<Value>]) -> Vec<RankingRecord> {
    if grid.len() < 2 {
        return Vec::new();
    }

    let mut records = Vec::new();
    let mut rank: u32 = 0;
    for row in &grid[1..] {
        let Some(sound_name) = row.first().and_then(cell_text) else {
            continue;
        };
        rank += 1;
        let live_posts = row.get(1).map_or(0, cell_count).max(0);
        #[allow(clippy::cast_sign_loss)]
        records.push(RankingRecord {
            sound_name,
            live_posts: live_posts as u64,
            performance_rank: rank,
        });
    }
    records
}

#[cfg(test)]
#[path = "parse_test.rs"]
mod parse_test;
