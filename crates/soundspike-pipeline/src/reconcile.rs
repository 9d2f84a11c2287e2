//! Reconciliation of source data into canonical [`ProcessedSound`] records.
//!
//! Two paths produce the identical output shape: the tabular path (the
//! preferred origin, fed by the three sheet tabs) and the page-scrape path
//! (fallback, fed by scraped totals plus the persisted ledger). Downstream
//! consumers cannot tell which path built a record.
//!
//! The two paths intentionally carry different per-point spike rules. The
//! tabular path has no trailing-growth context, so it keeps the flat
//! absolute threshold; the ledger-backed path applies the canonical
//! classifier with each point's window ending at that point. See DESIGN.md.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use soundspike_core::{
    slugify, ChartPoint, DailyLogEntry, HistoryEntry, ProcessedSound, RankingRecord,
    SoundOverviewRecord,
};

use crate::spike::classify_spike;

/// Flat per-point threshold for the tabular path.
const STATIC_SPIKE_THRESHOLD: u64 = 100;

/// Rank assigned to sounds absent from the ranking tab when ordering.
///
/// The final ordering is descending by rank *value*, which places these
/// unranked sounds first. That looks inverted relative to "best rank
/// first", but it is the documented upstream policy; do not "fix" it here
/// without confirming intended ranking direction.
const UNRANKED_SORT_RANK: u32 = 999;

/// Trailing window length for the scrape path's growth classification.
const TRAILING_WINDOW: usize = 7;

/// One sound's scrape outcome for this run. `total_posts == 0` means the
/// extractor found nothing and the value is **unknown**, not a true zero.
#[derive(Debug, Clone)]
pub struct ScrapedSound {
    pub id: String,
    pub name: String,
    pub total_posts: u64,
    pub sound_link: Option<String>,
}

/// Tabular path: merge the three tab outputs into canonical records.
#[must_use]
pub fn reconcile_tabular(
    daily_log: &[DailyLogEntry],
    overview: &[SoundOverviewRecord],
    ranking: &[RankingRecord],
    artist_name: &str,
    now: DateTime<Utc>,
) -> Vec<ProcessedSound> {
    // BTreeMap keeps group iteration deterministic ahead of the rank sort.
    let mut groups: BTreeMap<String, Vec<DailyLogEntry>> = BTreeMap::new();
    for entry in daily_log {
        groups
            .entry(entry.sound_name.clone())
            .or_default()
            .push(entry.clone());
    }

    let mut sounds: Vec<ProcessedSound> = Vec::with_capacity(groups.len());

    for (sound_name, mut entries) in groups {
        entries.sort_by_key(|e| e.date);

        let overview_match = overview.iter().find(|o| o.sound_name == sound_name);
        let ranking_match = ranking.iter().find(|r| r.sound_name == sound_name);

        let daily_sum: u64 = entries.iter().map(|e| e.daily_posts).sum();
        let total_posts = overview_match.map_or(daily_sum, |o| o.live_posts);

        #[allow(clippy::cast_possible_wrap)]
        let daily_growth = entries.last().map_or(0, |e| e.daily_posts as i64);

        let chart_series: Vec<ChartPoint> = entries
            .iter()
            .map(|e| ChartPoint {
                date: e.date,
                daily_posts: e.daily_posts,
                is_spike: e.daily_posts > STATIC_SPIKE_THRESHOLD,
            })
            .collect();

        #[allow(clippy::cast_possible_wrap)]
        let is_spike = daily_growth > STATIC_SPIKE_THRESHOLD as i64;

        sounds.push(ProcessedSound {
            id: slugify(&sound_name),
            name: sound_name,
            artist: artist_name.to_string(),
            total_posts,
            daily_growth,
            is_spike,
            last_updated: now,
            chart_series,
            sound_link: overview_match.and_then(|o| o.sound_link.clone()),
            performance_rank: ranking_match.map(|r| r.performance_rank),
        });
    }

    sounds.sort_by(|a, b| {
        let a_rank = a.performance_rank.unwrap_or(UNRANKED_SORT_RANK);
        let b_rank = b.performance_rank.unwrap_or(UNRANKED_SORT_RANK);
        b_rank.cmp(&a_rank)
    });

    sounds
}

/// Page-scrape path: build canonical records from scraped totals and ledger
/// history snapshots (keyed by sound id).
#[must_use]
pub fn reconcile_scraped(
    scraped: &[ScrapedSound],
    histories: &HashMap<String, Vec<HistoryEntry>>,
    artist_name: &str,
    now: DateTime<Utc>,
) -> Vec<ProcessedSound> {
    scraped
        .iter()
        .map(|sound| {
            let empty = Vec::new();
            let history = histories.get(&sound.id).unwrap_or(&empty);
            let growths: Vec<i64> = history.iter().map(|e| e.daily_growth).collect();

            let recent_start = growths.len().saturating_sub(TRAILING_WINDOW);
            let recent = &growths[recent_start..];
            let daily_growth = recent.last().copied().unwrap_or(0);
            let is_spike = classify_spike(daily_growth, recent);

            // Chart from the full retained history; each point is judged
            // against the window ending at that point. The chart value is
            // the entry's cumulative total (the sole non-negative field).
            let chart_series: Vec<ChartPoint> = history
                .iter()
                .enumerate()
                .map(|(i, entry)| {
                    let window_start = i.saturating_sub(TRAILING_WINDOW - 1);
                    let window = &growths[window_start..=i];
                    ChartPoint {
                        date: entry.date,
                        daily_posts: entry.total_posts,
                        is_spike: classify_spike(entry.daily_growth, window),
                    }
                })
                .collect();

            // A scraped 0 is "unknown": fall back to the last recorded total
            // rather than reporting a sound that lost every post.
            let total_posts = if sound.total_posts > 0 {
                sound.total_posts
            } else {
                history.last().map_or(0, |e| e.total_posts)
            };

            ProcessedSound {
                id: sound.id.clone(),
                name: sound.name.clone(),
                artist: artist_name.to_string(),
                total_posts,
                daily_growth,
                is_spike,
                last_updated: now,
                chart_series,
                sound_link: sound.sound_link.clone(),
                performance_rank: None,
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod reconcile_test;
