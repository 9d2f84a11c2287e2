//! Domain records shared across the pipeline.
//!
//! Everything here except [`HistoryEntry`]/[`SoundHistory`] is a transient
//! artifact of a single pipeline run, rebuilt in full on every refresh. The
//! two history types are the persisted ledger shape and keep the camelCase
//! field names of the on-disk JSON document:
//! `[{soundId, history:[{date,totalPosts,dailyGrowth}], lastUpdated}]`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One (sound, day) cell from the daily-log tab. Ephemeral; recomputed on
/// every fetch, never persisted. `daily_posts` is always > 0: a reported
/// zero means "no data" and is dropped at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyLogEntry {
    /// Canonical `YYYY-MM-DD` day.
    pub date: NaiveDate,
    pub sound_name: String,
    pub daily_posts: u64,
}

/// Latest-known totals for one sound, from the overview tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundOverviewRecord {
    pub sound_name: String,
    pub sound_link: Option<String>,
    pub live_posts: u64,
}

/// One row of the performance-ranking tab. Rank is the 1-based row position
/// among surviving rows ("row order is rank"), not derived from any score
/// column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankingRecord {
    pub sound_name: String,
    pub live_posts: u64,
    /// 1 = best.
    pub performance_rank: u32,
}

/// One persisted (date, total, growth) snapshot for a sound.
///
/// `total_posts` is the cumulative source-of-truth value. `daily_growth` may
/// be negative when the upstream source corrects a total downward, and is
/// fixed at first-write time for a given date; later same-day overwrites of
/// `total_posts` do not recompute it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub total_posts: u64,
    pub daily_growth: i64,
}

/// The persisted rolling history for one sound: entries ordered by date
/// ascending, bounded to the most recent [`SoundHistory::RETENTION`] days
/// (oldest evicted first).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundHistory {
    pub sound_id: String,
    pub history: Vec<HistoryEntry>,
    pub last_updated: DateTime<Utc>,
}

impl SoundHistory {
    /// Sliding-window bound on retained entries.
    pub const RETENTION: usize = 30;
}

/// Derived, read-only chart point; one per history or daily-log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPoint {
    pub date: NaiveDate,
    pub daily_posts: u64,
    pub is_spike: bool,
}

/// Canonical per-sound unit consumed by the presentation layer. Both the
/// tabular and the page-scrape reconciliation paths produce this same shape;
/// consumers cannot tell which path built a given record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedSound {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub total_posts: u64,
    pub daily_growth: i64,
    pub is_spike: bool,
    pub last_updated: DateTime<Utc>,
    pub chart_series: Vec<ChartPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance_rank: Option<u32>,
}

/// Per-artist roll-up, rebuilt on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub name: String,
    pub sounds: Vec<ProcessedSound>,
    /// Count of `is_spike` chart points across all sounds.
    pub total_spike_days: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_entry_serializes_to_ledger_field_names() {
        let entry = HistoryEntry {
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            total_posts: 1200,
            daily_growth: -30,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2024-01-15",
                "totalPosts": 1200,
                "dailyGrowth": -30
            })
        );
    }

    #[test]
    fn sound_history_round_trips_persisted_format() {
        let raw = r#"[{"soundId":"bromance","history":[{"date":"2024-01-14","totalPosts":1000,"dailyGrowth":0}],"lastUpdated":"2024-01-14T12:00:00Z"}]"#;
        let parsed: Vec<SoundHistory> = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].sound_id, "bromance");
        assert_eq!(parsed[0].history[0].total_posts, 1000);
    }
}
