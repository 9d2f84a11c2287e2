use soundspike_core::{Artist, ProcessedSound};

/// Roll processed sounds up into one [`Artist`] record.
///
/// `total_spike_days` counts spike-flagged chart points across all sounds.
/// Pure and total: an empty sound list yields a zero count.
#[must_use]
pub fn aggregate_artist(
    sounds: Vec<ProcessedSound>,
    artist_id: &str,
    artist_name: &str,
) -> Artist {
    let total_spike_days = sounds
        .iter()
        .flat_map(|s| &s.chart_series)
        .filter(|p| p.is_spike)
        .count() as u64;

    Artist {
        id: artist_id.to_string(),
        name: artist_name.to_string(),
        sounds,
        total_spike_days,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use soundspike_core::ChartPoint;

    use super::*;

    fn sound_with_spikes(name: &str, flags: &[bool]) -> ProcessedSound {
        let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        ProcessedSound {
            id: name.to_lowercase(),
            name: name.to_string(),
            artist: "Zukenee".to_string(),
            total_posts: 1000,
            daily_growth: 10,
            is_spike: false,
            last_updated: Utc.with_ymd_and_hms(2024, 1, 10, 0, 0, 0).unwrap(),
            chart_series: flags
                .iter()
                .enumerate()
                .map(|(i, &is_spike)| ChartPoint {
                    date: base + chrono::Duration::days(i64::try_from(i).unwrap()),
                    daily_posts: 10,
                    is_spike,
                })
                .collect(),
            sound_link: None,
            performance_rank: None,
        }
    }

    #[test]
    fn counts_spike_points_across_sounds() {
        let artist = aggregate_artist(
            vec![
                sound_with_spikes("Alpha", &[true, false, true]),
                sound_with_spikes("Beta", &[false, true]),
            ],
            "zukenee",
            "Zukenee",
        );
        assert_eq!(artist.total_spike_days, 3);
        assert_eq!(artist.sounds.len(), 2);
    }

    #[test]
    fn empty_sound_list_aggregates_to_zero() {
        let artist = aggregate_artist(vec![], "zukenee", "Zukenee");
        assert_eq!(artist.total_spike_days, 0);
        assert!(artist.sounds.is_empty());
    }
}
