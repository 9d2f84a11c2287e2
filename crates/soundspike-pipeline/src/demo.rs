//! Synthetic demo data, for exercising the presentation layer without any
//! live source.
//!
//! The generator flags spikes with the static `daily_posts > baseline + 100`
//! rule so that every injected spike of 100-300 over baseline is flagged.
//! Synthetic data only; the canonical classifier lives in [`crate::spike`].

use chrono::{Duration, Utc};
use rand::Rng;

use soundspike_core::{Artist, ChartPoint, ProcessedSound};

use crate::aggregate::aggregate_artist;

const DEMO_DAYS: i64 = 14;
const SPIKE_CHANCE: f64 = 0.15;

/// Two fully-populated demo artists.
#[must_use]
pub fn demo_artists() -> Vec<Artist> {
    let zukenee = [
        ("Midnight Drive", 45_000, 120),
        ("Neon Dreams", 32_000, 85),
        ("City Lights", 28_000, 95),
        ("Electric Pulse", 51_000, 140),
        ("Digital Love", 19_000, 65),
        ("Synthwave Nights", 37_000, 110),
    ];
    let bnyx = [
        ("Bass Drop", 67_000, 180),
        ("Trap Melody", 41_000, 125),
        ("Heavy Beat", 55_000, 160),
        ("Dark Mode", 29_000, 90),
        ("Future Bounce", 48_000, 135),
        ("Club Anthem", 73_000, 220),
        ("Underground", 22_000, 75),
    ];

    vec![
        demo_artist("zukenee", "Zukenee", &zukenee),
        demo_artist("bnyx", "BNYX", &bnyx),
    ]
}

/// Build one demo artist from (name, base total, base daily growth) specs.
#[must_use]
pub fn demo_artist(artist_id: &str, artist_name: &str, specs: &[(&str, u64, i64)]) -> Artist {
    let sounds = specs
        .iter()
        .map(|&(name, base_total, base_growth)| demo_sound(name, artist_name, base_total, base_growth))
        .collect();
    aggregate_artist(sounds, artist_id, artist_name)
}

fn demo_sound(name: &str, artist: &str, base_total: u64, base_growth: i64) -> ProcessedSound {
    let chart_series = generate_chart(base_growth, 30);
    let daily_growth = chart_series
        .last()
        .map_or(0, |p| i64::try_from(p.daily_posts).unwrap_or(0));
    let is_spike = daily_growth > base_growth + 100;
    let total_posts = base_total + chart_series.iter().map(|p| p.daily_posts).sum::<u64>();

    ProcessedSound {
        id: soundspike_core::slugify(name),
        name: name.to_string(),
        artist: artist.to_string(),
        total_posts,
        daily_growth,
        is_spike,
        last_updated: Utc::now(),
        chart_series,
        sound_link: None,
        performance_rank: None,
    }
}

/// Randomized daily posts around a baseline, with occasional injected
/// spikes of 100-300 above it.
fn generate_chart(baseline: i64, volatility: i64) -> Vec<ChartPoint> {
    let mut rng = rand::rng();
    let today = Utc::now().date_naive();
    let mut points = Vec::with_capacity(usize::try_from(DEMO_DAYS).unwrap_or(0));

    for offset in (0..DEMO_DAYS).rev() {
        let date = today - Duration::days(offset);

        #[allow(clippy::cast_precision_loss)]
        let mut daily = baseline as f64 + (rng.random::<f64>() - 0.5) * volatility as f64;
        if rng.random::<f64>() > 1.0 - SPIKE_CHANCE {
            daily += rng.random_range(100.0..300.0);
        }

        #[allow(clippy::cast_possible_truncation)]
        let rounded = (daily.round().max(0.0)) as i64;
        // Static synthetic-data rule; not the canonical classifier.
        let is_spike = rounded > baseline + 100;
        #[allow(clippy::cast_sign_loss)]
        let daily_posts = rounded as u64;
        points.push(ChartPoint {
            date,
            daily_posts,
            is_spike,
        });
    }

    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_artists_are_fully_populated() {
        let artists = demo_artists();
        assert_eq!(artists.len(), 2);
        assert_eq!(artists[0].id, "zukenee");
        assert_eq!(artists[0].sounds.len(), 6);
        assert_eq!(artists[1].sounds.len(), 7);
        for artist in &artists {
            for sound in &artist.sounds {
                assert_eq!(sound.chart_series.len(), 14);
                assert!(sound.total_posts > 0);
            }
        }
    }

    #[test]
    fn spike_flags_match_the_static_rule() {
        let artist = demo_artist("demo", "Demo", &[("Only Sound", 10_000, 80)]);
        for point in &artist.sounds[0].chart_series {
            let expected = i64::try_from(point.daily_posts).unwrap() > 80 + 100;
            assert_eq!(point.is_spike, expected);
        }
    }

    #[test]
    fn chart_dates_ascend_to_today() {
        let artist = demo_artist("demo", "Demo", &[("Only Sound", 10_000, 80)]);
        let series = &artist.sounds[0].chart_series;
        assert_eq!(series.last().unwrap().date, Utc::now().date_naive());
        for pair in series.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
    }
}
