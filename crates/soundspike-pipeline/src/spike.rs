//! The canonical spike classifier.
//!
//! A day is a spike when its growth is both more than double the trailing
//! average AND above an absolute floor of 100; the floor keeps low-volume
//! sounds from flagging spurious spikes out of tiny absolute swings.
//!
//! This is the only rule applied to ledger-backed series. The static
//! `daily_posts > baseline + 100` rule in [`crate::demo`] exists solely for
//! synthetic data generation and must never be substituted for this one.

/// Absolute growth floor below which no day is a spike.
const SPIKE_FLOOR: f64 = 100.0;

/// Classify one day's growth against a trailing window of growth values.
///
/// `trailing_growths` is the window ending at the day under classification
/// (its last element is typically that day's own growth). The average is
/// taken over the window *excluding* the most recent value (up to 6 prior
/// days for a 7-day window), and is 0 when fewer than 2 values exist.
#[must_use]
pub fn classify_spike(daily_growth: i64, trailing_growths: &[i64]) -> bool {
    let average = trailing_average(trailing_growths);
    #[allow(clippy::cast_precision_loss)]
    let growth = daily_growth as f64;
    growth > (average * 2.0).max(SPIKE_FLOOR)
}

/// Arithmetic mean of the window excluding its most recent value; 0 when
/// fewer than 2 values are available.
fn trailing_average(growths: &[i64]) -> f64 {
    if growths.len() < 2 {
        return 0.0;
    }
    let prior = &growths[..growths.len() - 1];
    #[allow(clippy::cast_precision_loss)]
    let sum = prior.iter().sum::<i64>() as f64;
    #[allow(clippy::cast_precision_loss)]
    let len = prior.len() as f64;
    sum / len
}
