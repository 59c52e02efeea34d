use std::time::{Duration, Instant};

use crate::error::{HwError, Result};

/// Wait until the provided `is_high` predicate becomes false (i.e., line goes low),
/// or a timeout expires. Sleeps in small intervals to avoid CPU spinning.
pub fn wait_until_low_with_timeout(
    mut is_high: impl FnMut() -> bool,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    while is_high() {
        if Instant::now() >= deadline {
            return Err(HwError::DataReadyTimeout);
        }
        std::thread::sleep(poll_interval);
    }
    Ok(())
}

/// Mean of a batch of raw conversions, computed in f64 so large 24-bit
/// counts do not lose precision. `None` for an empty batch.
pub fn average_counts(samples: &[i32]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s)).sum();
    Some(sum / samples.len() as f64)
}

/// Convert averaged counts to grams given the zero baseline and the
/// counts-per-gram calibration factor.
#[inline]
pub fn counts_to_grams(avg_counts: f64, tare_counts: f64, counts_per_gram: f32) -> f32 {
    ((avg_counts - tare_counts) / f64::from(counts_per_gram)) as f32
}
