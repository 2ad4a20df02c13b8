use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use rand::Rng;

pub const WEI_PER_COIN: f64 = 1e18;

pub fn wei_to_coin(wei: f64) -> f64 { wei / WEI_PER_COIN }

/// Seconds since the epoch to UTC, `None` when out of range.
pub fn unix_to_utc(seconds: i64) -> Option<DateTime<Utc>> { DateTime::from_timestamp(seconds, 0) }

/// Exponential backoff with ±25% jitter, capped at `max_delay_ms` before jitter is applied.
pub fn calculate_backoff_with_jitter(
  attempt: usize,
  base_delay_ms: u64,
  max_delay_ms: u64,
) -> Duration {
  let exponential_delay = base_delay_ms.saturating_mul(2u64.saturating_pow(attempt as u32));
  let capped_delay = exponential_delay.min(max_delay_ms);

  let mut rng = rand::rng();
  let jitter_range = (capped_delay as f64 * 0.25) as u64;
  let jitter = rng.random_range(0..=jitter_range * 2);
  let final_delay = capped_delay.saturating_add(jitter).saturating_sub(jitter_range);

  Duration::from_millis(final_delay)
}
