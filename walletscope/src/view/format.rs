use chrono::DateTime;
use chrono::Utc;

use crate::model::Blockchain;

pub const DEFAULT_ABBREVIATION: usize = 8;
pub const DEFAULT_FRACTION_DIGITS: usize = 5;

/// Converts a coin amount to USD, rounded to cents.
pub fn convert_to_usd(
  value: f64,
  blockchain: Blockchain,
) -> f64 {
  (value * blockchain.usd_value() * 100.0).round() / 100.0
}

/// `0x1234...abcd` style shortening. Addresses no longer than `max_len` are returned as is.
pub fn abbreviate_address(
  address: &str,
  max_len: usize,
) -> String {
  let chars: Vec<char> = address.chars().collect();
  if chars.len() <= max_len {
    return address.to_string();
  }
  let half = max_len / 2;
  let head: String = chars[..half].iter().collect();
  let tail: String = chars[chars.len() - half..].iter().collect();
  format!("{head}...{tail}")
}

/// Signed graph edge label, e.g. `-1.00 ETH`.
pub fn signed_amount_label(
  amount: f64,
  outgoing: bool,
  blockchain: Blockchain,
) -> String {
  let sign = if outgoing { '-' } else { '+' };
  format!("{sign}{:.2} {}", amount.abs(), blockchain.ticker())
}

/// en-US number formatting: thousands separators, up to `max_fraction_digits`, no trailing zeros.
pub fn format_amount(
  amount: f64,
  max_fraction_digits: usize,
) -> String {
  if !amount.is_finite() {
    return "N/A".to_string();
  }

  let fixed = format!("{:.*}", max_fraction_digits, amount.abs());
  let (integer, fraction) = match fixed.split_once('.') {
    Some((integer, fraction)) => (integer, fraction.trim_end_matches('0')),
    None => (fixed.as_str(), ""),
  };

  let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
  for (i, digit) in integer.chars().enumerate() {
    if i > 0 && (integer.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(digit);
  }

  let negative = amount < 0.0 && (grouped.chars().any(|c| c != '0' && c != ',') || !fraction.is_empty());
  let sign = if negative { "-" } else { "" };
  if fraction.is_empty() { format!("{sign}{grouped}") } else { format!("{sign}{grouped}.{fraction}") }
}

/// Largest whole unit elapsed between `then` and `now`, e.g. `3 days ago`. Empty when under a second.
pub fn time_ago(
  then: DateTime<Utc>,
  now: DateTime<Utc>,
) -> String {
  const MINUTE: i64 = 60;
  const HOUR: i64 = 60 * MINUTE;
  const DAY: i64 = 24 * HOUR;

  let seconds = (now - then).num_seconds();
  let units = [
    ("year", seconds / (365 * DAY)),
    ("month", seconds / (30 * DAY)),
    ("week", seconds / (7 * DAY)),
    ("day", seconds / DAY),
    ("hour", seconds / HOUR),
    ("minute", seconds / MINUTE),
    ("second", seconds),
  ];

  units
    .into_iter()
    .find(|(_, value)| *value > 0)
    .map(|(unit, value)| format!("{value} {unit}{} ago", if value > 1 { "s" } else { "" }))
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
  use chrono::Duration;
  use chrono::TimeZone;
  use pretty_assertions::assert_eq;
  use rstest::rstest;

  use super::*;

  #[rstest]
  #[case(1234.5, "1,234.5")]
  #[case(0.0, "0")]
  #[case(1_000_000.0, "1,000,000")]
  #[case(0.123456789, "0.12346")]
  #[case(-42.1, "-42.1")]
  #[case(f64::NAN, "N/A")]
  fn formats_amounts(
    #[case] amount: f64,
    #[case] expected: &str,
  ) {
    assert_eq!(format_amount(amount, DEFAULT_FRACTION_DIGITS), expected);
  }

  #[test]
  fn abbreviates_long_addresses_only() {
    assert_eq!(abbreviate_address("0x1234567890abcdef", 8), "0x12...cdef");
    assert_eq!(abbreviate_address("0x1234", 8), "0x1234");
    assert_eq!(abbreviate_address("0x1234567890abcdef", 10), "0x123...bcdef");
  }

  #[test]
  fn usd_conversion_rounds_to_cents() {
    assert_eq!(convert_to_usd(1.0, Blockchain::Eth), 2345.85);
    assert_eq!(convert_to_usd(0.001, Blockchain::Matic), 0.0);
  }

  #[test]
  fn edge_labels_carry_sign_and_ticker() {
    assert_eq!(signed_amount_label(1.0, true, Blockchain::Eth), "-1.00 ETH");
    assert_eq!(signed_amount_label(3.0, false, Blockchain::Bnb), "+3.00 BNB");
  }

  #[test]
  fn time_ago_picks_the_largest_unit() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    assert_eq!(time_ago(now - Duration::days(3), now), "3 days ago");
    assert_eq!(time_ago(now - Duration::hours(1), now), "1 hour ago");
    assert_eq!(time_ago(now - Duration::days(800), now), "2 years ago");
    assert_eq!(time_ago(now, now), "");
  }
}
