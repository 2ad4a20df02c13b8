use std::collections::BTreeMap;

use chrono::Datelike;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use super::Transaction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
  pub year:  i32,
  pub month: u32,
  pub count: u64,
}

impl MonthlyCount {
  /// First day of the month, `None` for an out-of-range month.
  pub fn date(&self) -> Option<NaiveDate> { NaiveDate::from_ymd_opt(self.year, self.month, 1) }

  /// `YYYY-MM`, the bucket label used by the chart.
  pub fn month_key(&self) -> String { format!("{:04}-{:02}", self.year, self.month) }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyTransactionCount {
  pub received: Vec<MonthlyCount>,
  pub sent:     Vec<MonthlyCount>,
}

/// One bar group of the monthly volume chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyBucket {
  pub month:    String,
  pub received: u64,
  pub sent:     u64,
}

impl MonthlyTransactionCount {
  /// Counts transactions per calendar month (UTC) from `address`'s side.
  pub fn from_transactions(
    address: &str,
    transactions: &[Transaction],
  ) -> Self {
    let mut received: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    let mut sent: BTreeMap<(i32, u32), u64> = BTreeMap::new();

    for tx in transactions {
      let month = (tx.timestamp.year(), tx.timestamp.month());
      if tx.is_sent_by(address) {
        *sent.entry(month).or_default() += 1;
      }
      if super::same_address(&tx.receiver, address) {
        *received.entry(month).or_default() += 1;
      }
    }

    let collect = |map: BTreeMap<(i32, u32), u64>| {
      map.into_iter().map(|((year, month), count)| MonthlyCount { year, month, count }).collect()
    };
    Self { received: collect(received), sent: collect(sent) }
  }

  /// Merges both series into chronologically ordered chart buckets.
  pub fn chart_series(&self) -> Vec<MonthlyBucket> {
    let mut buckets: BTreeMap<String, MonthlyBucket> = BTreeMap::new();

    for entry in &self.received {
      let key = entry.month_key();
      buckets
        .entry(key.clone())
        .or_insert_with(|| MonthlyBucket { month: key, received: 0, sent: 0 })
        .received += entry.count;
    }
    for entry in &self.sent {
      let key = entry.month_key();
      buckets.entry(key.clone()).or_insert_with(|| MonthlyBucket { month: key, received: 0, sent: 0 }).sent +=
        entry.count;
    }

    buckets.into_values().collect()
  }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use chrono::Utc;
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn chart_series_merges_and_sorts_months() {
    let counts = MonthlyTransactionCount {
      received: vec![MonthlyCount { year: 2024, month: 3, count: 4 }, MonthlyCount { year: 2023, month: 12, count: 1 }],
      sent:     vec![MonthlyCount { year: 2024, month: 3, count: 2 }, MonthlyCount { year: 2024, month: 1, count: 7 }],
    };

    assert_eq!(
      counts.chart_series(),
      vec![
        MonthlyBucket { month: "2023-12".into(), received: 1, sent: 0 },
        MonthlyBucket { month: "2024-01".into(), received: 0, sent: 7 },
        MonthlyBucket { month: "2024-03".into(), received: 4, sent: 2 },
      ]
    );
  }

  #[test]
  fn groups_transactions_by_month_and_direction() {
    let jan = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
    let feb = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let txs = vec![
      Transaction::new("a", "0xme", "0xb", 1.0, jan),
      Transaction::new("b", "0xc", "0xme", 1.0, jan),
      Transaction::new("c", "0xc", "0xME", 1.0, feb),
    ];

    let counts = MonthlyTransactionCount::from_transactions("0xme", &txs);
    assert_eq!(counts.sent, vec![MonthlyCount { year: 2024, month: 1, count: 1 }]);
    assert_eq!(
      counts.received,
      vec![MonthlyCount { year: 2024, month: 1, count: 1 }, MonthlyCount { year: 2024, month: 2, count: 1 }]
    );
  }

  #[test]
  fn invalid_month_has_no_date() {
    assert_eq!(MonthlyCount { year: 2024, month: 13, count: 0 }.date(), None);
    assert_eq!(MonthlyCount { year: 2024, month: 2, count: 0 }.date(), NaiveDate::from_ymd_opt(2024, 2, 1));
  }
}
