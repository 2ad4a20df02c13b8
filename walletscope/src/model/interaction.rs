use serde::Deserialize;
use serde::Serialize;

/// How many counterparties are kept per direction.
pub const TOP_INTERACTIONS_LIMIT: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interaction {
  pub address:    String,
  pub count:      u64,
  pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopInteractions {
  pub top_received: Vec<Interaction>,
  pub top_sent:     Vec<Interaction>,
}

impl TopInteractions {
  /// Builds both rankings from raw `(address, count)` pairs.
  ///
  /// Indexer totals can lag behind the per-counterparty counts, so the
  /// denominator is never smaller than the sum of the listed counts.
  pub fn from_counts(
    received: Vec<(String, u64)>,
    sent: Vec<(String, u64)>,
    reported_received_total: u64,
    reported_sent_total: u64,
  ) -> Self {
    Self {
      top_received: rank(received, reported_received_total),
      top_sent:     rank(sent, reported_sent_total),
    }
  }
}

fn rank(
  mut counts: Vec<(String, u64)>,
  reported_total: u64,
) -> Vec<Interaction> {
  counts.sort_by(|a, b| b.1.cmp(&a.1));
  counts.truncate(TOP_INTERACTIONS_LIMIT);

  let total = reported_total.max(counts.iter().map(|(_, count)| count).sum());
  counts
    .into_iter()
    .map(|(address, count)| Interaction {
      address,
      count,
      percentage: if total == 0 { 0.0 } else { count as f64 / total as f64 * 100.0 },
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;

  #[test]
  fn percentages_use_the_reported_total() {
    let top = TopInteractions::from_counts(vec![("0xb".into(), 5), ("0xc".into(), 15)], vec![], 40, 0);
    assert_eq!(top.top_received[0].address, "0xc");
    assert_eq!(top.top_received[0].percentage, 37.5);
    assert_eq!(top.top_received[1].percentage, 12.5);
  }

  #[test]
  fn stale_totals_are_raised_to_the_listed_sum() {
    let top = TopInteractions::from_counts(vec![], vec![("0xb".into(), 3), ("0xc".into(), 1)], 0, 2);
    let sum: f64 = top.top_sent.iter().map(|i| i.percentage).sum();
    assert_eq!(sum, 100.0);
  }

  #[test]
  fn zero_total_gives_zero_percent() {
    let top = TopInteractions::from_counts(vec![("0xb".into(), 0)], vec![], 0, 0);
    assert_eq!(top.top_received[0].percentage, 0.0);
  }

  #[test]
  fn keeps_only_the_top_ten() {
    let many = (0..25).map(|i| (format!("0x{i}"), i as u64)).collect();
    let top = TopInteractions::from_counts(many, vec![], 0, 0);
    assert_eq!(top.top_received.len(), TOP_INTERACTIONS_LIMIT);
    assert_eq!(top.top_received[0].count, 24);
  }
}
