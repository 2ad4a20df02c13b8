use chrono::TimeZone;
use chrono::Utc;
use proptest::prelude::*;
use walletscope::config::LayoutConfig;
use walletscope::graph::layout;
use walletscope::graph::layout::node_radius;
use walletscope::model::Blockchain;
use walletscope::model::Transaction;

const FOCAL: &str = "0x00000000000000000000000000000000000000aa";

/// Transfers touching the focal address, in either direction.
fn arbitrary_transactions() -> impl Strategy<Value = Vec<Transaction>> {
  prop::collection::vec((any::<bool>(), 0u8..16, 0.0f64..1_000_000.0), 0..40).prop_map(|rows| {
    let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
    rows
      .into_iter()
      .enumerate()
      .map(|(i, (outgoing, peer, amount))| {
        let peer = format!("0x{:040x}", peer);
        let id = format!("0x{:064x}", i);
        if outgoing {
          Transaction::new(id, FOCAL, peer, amount, at)
        } else {
          Transaction::new(id, peer, FOCAL, amount, at)
        }
      })
      .collect()
  })
}

proptest! {
  #[test]
  fn layout_is_deterministic(transactions in arbitrary_transactions()) {
    let config = LayoutConfig::default();
    let first = layout(FOCAL, &transactions, Blockchain::Eth, &config);
    let second = layout(FOCAL, &transactions, Blockchain::Eth, &config);
    prop_assert_eq!(first, second);
  }

  #[test]
  fn one_node_per_transaction_plus_focal(transactions in arbitrary_transactions()) {
    let graph = layout(FOCAL, &transactions, Blockchain::Eth, &LayoutConfig::default());

    prop_assert_eq!(graph.nodes.len(), transactions.len() + 1);
    prop_assert_eq!(graph.edges.len(), transactions.len());
    prop_assert!(graph.nodes[0].focal);
    for node in &graph.nodes {
      prop_assert!(node.x.is_finite() && node.y.is_finite());
      prop_assert!(node.radius >= 16.0 && node.radius <= 40.0);
    }
    for edge in &graph.edges {
      prop_assert!(edge.start.x.is_finite() && edge.end.y.is_finite());
    }
  }

  #[test]
  fn radius_grows_with_amount(
    a in 0.0f64..1_000.0,
    b in 0.0f64..1_000.0,
    min in 0.0f64..100.0,
    span in 0.0f64..1_000.0,
  ) {
    let config = LayoutConfig::default();
    let (low, high) = if a <= b { (a, b) } else { (b, a) };
    let max = min + span;
    prop_assert!(node_radius(low, min, max, &config) <= node_radius(high, min, max, &config));
  }
}
