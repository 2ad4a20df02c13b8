use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::format::DEFAULT_ABBREVIATION;
use super::format::DEFAULT_FRACTION_DIGITS;
use super::format::abbreviate_address;
use super::format::convert_to_usd;
use super::format::format_amount;
use super::format::time_ago;
use crate::graph::EdgeDirection;
use crate::model::Blockchain;
use crate::model::Transaction;
use crate::model::WalletOverview;

/// Overview figures with their display strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewPanel {
  #[serde(flatten)]
  pub overview:            WalletOverview,
  pub balance_usd:         f64,
  pub amount_sent_usd:     f64,
  pub amount_received_usd: f64,
  pub first_active_ago:    Option<String>,
  pub last_active_ago:     Option<String>,
}

impl OverviewPanel {
  pub fn new(
    overview: WalletOverview,
    blockchain: Blockchain,
    now: DateTime<Utc>,
  ) -> Self {
    Self {
      balance_usd: convert_to_usd(overview.balance, blockchain),
      amount_sent_usd: convert_to_usd(overview.amount_sent, blockchain),
      amount_received_usd: convert_to_usd(overview.amount_received, blockchain),
      first_active_ago: overview.first_active.map(|t| time_ago(t, now)),
      last_active_ago: overview.last_active.map(|t| time_ago(t, now)),
      overview,
    }
  }
}

/// One line of the transaction history table, seen from the focal address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
  pub id:                 String,
  pub direction:          EdgeDirection,
  pub counterparty:       String,
  pub counterparty_label: String,
  pub amount:             f64,
  pub amount_display:     String,
  pub amount_usd:         f64,
  pub timestamp:          DateTime<Utc>,
  pub age:                String,
}

impl HistoryRow {
  pub fn new(
    tx: &Transaction,
    focal: &str,
    blockchain: Blockchain,
    now: DateTime<Utc>,
  ) -> Self {
    let direction = if tx.is_sent_by(focal) { EdgeDirection::Outgoing } else { EdgeDirection::Incoming };
    let counterparty = tx.counterparty(focal);
    Self {
      id: tx.id.clone(),
      direction,
      counterparty: counterparty.to_string(),
      counterparty_label: abbreviate_address(counterparty, DEFAULT_ABBREVIATION),
      amount: tx.amount,
      amount_display: format!("{} {}", format_amount(tx.amount, DEFAULT_FRACTION_DIGITS), blockchain.ticker()),
      amount_usd: convert_to_usd(tx.amount, blockchain),
      timestamp: tx.timestamp,
      age: time_ago(tx.timestamp, now),
    }
  }
}
