use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Contract type reported for plain accounts.
pub const EXTERNALLY_OWNED: &str = "eoa";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletOverview {
  pub address:         String,
  pub balance:         f64,
  pub sent_count:      u64,
  pub received_count:  u64,
  pub amount_sent:     f64,
  pub amount_received: f64,
  pub first_active:    Option<DateTime<Utc>>,
  pub last_active:     Option<DateTime<Utc>>,
  pub contract_type:   String,
}

impl WalletOverview {
  pub fn new(
    address: impl Into<String>,
    balance: f64,
  ) -> Self {
    Self {
      address:         address.into(),
      balance:         balance.abs(),
      sent_count:      0,
      received_count:  0,
      amount_sent:     0.0,
      amount_received: 0.0,
      first_active:    None,
      last_active:     None,
      contract_type:   EXTERNALLY_OWNED.to_string(),
    }
  }

  pub fn with_counts(
    mut self,
    sent_count: u64,
    received_count: u64,
  ) -> Self {
    self.sent_count = sent_count;
    self.received_count = received_count;
    self
  }

  pub fn with_amounts(
    mut self,
    amount_sent: f64,
    amount_received: f64,
  ) -> Self {
    self.amount_sent = amount_sent.abs();
    self.amount_received = amount_received.abs();
    self
  }

  /// Records the activity window. When the source only knows one side, that
  /// side stands in for the other.
  pub fn with_activity(
    mut self,
    first_active: Option<DateTime<Utc>>,
    last_active: Option<DateTime<Utc>>,
  ) -> Self {
    self.first_active = first_active.or(last_active);
    self.last_active = last_active.or(first_active);
    self
  }

  pub fn with_contract_type(
    mut self,
    contract_type: Option<String>,
  ) -> Self {
    self.contract_type = contract_type.filter(|t| !t.is_empty()).unwrap_or_else(|| EXTERNALLY_OWNED.to_string());
    self
  }

  pub fn total_count(&self) -> u64 { self.sent_count.saturating_add(self.received_count) }
}
