use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::same_address;
use crate::error::RequestError;

/// The slice of a transaction the dashboard renders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
  pub id:        String,
  pub sender:    String,
  pub receiver:  String,
  /// Native coin units, never negative.
  pub amount:    f64,
  pub timestamp: DateTime<Utc>,
}

impl Transaction {
  pub fn new(
    id: impl Into<String>,
    sender: impl Into<String>,
    receiver: impl Into<String>,
    amount: f64,
    timestamp: DateTime<Utc>,
  ) -> Self {
    Self {
      id: id.into(),
      sender: sender.into(),
      receiver: receiver.into(),
      amount: amount.abs(),
      timestamp,
    }
  }

  pub fn is_sent_by(
    &self,
    address: &str,
  ) -> bool {
    same_address(&self.sender, address)
  }

  /// The other party from `address`'s point of view. A self-transfer yields `address` itself.
  pub fn counterparty(
    &self,
    address: &str,
  ) -> &str {
    if self.is_sent_by(address) { &self.receiver } else { &self.sender }
  }
}

/// `0x` followed by 64 hex digits.
pub fn validate_transaction_hash(hash: &str) -> Result<(), RequestError> {
  match hash.strip_prefix("0x") {
    Some(hex) if hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()) => Ok(()),
    _ => Err(RequestError::InvalidTransactionHash(hash.to_string())),
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionDetails {
  pub hash:              String,
  pub transaction_index: u64,
  pub gas_used:          f64,
  pub gas_price:         f64,
  pub transaction_fee:   f64,
  pub block_number:      u64,
  pub block_hash:        String,
}
