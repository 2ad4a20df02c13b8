use thiserror::Error;

/// Caller-contract violations. Raised before anything is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
  #[error("Unknown blockchain: {0}")]
  UnknownBlockchain(String),
  #[error("Invalid address for {blockchain}: {address}")]
  InvalidAddress { blockchain: String, address: String },
  #[error("Unknown sort order: {0} (expected \"time\" or \"amount\")")]
  UnknownSortOrder(String),
  #[error("Offset must not be negative: {0}")]
  NegativeOffset(i64),
  #[error("Limit must be between 1 and {max}: {limit}")]
  InvalidLimit { limit: i64, max: u32 },
  #[error("Page must be at least 1: {0}")]
  InvalidPage(i64),
  #[error("Invalid transaction hash: {0}")]
  InvalidTransactionHash(String),
}

impl RequestError {
  /// The dashboard answers unknown chains and malformed addresses with "not found".
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      RequestError::UnknownBlockchain(_)
        | RequestError::InvalidAddress { .. }
        | RequestError::InvalidTransactionHash(_)
    )
  }
}
