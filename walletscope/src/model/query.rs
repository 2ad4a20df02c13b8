use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::error::RequestError;

/// Upper bound for a single transaction page.
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
  /// Newest first.
  #[default]
  Time,
  /// Largest amount first.
  Amount,
}

impl SortOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      SortOrder::Time => "time",
      SortOrder::Amount => "amount",
    }
  }
}

impl fmt::Display for SortOrder {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for SortOrder {
  type Err = RequestError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "time" => Ok(SortOrder::Time),
      "amount" => Ok(SortOrder::Amount),
      other => Err(RequestError::UnknownSortOrder(other.to_string())),
    }
  }
}

/// A validated window into an address's transaction history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionQuery {
  pub sort:   SortOrder,
  pub limit:  u32,
  pub offset: u64,
}

impl TransactionQuery {
  /// Validates raw (possibly user supplied) pagination values.
  pub fn new(
    sort: SortOrder,
    limit: i64,
    offset: i64,
  ) -> Result<Self, RequestError> {
    if offset < 0 {
      return Err(RequestError::NegativeOffset(offset));
    }
    if limit < 1 || limit > MAX_PAGE_LIMIT as i64 {
      return Err(RequestError::InvalidLimit { limit, max: MAX_PAGE_LIMIT });
    }
    Ok(Self { sort, limit: limit as u32, offset: offset as u64 })
  }
}
