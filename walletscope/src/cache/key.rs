use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Blockchain;
use crate::model::TransactionQuery;

/// The collaborator operation a cache entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DataKind {
  Overview,
  Transactions,
  TopInteractions,
  MonthlyCounts,
  TotalTransactions,
  Reports,
  TransactionDetails,
}

impl DataKind {
  pub fn as_str(&self) -> &'static str {
    match self {
      DataKind::Overview => "overview",
      DataKind::Transactions => "transactions",
      DataKind::TopInteractions => "top-interactions",
      DataKind::MonthlyCounts => "monthly-counts",
      DataKind::TotalTransactions => "total-transactions",
      DataKind::Reports => "reports",
      DataKind::TransactionDetails => "transaction-details",
    }
  }
}

impl fmt::Display for DataKind {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Colon separated `kind:chain:subject[:params...]`, e.g. `overview:eth:0xA`.
///
/// Equal tuples always render to equal keys. The subject is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
  pub fn new(
    kind: DataKind,
    blockchain: Blockchain,
    subject: &str,
    params: &[&str],
  ) -> Self {
    let mut key = format!("{}:{}:{}", kind, blockchain, subject);
    for param in params {
      key.push(':');
      key.push_str(param);
    }
    Self(key)
  }

  pub fn overview(
    blockchain: Blockchain,
    address: &str,
  ) -> Self {
    Self::new(DataKind::Overview, blockchain, address, &[])
  }

  pub fn transactions(
    blockchain: Blockchain,
    address: &str,
    query: &TransactionQuery,
  ) -> Self {
    let limit = query.limit.to_string();
    let offset = query.offset.to_string();
    Self::new(DataKind::Transactions, blockchain, address, &[query.sort.as_str(), &limit, &offset])
  }

  pub fn top_interactions(
    blockchain: Blockchain,
    address: &str,
  ) -> Self {
    Self::new(DataKind::TopInteractions, blockchain, address, &[])
  }

  pub fn monthly_counts(
    blockchain: Blockchain,
    address: &str,
  ) -> Self {
    Self::new(DataKind::MonthlyCounts, blockchain, address, &[])
  }

  pub fn total_transactions(
    blockchain: Blockchain,
    address: &str,
  ) -> Self {
    Self::new(DataKind::TotalTransactions, blockchain, address, &[])
  }

  pub fn reports(
    blockchain: Blockchain,
    address: &str,
  ) -> Self {
    Self::new(DataKind::Reports, blockchain, address, &[])
  }

  pub fn transaction_details(
    blockchain: Blockchain,
    hash: &str,
  ) -> Self {
    Self::new(DataKind::TransactionDetails, blockchain, hash, &[])
  }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for CacheKey {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>,
  ) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for CacheKey {
  fn from(key: &str) -> Self { Self(key.to_string()) }
}

impl From<String> for CacheKey {
  fn from(key: String) -> Self { Self(key) }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::model::SortOrder;

  #[test]
  fn renders_the_documented_shape() {
    assert_eq!(CacheKey::overview(Blockchain::Eth, "0xA").as_str(), "overview:eth:0xA");
    assert_eq!(CacheKey::from("overview:eth:0xA"), CacheKey::overview(Blockchain::Eth, "0xA"));

    let query = TransactionQuery::new(SortOrder::Amount, 15, 30).unwrap();
    assert_eq!(CacheKey::transactions(Blockchain::Bnb, "0xA", &query).as_str(), "transactions:bnb:0xA:amount:15:30");
  }

  #[test]
  fn any_differing_component_changes_the_key() {
    let base = TransactionQuery::new(SortOrder::Time, 15, 0).unwrap();
    let keys = [
      CacheKey::transactions(Blockchain::Eth, "0xA", &base),
      CacheKey::transactions(Blockchain::Eth, "0xA", &TransactionQuery::new(SortOrder::Amount, 15, 0).unwrap()),
      CacheKey::transactions(Blockchain::Eth, "0xA", &TransactionQuery::new(SortOrder::Time, 15, 15).unwrap()),
      CacheKey::transactions(Blockchain::Eth, "0xA", &TransactionQuery::new(SortOrder::Time, 16, 0).unwrap()),
      CacheKey::transactions(Blockchain::Avax, "0xA", &base),
      CacheKey::transactions(Blockchain::Eth, "0xB", &base),
      CacheKey::overview(Blockchain::Eth, "0xA"),
      CacheKey::top_interactions(Blockchain::Eth, "0xA"),
      CacheKey::monthly_counts(Blockchain::Eth, "0xA"),
      CacheKey::total_transactions(Blockchain::Eth, "0xA"),
      CacheKey::reports(Blockchain::Eth, "0xA"),
    ];

    let unique: std::collections::HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
  }
}
