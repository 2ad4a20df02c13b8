pub mod bitquery;
pub mod chainalysis;
pub mod graph_db;
pub mod router;

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Deserializer;
use serde_json::Value;

pub use bitquery::BitqueryClient;
pub use chainalysis::ChainalysisClient;
pub use graph_db::GraphDatabaseClient;
pub use router::ChainRouter;

use crate::config::ProviderConfig;
use crate::error::Result;
use crate::model::Blockchain;
use crate::model::MonthlyTransactionCount;
use crate::model::TopInteractions;
use crate::model::Transaction;
use crate::model::TransactionDetails;
use crate::model::TransactionQuery;
use crate::model::WalletOverview;
use crate::model::WalletReport;

/// Read-only source of wallet data. Any error is a single "fetch failed" signal to callers.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WalletDataProvider: Send + Sync {
  async fn fetch_overview(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<WalletOverview>;

  async fn fetch_transactions(
    &self,
    blockchain: Blockchain,
    address: &str,
    query: &TransactionQuery,
  ) -> Result<Vec<Transaction>>;

  async fn fetch_top_interactions(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<TopInteractions>;

  async fn fetch_monthly_counts(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<MonthlyTransactionCount>;

  async fn fetch_total_transaction_count(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<u64>;

  async fn fetch_transaction_details(
    &self,
    blockchain: Blockchain,
    hash: &str,
  ) -> Result<TransactionDetails>;
}

/// Third-party findings about an address, passed through uninterpreted.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReportProvider: Send + Sync {
  async fn fetch_wallet_reports(
    &self,
    address: &str,
  ) -> Result<Vec<WalletReport>>;
}

/// Shared collaborator handles, built once per process and cloned into every request.
#[derive(Clone)]
pub struct Providers {
  pub data:    Arc<dyn WalletDataProvider>,
  pub reports: Arc<dyn ReportProvider>,
}

impl Providers {
  pub fn new(
    data: Arc<dyn WalletDataProvider>,
    reports: Arc<dyn ReportProvider>,
  ) -> Self {
    Self { data, reports }
  }

  /// Live HTTP clients for every configured source.
  pub fn from_config(config: &ProviderConfig) -> Result<Self> {
    let bitquery = BitqueryClient::new(config.bitquery.clone())?;
    let graph_database = match &config.graph_database {
      Some(graph) => Some(GraphDatabaseClient::new(graph.clone())?),
      None => None,
    };
    let router = ChainRouter::new(Arc::new(bitquery), graph_database.map(|g| Arc::new(g) as Arc<dyn WalletDataProvider>));
    let reports = ChainalysisClient::new(config.reports.clone())?;
    Ok(Self::new(Arc::new(router), Arc::new(reports)))
  }
}

impl std::fmt::Debug for Providers {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("Providers").finish_non_exhaustive()
  }
}

/// Upstream APIs encode numbers as either JSON numbers or strings.
pub(crate) fn lenient_f64<'de, D>(deserializer: D) -> std::result::Result<f64, D::Error>
where
  D: Deserializer<'de>,
{
  match Value::deserialize(deserializer)? {
    Value::Number(n) => n.as_f64().ok_or_else(|| serde::de::Error::custom("number out of range")),
    Value::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    Value::Null => Ok(0.0),
    other => Err(serde::de::Error::custom(format!("expected a number, got {other}"))),
  }
}

pub(crate) fn lenient_u64<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
  D: Deserializer<'de>,
{
  let value = lenient_f64(deserializer)?;
  if value.is_finite() && value >= 0.0 { Ok(value as u64) } else { Err(serde::de::Error::custom("expected a count")) }
}
