use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::WalletDataProvider;
use crate::err_with_loc;
use crate::error::ProviderError;
use crate::error::Result;
use crate::model::Blockchain;
use crate::model::MonthlyTransactionCount;
use crate::model::TopInteractions;
use crate::model::Transaction;
use crate::model::TransactionDetails;
use crate::model::TransactionQuery;
use crate::model::WalletOverview;

/// Sends graph database chains to the graph database and everything else to the indexer.
#[derive(Clone)]
pub struct ChainRouter {
  indexer:        Arc<dyn WalletDataProvider>,
  graph_database: Option<Arc<dyn WalletDataProvider>>,
}

impl ChainRouter {
  pub fn new(
    indexer: Arc<dyn WalletDataProvider>,
    graph_database: Option<Arc<dyn WalletDataProvider>>,
  ) -> Self {
    Self { indexer, graph_database }
  }

  fn route(
    &self,
    blockchain: Blockchain,
  ) -> Result<&dyn WalletDataProvider> {
    if !blockchain.is_graph_database_chain() {
      return Ok(self.indexer.as_ref());
    }
    debug!("router::route::graph_database::{}", blockchain);
    self.graph_database.as_deref().ok_or_else(|| {
      err_with_loc!(ProviderError::Unsupported(format!("{} (no graph database configured)", blockchain)))
    })
  }
}

#[async_trait]
impl WalletDataProvider for ChainRouter {
  async fn fetch_overview(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<WalletOverview> {
    self.route(blockchain)?.fetch_overview(blockchain, address).await
  }

  async fn fetch_transactions(
    &self,
    blockchain: Blockchain,
    address: &str,
    query: &TransactionQuery,
  ) -> Result<Vec<Transaction>> {
    self.route(blockchain)?.fetch_transactions(blockchain, address, query).await
  }

  async fn fetch_top_interactions(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<TopInteractions> {
    self.route(blockchain)?.fetch_top_interactions(blockchain, address).await
  }

  async fn fetch_monthly_counts(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<MonthlyTransactionCount> {
    self.route(blockchain)?.fetch_monthly_counts(blockchain, address).await
  }

  async fn fetch_total_transaction_count(
    &self,
    blockchain: Blockchain,
    address: &str,
  ) -> Result<u64> {
    self.route(blockchain)?.fetch_total_transaction_count(blockchain, address).await
  }

  async fn fetch_transaction_details(
    &self,
    blockchain: Blockchain,
    hash: &str,
  ) -> Result<TransactionDetails> {
    self.route(blockchain)?.fetch_transaction_details(blockchain, hash).await
  }
}
