use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;
use walletscope::error::FetchError;
use walletscope::error::RequestError;
use walletscope::graph::GraphLayout;
use walletscope::model::MonthlyTransactionCount;
use walletscope::model::ReportSummary;
use walletscope::model::TopInteractions;
use walletscope::model::Transaction;
use walletscope::model::TransactionDetails;
use walletscope::model::WalletOverview;
use walletscope::view::WalletPage;

/// Either the caller asked for something malformed or a data source failed.
#[derive(Debug, Clone, Error)]
pub enum QueryError {
  #[error(transparent)]
  Request(#[from] RequestError),
  #[error(transparent)]
  Fetch(#[from] FetchError),
}

/// `?orderBy=&limit=&offset=` as sent by the dashboard.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionParams {
  pub order_by: Option<String>,
  pub limit:    Option<i64>,
  pub offset:   Option<i64>,
}

/// `?sort=&page=` of the details page. Kept raw so validation errors map to 400.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
  pub sort: Option<String>,
  pub page: Option<String>,
}

#[async_trait]
pub trait WalletQueryUseCase: Send + Sync {
  async fn overview(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<WalletOverview, QueryError>;

  async fn transactions(
    &self,
    chain: &str,
    address: &str,
    params: TransactionParams,
  ) -> Result<Vec<Transaction>, QueryError>;

  async fn top_interactions(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<TopInteractions, QueryError>;

  async fn monthly_transactions(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<MonthlyTransactionCount, QueryError>;

  async fn total_transactions(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<u64, QueryError>;

  async fn reports(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<ReportSummary, QueryError>;

  async fn graph(
    &self,
    chain: &str,
    address: &str,
    params: PageParams,
  ) -> Result<GraphLayout, QueryError>;

  async fn wallet_page(
    &self,
    chain: &str,
    address: &str,
    params: PageParams,
  ) -> Result<WalletPage, QueryError>;

  async fn transaction_details(
    &self,
    chain: &str,
    hash: &str,
  ) -> Result<TransactionDetails, QueryError>;
}
