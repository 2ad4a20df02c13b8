use async_trait::async_trait;
use tracing::debug;
use walletscope::config::Config;
use walletscope::config::DashboardConfig;
use walletscope::config::LayoutConfig;
use walletscope::graph::GraphLayout;
use walletscope::model::Blockchain;
use walletscope::model::MonthlyTransactionCount;
use walletscope::model::ReportSummary;
use walletscope::model::SortOrder;
use walletscope::model::TopInteractions;
use walletscope::model::Transaction;
use walletscope::model::TransactionDetails;
use walletscope::model::TransactionQuery;
use walletscope::model::WalletOverview;
use walletscope::provider::Providers;
use walletscope::view::PageRequest;
use walletscope::view::WalletPage;
use walletscope::view::WalletView;
use walletscope::view::transaction_details;

use crate::application::ports::in_ports::PageParams;
use crate::application::ports::in_ports::QueryError;
use crate::application::ports::in_ports::TransactionParams;
use crate::application::ports::in_ports::WalletQueryUseCase;

/// Answers every request through a fresh [`WalletView`], so concurrent needs inside one
/// request share fetches and nothing outlives the request.
pub struct WalletService {
  providers: Providers,
  dashboard: DashboardConfig,
  layout:    LayoutConfig,
}

impl WalletService {
  pub fn new(
    providers: Providers,
    config: &Config,
  ) -> Self {
    Self { providers, dashboard: config.dashboard, layout: config.layout }
  }

  fn view(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<WalletView, QueryError> {
    let blockchain: Blockchain = chain.parse()?;
    Ok(WalletView::new(blockchain, address, self.providers.clone(), self.dashboard, self.layout)?)
  }
}

#[async_trait]
impl WalletQueryUseCase for WalletService {
  async fn overview(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<WalletOverview, QueryError> {
    Ok(self.view(chain, address)?.overview().await?)
  }

  async fn transactions(
    &self,
    chain: &str,
    address: &str,
    params: TransactionParams,
  ) -> Result<Vec<Transaction>, QueryError> {
    let view = self.view(chain, address)?;
    let sort = match params.order_by.as_deref() {
      Some(raw) => raw.parse()?,
      None => SortOrder::default(),
    };
    let query = TransactionQuery::new(
      sort,
      params.limit.unwrap_or(self.dashboard.transactions_per_page as i64),
      params.offset.unwrap_or(0),
    )?;
    debug!("wallet_service::transactions::{}::{}::{:?}", chain, address, query);
    Ok(view.transactions(query).await?)
  }

  async fn top_interactions(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<TopInteractions, QueryError> {
    Ok(self.view(chain, address)?.top_interactions().await?)
  }

  async fn monthly_transactions(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<MonthlyTransactionCount, QueryError> {
    Ok(self.view(chain, address)?.monthly_counts().await?)
  }

  async fn total_transactions(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<u64, QueryError> {
    Ok(self.view(chain, address)?.total_transactions().await?)
  }

  async fn reports(
    &self,
    chain: &str,
    address: &str,
  ) -> Result<ReportSummary, QueryError> {
    Ok(self.view(chain, address)?.reports().await?)
  }

  async fn graph(
    &self,
    chain: &str,
    address: &str,
    params: PageParams,
  ) -> Result<GraphLayout, QueryError> {
    let view = self.view(chain, address)?;
    let request = PageRequest::parse(params.sort.as_deref(), params.page.as_deref())?;
    Ok(view.graph(&request).await?)
  }

  async fn wallet_page(
    &self,
    chain: &str,
    address: &str,
    params: PageParams,
  ) -> Result<WalletPage, QueryError> {
    let view = self.view(chain, address)?;
    let request = PageRequest::parse(params.sort.as_deref(), params.page.as_deref())?;
    Ok(view.render(&request).await)
  }

  async fn transaction_details(
    &self,
    chain: &str,
    hash: &str,
  ) -> Result<TransactionDetails, QueryError> {
    let blockchain: Blockchain = chain.parse()?;
    Ok(transaction_details(&self.providers, blockchain, hash).await??)
  }
}
