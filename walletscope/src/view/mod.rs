pub mod format;
pub mod pagination;
pub mod panels;

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

pub use pagination::PageRequest;
pub use pagination::Pagination;
pub use panels::HistoryRow;
pub use panels::OverviewPanel;

use crate::cache::AggregationCache;
use crate::cache::CacheKey;
use crate::config::DashboardConfig;
use crate::config::LayoutConfig;
use crate::error::FetchError;
use crate::error::RequestError;
use crate::graph::GraphLayout;
use crate::graph::layout;
use crate::model::Blockchain;
use crate::model::MonthlyBucket;
use crate::model::MonthlyTransactionCount;
use crate::model::ReportSummary;
use crate::model::TopInteractions;
use crate::model::Transaction;
use crate::model::TransactionDetails;
use crate::model::TransactionQuery;
use crate::model::WalletOverview;
use crate::model::transaction::validate_transaction_hash;
use crate::provider::Providers;

pub const DATA_UNAVAILABLE: &str = "data unavailable";

/// A page region that either rendered or could not get its data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Region<T> {
  Ready { data: T },
  Unavailable { message: String },
}

impl<T> Region<T> {
  fn from_fetch(
    region: &str,
    result: Result<T, FetchError>,
  ) -> Self {
    match result {
      Ok(data) => Region::Ready { data },
      Err(e) => {
        warn!("view::render::region_unavailable::{}::{}", region, e);
        Region::Unavailable { message: DATA_UNAVAILABLE.to_string() }
      },
    }
  }

  pub fn is_ready(&self) -> bool { matches!(self, Region::Ready { .. }) }

  pub fn data(&self) -> Option<&T> {
    match self {
      Region::Ready { data } => Some(data),
      Region::Unavailable { .. } => None,
    }
  }
}

/// Everything the wallet details page shows for one address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletPage {
  pub blockchain:       Blockchain,
  pub address:          String,
  pub request:          PageRequest,
  pub overview:         Region<OverviewPanel>,
  pub graph:            Region<GraphLayout>,
  pub history:          Region<Vec<HistoryRow>>,
  pub pagination:       Region<Pagination>,
  pub top_interactions: Region<TopInteractions>,
  pub monthly:          Region<Vec<MonthlyBucket>>,
  pub reports:          Region<ReportSummary>,
}

/// Data access for a single page view of one address.
///
/// Every region asks the view for what it needs; overlapping requests share one
/// [`AggregationCache`] entry, so each collaborator call happens at most once per view.
/// Drop the view when the page view ends.
#[derive(Debug)]
pub struct WalletView {
  blockchain: Blockchain,
  address:    String,
  providers:  Providers,
  dashboard:  DashboardConfig,
  layout:     LayoutConfig,
  cache:      AggregationCache,
}

impl WalletView {
  pub fn new(
    blockchain: Blockchain,
    address: impl Into<String>,
    providers: Providers,
    dashboard: DashboardConfig,
    layout: LayoutConfig,
  ) -> Result<Self, RequestError> {
    let address = address.into();
    blockchain.validate_address(&address)?;
    Ok(Self { blockchain, address, providers, dashboard, layout, cache: AggregationCache::new() })
  }

  pub fn blockchain(&self) -> Blockchain { self.blockchain }

  pub fn address(&self) -> &str { &self.address }

  pub fn cache(&self) -> &AggregationCache { &self.cache }

  pub async fn overview(&self) -> Result<WalletOverview, FetchError> {
    let data = Arc::clone(&self.providers.data);
    let (blockchain, address) = (self.blockchain, self.address.clone());
    self
      .cache
      .get(CacheKey::overview(blockchain, &address), move || async move {
        data.fetch_overview(blockchain, &address).await
      })
      .await
  }

  pub async fn transactions(
    &self,
    query: TransactionQuery,
  ) -> Result<Vec<Transaction>, FetchError> {
    let data = Arc::clone(&self.providers.data);
    let (blockchain, address) = (self.blockchain, self.address.clone());
    self
      .cache
      .get(CacheKey::transactions(blockchain, &address, &query), move || async move {
        data.fetch_transactions(blockchain, &address, &query).await
      })
      .await
  }

  pub async fn page_transactions(
    &self,
    request: &PageRequest,
  ) -> Result<Vec<Transaction>, FetchError> {
    self.transactions(request.query(&self.dashboard)).await
  }

  pub async fn top_interactions(&self) -> Result<TopInteractions, FetchError> {
    let data = Arc::clone(&self.providers.data);
    let (blockchain, address) = (self.blockchain, self.address.clone());
    self
      .cache
      .get(CacheKey::top_interactions(blockchain, &address), move || async move {
        data.fetch_top_interactions(blockchain, &address).await
      })
      .await
  }

  pub async fn monthly_counts(&self) -> Result<MonthlyTransactionCount, FetchError> {
    let data = Arc::clone(&self.providers.data);
    let (blockchain, address) = (self.blockchain, self.address.clone());
    self
      .cache
      .get(CacheKey::monthly_counts(blockchain, &address), move || async move {
        data.fetch_monthly_counts(blockchain, &address).await
      })
      .await
  }

  pub async fn total_transactions(&self) -> Result<u64, FetchError> {
    let data = Arc::clone(&self.providers.data);
    let (blockchain, address) = (self.blockchain, self.address.clone());
    self
      .cache
      .get(CacheKey::total_transactions(blockchain, &address), move || async move {
        data.fetch_total_transaction_count(blockchain, &address).await
      })
      .await
  }

  pub async fn reports(&self) -> Result<ReportSummary, FetchError> {
    let reports = Arc::clone(&self.providers.reports);
    let address = self.address.clone();
    self
      .cache
      .get(CacheKey::reports(self.blockchain, &address), move || async move {
        let found = reports.fetch_wallet_reports(&address).await?;
        Ok::<_, anyhow::Error>(ReportSummary::from_reports(found))
      })
      .await
  }

  /// Transaction graph of the requested page.
  pub async fn graph(
    &self,
    request: &PageRequest,
  ) -> Result<GraphLayout, FetchError> {
    let transactions = self.page_transactions(request).await?;
    debug!("view::graph::{}::{}::nodes::{}", self.blockchain, self.address, transactions.len() + 1);
    Ok(layout(&self.address, &transactions, self.blockchain, &self.layout))
  }

  pub async fn history(
    &self,
    request: &PageRequest,
  ) -> Result<Vec<HistoryRow>, FetchError> {
    let now = Utc::now();
    let transactions = self.page_transactions(request).await?;
    Ok(transactions.iter().map(|tx| HistoryRow::new(tx, &self.address, self.blockchain, now)).collect())
  }

  /// Page count comes from the overview's sent and received totals.
  pub async fn pagination(
    &self,
    request: &PageRequest,
  ) -> Result<Pagination, FetchError> {
    let overview = self.overview().await?;
    let num_pages = pagination::num_pages(overview.total_count(), self.dashboard.transactions_per_page);
    Ok(Pagination::new(request.page, num_pages, self.dashboard.max_visible_pages))
  }

  /// Fans out every region concurrently. A failed region does not affect the others.
  pub async fn render(
    &self,
    request: &PageRequest,
  ) -> WalletPage {
    debug!("view::render::{}::{}::sort::{}::page::{}", self.blockchain, self.address, request.sort, request.page);
    let now = Utc::now();

    let (overview, graph, history, pagination, top_interactions, monthly, reports) = futures::join!(
      self.overview(),
      self.graph(request),
      self.history(request),
      self.pagination(request),
      self.top_interactions(),
      self.monthly_counts(),
      self.reports(),
    );

    WalletPage {
      blockchain:       self.blockchain,
      address:          self.address.clone(),
      request:          *request,
      overview:         Region::from_fetch("overview", overview.map(|o| OverviewPanel::new(o, self.blockchain, now))),
      graph:            Region::from_fetch("graph", graph),
      history:          Region::from_fetch("history", history),
      pagination:       Region::from_fetch("pagination", pagination),
      top_interactions: Region::from_fetch("top_interactions", top_interactions),
      monthly:          Region::from_fetch("monthly", monthly.map(|m| m.chart_series())),
      reports:          Region::from_fetch("reports", reports),
    }
  }
}

/// Details of one transaction by hash. Not tied to an address, so nothing is cached.
pub async fn transaction_details(
  providers: &Providers,
  blockchain: Blockchain,
  hash: &str,
) -> Result<Result<TransactionDetails, FetchError>, RequestError> {
  validate_transaction_hash(hash)?;
  let key = CacheKey::transaction_details(blockchain, hash);
  Ok(providers.data.fetch_transaction_details(blockchain, hash).await.map_err(|e| FetchError::failed(key.as_str(), e)))
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;

  use anyhow::anyhow;
  use chrono::TimeZone;
  use pretty_assertions::assert_eq;

  use super::*;
  use crate::model::SortOrder;
  use crate::provider::MockReportProvider;
  use crate::provider::MockWalletDataProvider;

  const FOCAL: &str = "0x000000000000000000000000000000000000000a";

  fn providers(
    data: MockWalletDataProvider,
    reports: MockReportProvider,
  ) -> Providers {
    Providers::new(Arc::new(data), Arc::new(reports))
  }

  fn view(providers: Providers) -> WalletView {
    WalletView::new(Blockchain::Eth, FOCAL, providers, DashboardConfig::default(), LayoutConfig::default()).unwrap()
  }

  #[test]
  fn rejects_malformed_addresses_before_fetching() {
    let err = WalletView::new(
      Blockchain::Eth,
      "not-an-address",
      providers(MockWalletDataProvider::new(), MockReportProvider::new()),
      DashboardConfig::default(),
      LayoutConfig::default(),
    )
    .unwrap_err();
    assert!(err.is_not_found());
  }

  #[tokio::test]
  async fn render_fetches_each_key_once_and_isolates_failures() {
    let overview_calls = Arc::new(AtomicUsize::new(0));
    let transaction_calls = Arc::new(AtomicUsize::new(0));

    let mut data = MockWalletDataProvider::new();
    let calls = Arc::clone(&overview_calls);
    data.expect_fetch_overview().returning(move |_, address| {
      calls.fetch_add(1, Ordering::SeqCst);
      Ok(WalletOverview::new(address, 1.0).with_counts(20, 26))
    });
    let calls = Arc::clone(&transaction_calls);
    data.expect_fetch_transactions().returning(move |_, _, query| {
      calls.fetch_add(1, Ordering::SeqCst);
      assert_eq!((query.limit, query.offset), (15, 15));
      let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
      Ok(vec![Transaction::new("t1", FOCAL, "0xb", 1.0, at), Transaction::new("t2", "0xc", FOCAL, 3.0, at)])
    });
    data.expect_fetch_top_interactions().times(1).returning(|_, _| Err(anyhow!("indexer down")));
    data.expect_fetch_monthly_counts().times(1).returning(|_, _| Ok(MonthlyTransactionCount::default()));
    let mut reports = MockReportProvider::new();
    reports.expect_fetch_wallet_reports().times(1).returning(|_| Ok(vec![]));

    let view = view(providers(data, reports));
    let page = view.render(&PageRequest::new(SortOrder::Time, 2).unwrap()).await;

    assert_eq!(overview_calls.load(Ordering::SeqCst), 1);
    assert_eq!(transaction_calls.load(Ordering::SeqCst), 1);

    assert_eq!(page.graph.data().map(|g| g.nodes.len()), Some(3));
    assert_eq!(page.history.data().map(Vec::len), Some(2));
    let pagination = page.pagination.data().unwrap();
    assert_eq!((pagination.num_pages, pagination.pages.clone()), (4, vec![1, 2, 3]));
    assert_eq!(page.top_interactions, Region::Unavailable { message: DATA_UNAVAILABLE.to_string() });
    assert!(page.overview.is_ready() && page.monthly.is_ready() && page.reports.is_ready());
  }

  #[tokio::test]
  async fn failed_region_is_retried_by_the_next_caller() {
    let attempts = Arc::new(AtomicUsize::new(0));
    let mut data = MockWalletDataProvider::new();
    let counter = Arc::clone(&attempts);
    data.expect_fetch_total_transaction_count().times(2).returning(move |_, _| {
      if counter.fetch_add(1, Ordering::SeqCst) == 0 { Err(anyhow!("timeout")) } else { Ok(9) }
    });

    let view = view(providers(data, MockReportProvider::new()));

    assert!(view.total_transactions().await.is_err());
    assert_eq!(view.total_transactions().await.unwrap(), 9);
  }

  #[tokio::test]
  async fn transaction_details_validates_the_hash() {
    let mut data = MockWalletDataProvider::new();
    data.expect_fetch_transaction_details().never();
    let providers = providers(data, MockReportProvider::new());

    let err = transaction_details(&providers, Blockchain::Eth, "0x12").await.unwrap_err();
    assert_eq!(err, RequestError::InvalidTransactionHash("0x12".into()));
  }
}
