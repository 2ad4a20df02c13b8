use std::sync::Arc;

use actix_web::HttpResponse;
use actix_web::web;

use super::error::ApiError;
use crate::application::ports::in_ports::PageParams;
use crate::application::ports::in_ports::TransactionParams;
use crate::application::ports::in_ports::WalletQueryUseCase;

// AppState containing our application services
pub struct AppState<T: WalletQueryUseCase> {
  pub wallet_service: Arc<T>,
}

type WalletPath = web::Path<(String, String)>;

pub async fn overview<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let overview = data.wallet_service.overview(&chain, &address).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(overview))
}

pub async fn transactions<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
  params: web::Query<TransactionParams>,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let transactions =
    data.wallet_service.transactions(&chain, &address, params.into_inner()).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(transactions))
}

pub async fn top_interactions<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let interactions = data.wallet_service.top_interactions(&chain, &address).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(interactions))
}

pub async fn monthly_transactions<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let monthly = data.wallet_service.monthly_transactions(&chain, &address).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(monthly))
}

pub async fn total_transactions<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let total = data.wallet_service.total_transactions(&chain, &address).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(total))
}

pub async fn reports<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let reports = data.wallet_service.reports(&chain, &address).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(reports))
}

pub async fn graph<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
  params: web::Query<PageParams>,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let layout = data.wallet_service.graph(&chain, &address, params.into_inner()).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(layout))
}

/// Whole details page. Failed regions are reported inside the body, not as an error status.
pub async fn wallet_page<T>(
  data: web::Data<AppState<T>>,
  path: WalletPath,
  params: web::Query<PageParams>,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, address) = path.into_inner();
  let page = data.wallet_service.wallet_page(&chain, &address, params.into_inner()).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(page))
}

pub async fn transaction_details<T>(
  data: web::Data<AppState<T>>,
  path: web::Path<(String, String)>,
) -> Result<HttpResponse, ApiError>
where
  T: WalletQueryUseCase + 'static,
{
  let (chain, hash) = path.into_inner();
  let details = data.wallet_service.transaction_details(&chain, &hash).await.map_err(ApiError::from)?;
  Ok(HttpResponse::Ok().json(details))
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::AtomicUsize;
  use std::sync::atomic::Ordering;

  use actix_web::App;
  use actix_web::http::StatusCode;
  use actix_web::test;
  use anyhow::anyhow;
  use async_trait::async_trait;
  use chrono::TimeZone;
  use chrono::Utc;
  use pretty_assertions::assert_eq;
  use serde_json::Value;
  use walletscope::config::Config;
  use walletscope::model::Blockchain;
  use walletscope::model::MonthlyTransactionCount;
  use walletscope::model::TopInteractions;
  use walletscope::model::Transaction;
  use walletscope::model::TransactionDetails;
  use walletscope::model::TransactionQuery;
  use walletscope::model::WalletOverview;
  use walletscope::model::WalletReport;
  use walletscope::provider::Providers;
  use walletscope::provider::ReportProvider;
  use walletscope::provider::WalletDataProvider;

  use super::*;
  use crate::application::services::WalletService;
  use crate::infrastructure::driving::web::api::routes::health;
  use crate::infrastructure::driving::web::api::routes::wallet_routes;

  const FOCAL: &str = "0x00000000000000000000000000000000000000aa";
  const HASH: &str = "0x5d1f3c5e8f9b1bfe09c0ffee5d1f3c5e8f9b1bfe09c0ffee5d1f3c5e8f9b1bfe";

  /// In-memory source. Top interactions always fail.
  #[derive(Default)]
  struct StubProvider {
    overview_calls: AtomicUsize,
  }

  #[async_trait]
  impl WalletDataProvider for StubProvider {
    async fn fetch_overview(
      &self,
      _blockchain: Blockchain,
      address: &str,
    ) -> walletscope::Result<WalletOverview> {
      self.overview_calls.fetch_add(1, Ordering::SeqCst);
      Ok(WalletOverview::new(address, 1.5).with_counts(4, 0))
    }

    async fn fetch_transactions(
      &self,
      _blockchain: Blockchain,
      address: &str,
      query: &TransactionQuery,
    ) -> walletscope::Result<Vec<Transaction>> {
      let at = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
      let peer = "0x00000000000000000000000000000000000000bb";
      Ok((0..query.limit.min(4)).map(|i| Transaction::new(format!("t{}", i), address, peer, 1.0, at)).collect())
    }

    async fn fetch_top_interactions(
      &self,
      _blockchain: Blockchain,
      _address: &str,
    ) -> walletscope::Result<TopInteractions> {
      Err(anyhow!("indexer timeout"))
    }

    async fn fetch_monthly_counts(
      &self,
      _blockchain: Blockchain,
      _address: &str,
    ) -> walletscope::Result<MonthlyTransactionCount> {
      Ok(MonthlyTransactionCount::default())
    }

    async fn fetch_total_transaction_count(
      &self,
      _blockchain: Blockchain,
      _address: &str,
    ) -> walletscope::Result<u64> {
      Ok(4)
    }

    async fn fetch_transaction_details(
      &self,
      _blockchain: Blockchain,
      hash: &str,
    ) -> walletscope::Result<TransactionDetails> {
      Ok(TransactionDetails {
        hash:              hash.to_string(),
        transaction_index: 3,
        gas_used:          21_000.0,
        gas_price:         0.00000002,
        transaction_fee:   0.00042,
        block_number:      19_000_000,
        block_hash:        "0xblock".to_string(),
      })
    }
  }

  struct NoReports;

  #[async_trait]
  impl ReportProvider for NoReports {
    async fn fetch_wallet_reports(
      &self,
      _address: &str,
    ) -> walletscope::Result<Vec<WalletReport>> {
      Ok(Vec::new())
    }
  }

  async fn call(
    provider: Arc<StubProvider>,
    uri: &str,
  ) -> (StatusCode, Value) {
    let service = WalletService::new(Providers::new(provider, Arc::new(NoReports)), &Config::default());
    let state = web::Data::new(AppState { wallet_service: Arc::new(service) });
    let app = test::init_service(
      App::new()
        .app_data(state)
        .route("/health", web::get().to(health))
        .service(wallet_routes::<WalletService>()),
    )
    .await;

    let response = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
    let status = response.status();
    let body = test::read_body(response).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
  }

  #[actix_web::test]
  async fn health_is_ok() {
    let (status, body) = call(Arc::default(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
  }

  #[actix_web::test]
  async fn overview_returns_json() {
    let (status, body) = call(Arc::default(), &format!("/api/eth/{}/overview", FOCAL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["balance"], 1.5);
    assert_eq!(body["sentCount"], 4);
  }

  #[actix_web::test]
  async fn transactions_honour_limit_and_reject_bad_params() {
    let (status, body) = call(Arc::default(), &format!("/api/eth/{}/transactions?orderBy=amount&limit=2", FOCAL)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (status, _) = call(Arc::default(), &format!("/api/eth/{}/transactions?offset=-1", FOCAL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(Arc::default(), &format!("/api/eth/{}/transactions?orderBy=size", FOCAL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn unknown_chain_and_bad_address_are_not_found() {
    let (status, _) = call(Arc::default(), &format!("/api/doge/{}/overview", FOCAL)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(Arc::default(), "/api/eth/0x123/overview").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }

  #[actix_web::test]
  async fn provider_failure_is_bad_gateway() {
    let (status, body) = call(Arc::default(), &format!("/api/eth/{}/top-interactions", FOCAL)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "data unavailable");
  }

  #[actix_web::test]
  async fn details_page_marks_only_the_failed_region() {
    let provider = Arc::new(StubProvider::default());
    let (status, body) = call(Arc::clone(&provider), &format!("/api/eth/{}/details", FOCAL)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["topInteractions"]["status"], "unavailable");
    assert_eq!(body["overview"]["status"], "ready");
    assert_eq!(body["graph"]["data"]["nodes"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["pagination"]["data"]["numPages"], 1);
    // Overview and pagination share one fetch.
    assert_eq!(provider.overview_calls.load(Ordering::SeqCst), 1);
  }

  #[actix_web::test]
  async fn page_must_be_positive() {
    let (status, _) = call(Arc::default(), &format!("/api/eth/{}/graph?page=0", FOCAL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(Arc::default(), &format!("/api/eth/{}/details?page=9223372036854775807", FOCAL)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
  }

  #[actix_web::test]
  async fn transaction_details_by_hash() {
    let (status, body) = call(Arc::default(), &format!("/api/eth/transaction/{}", HASH)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["blockNumber"], 19_000_000);

    let (status, _) = call(Arc::default(), "/api/eth/transaction/0xnothex").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
  }
}
