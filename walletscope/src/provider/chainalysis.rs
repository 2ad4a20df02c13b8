use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tracing::error;

use super::ReportProvider;
use crate::config::ReportsConfig;
use crate::err_with_loc;
use crate::error::ProviderError;
use crate::error::Result;
use crate::model::WalletReport;

const PROVIDER: &str = "chainalysis";

/// Sanctions screening lookup. Findings are returned as delivered.
#[derive(Debug, Clone)]
pub struct ChainalysisClient {
  http:   Client,
  config: ReportsConfig,
}

#[derive(Debug, Deserialize)]
struct Identifications {
  #[serde(default)]
  identifications: Vec<WalletReport>,
}

impl ChainalysisClient {
  pub fn new(config: ReportsConfig) -> Result<Self> {
    let http = Client::builder()
      .timeout(Duration::from_millis(config.timeout_ms))
      .build()
      .map_err(|e| err_with_loc!(ProviderError::Transport { provider: PROVIDER, message: e.to_string() }))?;
    Ok(Self { http, config })
  }
}

#[async_trait]
impl ReportProvider for ChainalysisClient {
  async fn fetch_wallet_reports(
    &self,
    address: &str,
  ) -> Result<Vec<WalletReport>> {
    let url = format!("{}/{}", self.config.url.trim_end_matches('/'), address);
    let mut request = self.http.get(&url).header("Accept", "application/json");
    if let Some(api_key) = &self.config.api_key {
      request = request.header("X-API-Key", api_key);
    }

    let response = request
      .send()
      .await
      .map_err(|e| err_with_loc!(ProviderError::Transport { provider: PROVIDER, message: e.to_string() }))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_else(|_| "<failed to read response text>".to_string());
      error!("chainalysis::fetch_wallet_reports::status::{}::address::{}", status, address);
      return Err(err_with_loc!(ProviderError::Status { provider: PROVIDER, status: status.as_u16(), body }));
    }

    let body: Identifications =
      response.json().await.map_err(|e| err_with_loc!(ProviderError::malformed(PROVIDER, e.to_string())))?;
    debug!("chainalysis::fetch_wallet_reports::address::{}::count::{}", address, body.identifications.len());
    Ok(body.identifications)
  }
}
