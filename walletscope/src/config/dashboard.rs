use serde::Deserialize;
use serde::Serialize;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
  pub transactions_per_page: u32,
  /// Page links shown at once by the pagination control.
  pub max_visible_pages:     u32,
}

impl Default for DashboardConfig {
  fn default() -> Self { Self { transactions_per_page: 15, max_visible_pages: 3 } }
}

impl DashboardConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.transactions_per_page == 0 || self.transactions_per_page > crate::model::query::MAX_PAGE_LIMIT {
      return Err(ConfigError::InvalidDashboard(format!(
        "transactions_per_page must be within 1..={}, got {}",
        crate::model::query::MAX_PAGE_LIMIT,
        self.transactions_per_page
      )));
    }
    if self.max_visible_pages == 0 {
      return Err(ConfigError::InvalidDashboard("max_visible_pages must be at least 1".to_string()));
    }
    Ok(())
  }
}
