pub mod dashboard;
pub mod layout;
pub mod log;
pub mod provider;

use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

pub use dashboard::DashboardConfig;
pub use layout::LayoutConfig;
pub use log::LoggingConfig;
pub use provider::BitqueryConfig;
pub use provider::GraphDatabaseConfig;
pub use provider::ProviderConfig;
pub use provider::ReportsConfig;

use crate::error::ConfigError;
use crate::error::Result;

pub const BIT_QUERY_API_KEY: &str = "BIT_QUERY_API_KEY";
pub const NEO4J_URL: &str = "NEO4J_URL";
pub const NEO4J_USER: &str = "NEO4J_USER";
pub const NEO4J_PASSWORD: &str = "NEO4J_PASSWORD";
pub const CHAIN_ANALYSIS_API_KEY: &str = "CHAIN_ANALYSIS_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  pub provider:  ProviderConfig,
  pub dashboard: DashboardConfig,
  pub layout:    LayoutConfig,
  pub logging:   LoggingConfig,
}

impl Config {
  pub fn validate(&self) -> std::result::Result<(), ConfigError> {
    self.layout.validate().map_err(|e| ConfigError::InvalidLayout(e.to_string()))?;
    self.dashboard.validate()
  }

  /// Secrets and the graph database location come from the environment when set.
  pub fn apply_env_overrides<F>(
    &mut self,
    lookup: F,
  ) where
    F: Fn(&str) -> Option<String>,
  {
    if let Some(key) = lookup(BIT_QUERY_API_KEY) {
      self.provider.bitquery.api_key = Some(key);
    }
    if let Some(key) = lookup(CHAIN_ANALYSIS_API_KEY) {
      self.provider.reports.api_key = Some(key);
    }

    let url = lookup(NEO4J_URL);
    let user = lookup(NEO4J_USER);
    let password = lookup(NEO4J_PASSWORD);
    if let Some(graph) = self.provider.graph_database.as_mut() {
      if let Some(url) = url {
        graph.url = url;
      }
      if let Some(user) = user {
        graph.user = user;
      }
      if let Some(password) = password {
        graph.password = password;
      }
    } else if let (Some(url), Some(user), Some(password)) = (url, user, password) {
      self.provider.graph_database = Some(GraphDatabaseConfig::new(url, user, password));
    }
  }
}

/// Reads `path` as TOML, applies environment overrides (after loading `.env`) and validates.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
  let path = path.as_ref();
  let config_str =
    std::fs::read_to_string(path).map_err(|e| ConfigError::OpenFileError(format!("{}: {}", path.display(), e)))?;
  let mut config = parse_config(&config_str)?;

  if let Ok(env_file) = dotenvy::dotenv() {
    debug!("config::load_config::dotenv::{}", env_file.display());
  }
  config.apply_env_overrides(|name| std::env::var(name).ok());
  config.validate()?;
  Ok(config)
}

pub fn parse_config(config_str: &str) -> Result<Config> {
  let config: Config = toml::from_str(config_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
  Ok(config)
}
