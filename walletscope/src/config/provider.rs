use serde::Deserialize;
use serde::Serialize;

pub const DEFAULT_BITQUERY_URL: &str = "https://graphql.bitquery.io/";
pub const DEFAULT_REPORTS_URL: &str = "https://public.chainalysis.com/api/v1/address";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
  pub bitquery:       BitqueryConfig,
  /// Required only for chains served from the graph database.
  pub graph_database: Option<GraphDatabaseConfig>,
  pub reports:        ReportsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BitqueryConfig {
  pub url:                 String,
  pub api_key:             Option<String>,
  pub timeout_ms:          u64,
  pub max_retries:         usize,
  pub base_retry_delay_ms: u64,
  pub max_retry_delay_ms:  u64,
}

impl Default for BitqueryConfig {
  fn default() -> Self {
    Self {
      url:                 DEFAULT_BITQUERY_URL.to_string(),
      api_key:             None,
      timeout_ms:          15_000,
      max_retries:         3,
      base_retry_delay_ms: 200,
      max_retry_delay_ms:  5_000,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphDatabaseConfig {
  /// HTTP root of the Neo4j server, e.g. `http://localhost:7474`.
  pub url:        String,
  pub user:       String,
  pub password:   String,
  #[serde(default = "default_database")]
  pub database:   String,
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
}

impl GraphDatabaseConfig {
  pub fn new(
    url: String,
    user: String,
    password: String,
  ) -> Self {
    Self { url, user, password, database: default_database(), timeout_ms: default_timeout_ms() }
  }
}

fn default_database() -> String { "neo4j".to_string() }

fn default_timeout_ms() -> u64 { 15_000 }

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
  pub url:        String,
  pub api_key:    Option<String>,
  pub timeout_ms: u64,
}

impl Default for ReportsConfig {
  fn default() -> Self { Self { url: DEFAULT_REPORTS_URL.to_string(), api_key: None, timeout_ms: 15_000 } }
}
