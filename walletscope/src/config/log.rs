use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
  // Directory where rolling log files are written; `None` disables file output
  pub directory: Option<String>,
}

impl Default for LoggingConfig {
  fn default() -> Self { Self { directory: Some(".logs".to_string()) } }
}
