use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("Failed to open config file: {0}")]
  OpenFileError(String),

  #[error("Failed to parse config file: {0}")]
  ParseError(String),

  #[error("Invalid layout settings: {0}")]
  InvalidLayout(String),

  #[error("Invalid dashboard settings: {0}")]
  InvalidDashboard(String),
}
