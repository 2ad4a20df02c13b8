use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
  #[error("[Provider] Request to {provider} failed: {message}")]
  Transport { provider: &'static str, message: String },
  #[error("[Provider] {provider} responded with status {status}: {body}")]
  Status { provider: &'static str, status: u16, body: String },
  #[error("[Provider] {provider} returned query errors: {joined}", joined = .messages.join("; "))]
  Query { provider: &'static str, messages: Vec<String> },
  #[error("[Provider] Malformed payload from {provider}: {message}")]
  MalformedPayload { provider: &'static str, message: String },
  #[error("[Provider] {0} is not served by any configured data source")]
  Unsupported(String),
}

impl ProviderError {
  pub fn malformed(
    provider: &'static str,
    message: impl Into<String>,
  ) -> Self {
    Self::MalformedPayload { provider, message: message.into() }
  }

  /// Timeouts, connection resets, 429 and 5xx are worth another attempt.
  pub fn is_retryable(&self) -> bool {
    match self {
      ProviderError::Transport { .. } => true,
      ProviderError::Status { status, .. } => *status == 429 || *status >= 500,
      _ => false,
    }
  }
}
