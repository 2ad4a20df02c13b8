use std::sync::Arc;

use thiserror::Error;

/// Outcome shared by every caller awaiting the same cache key.
///
/// The underlying cause is reference counted so one failed fetch can be
/// handed to all of its waiters.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
  #[error("fetch failed for {key}: {cause:#}")]
  Failed { key: String, cause: Arc<anyhow::Error> },
  #[error(transparent)]
  Cache(#[from] CacheError),
}

impl FetchError {
  pub fn failed(
    key: impl Into<String>,
    cause: anyhow::Error,
  ) -> Self {
    Self::Failed { key: key.into(), cause: Arc::new(cause) }
  }

  pub fn key(&self) -> Option<&str> {
    match self {
      FetchError::Failed { key, .. } => Some(key),
      FetchError::Cache(CacheError::TypeMismatch { key, .. }) => Some(key),
    }
  }

  /// Downcast the shared cause, e.g. to a `ProviderError`.
  pub fn cause<E>(&self) -> Option<&E>
  where
    E: std::fmt::Display + std::fmt::Debug + Send + Sync + 'static,
  {
    match self {
      FetchError::Failed { cause, .. } => cause.downcast_ref::<E>(),
      FetchError::Cache(_) => None,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
  #[error("[Cache] Key {key} holds a value of a different type than {expected}")]
  TypeMismatch { key: String, expected: &'static str },
}
