use tracing::Level;
use tracing::Metadata;
use tracing_subscriber::layer::Context;
use tracing_subscriber::layer::Filter;
use tracing_subscriber::registry::LookupSpan;

/// Only events emitted from this workspace reach the log files.
pub const CRATE_TARGET: &str = "walletscope";

fn is_own_target(meta: &Metadata<'_>) -> bool { meta.target().starts_with(CRATE_TARGET) }

// Exact debug level
pub struct DebugOnlyFilter;

impl<S> Filter<S> for DebugOnlyFilter
where
  S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
  fn enabled(
    &self,
    meta: &Metadata<'_>,
    _ctx: &Context<'_, S>,
  ) -> bool {
    meta.level() == &Level::DEBUG && is_own_target(meta)
  }
}

// Error and warn
pub struct ErrorWarnFilter;

impl<S> Filter<S> for ErrorWarnFilter
where
  S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
  fn enabled(
    &self,
    meta: &Metadata<'_>,
    _ctx: &Context<'_, S>,
  ) -> bool {
    (meta.level() == &Level::ERROR || meta.level() == &Level::WARN) && is_own_target(meta)
  }
}

#[cfg(feature = "dev")]
pub struct InfoOnlyFilter;

#[cfg(feature = "dev")]
impl<S> Filter<S> for InfoOnlyFilter
where
  S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
  fn enabled(
    &self,
    meta: &Metadata<'_>,
    _ctx: &Context<'_, S>,
  ) -> bool {
    meta.level() == &Level::INFO && is_own_target(meta)
  }
}

pub struct ErrorOnlyFilter;

impl<S> Filter<S> for ErrorOnlyFilter
where
  S: tracing::Subscriber + for<'lookup> LookupSpan<'lookup>,
{
  fn enabled(
    &self,
    meta: &Metadata<'_>,
    _ctx: &Context<'_, S>,
  ) -> bool {
    meta.level() == &Level::ERROR && is_own_target(meta)
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::sync::Mutex;

  use tracing_subscriber::Layer;
  use tracing_subscriber::prelude::*;

  use super::*;

  /// Records the level of every event that passes its filter.
  struct Recorder(Arc<Mutex<Vec<Level>>>);

  impl<S: tracing::Subscriber> Layer<S> for Recorder {
    fn on_event(
      &self,
      event: &tracing::Event<'_>,
      _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
      self.0.lock().unwrap().push(*event.metadata().level());
    }
  }

  #[test]
  fn filters_keep_only_their_levels() {
    let debug = Arc::new(Mutex::new(Vec::new()));
    let errors = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry()
      .with(Recorder(Arc::clone(&debug)).with_filter(DebugOnlyFilter))
      .with(Recorder(Arc::clone(&errors)).with_filter(ErrorWarnFilter));

    tracing::subscriber::with_default(subscriber, || {
      tracing::debug!("filter::test::debug");
      tracing::info!("filter::test::info");
      tracing::warn!("filter::test::warn");
      tracing::error!("filter::test::error");
      tracing::error!(target: "hyper", "foreign::error");
    });

    assert_eq!(*debug.lock().unwrap(), vec![Level::DEBUG]);
    assert_eq!(*errors.lock().unwrap(), vec![Level::WARN, Level::ERROR]);
  }
}
