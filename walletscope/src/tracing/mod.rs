pub mod filter;
pub mod format;

use std::path::Path;
use std::sync::OnceLock;

use anyhow::Context;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;
use tracing_subscriber::prelude::*;

use self::filter::CRATE_TARGET;
use self::filter::DebugOnlyFilter;
use self::filter::ErrorOnlyFilter;
use self::filter::ErrorWarnFilter;
#[cfg(feature = "dev")]
use self::filter::InfoOnlyFilter;
use self::format::WalletscopeFormat;
use crate::config::LoggingConfig;
use crate::error::Result;

// Dropping a guard stops its writer thread, so they live as long as the process.
static GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

fn appender(
  directory: &Path,
  name: &str,
) -> Result<RollingFileAppender> {
  std::fs::create_dir_all(directory)
    .with_context(|| format!("Failed to create logs directory: {}", directory.display()))?;
  Ok(RollingFileAppender::new(Rotation::DAILY, directory, format!("{}.log", name)))
}

/// Installs the global subscriber for the process `name`.
///
/// Debug and warn/error events from this workspace go to daily files under
/// `<directory>/debug` and `<directory>/error`; the terminal shows errors (info and
/// above with the `dev` feature). `RUST_LOG` narrows everything further.
pub fn setup_tracing(
  name: &str,
  logging: &LoggingConfig,
) -> Result<()> {
  let format = WalletscopeFormat { name: name.to_string() };
  let mut guards = Vec::new();

  let (debug_file, error_file) = match logging.directory.as_deref() {
    Some(directory) => {
      let base = Path::new(directory);
      let (debug_writer, debug_guard) = tracing_appender::non_blocking(appender(&base.join("debug"), name)?);
      let (error_writer, error_guard) = tracing_appender::non_blocking(appender(&base.join("error"), name)?);
      guards.push(debug_guard);
      guards.push(error_guard);

      let debug_file = tracing_subscriber::fmt::Layer::default()
        .with_ansi(false)
        .event_format(format.clone())
        .with_writer(debug_writer)
        .with_filter(DebugOnlyFilter);
      let error_file = tracing_subscriber::fmt::Layer::default()
        .with_ansi(false)
        .event_format(format.clone())
        .with_writer(error_writer)
        .with_filter(ErrorWarnFilter);
      (Some(debug_file), Some(error_file))
    },
    None => (None, None),
  };

  #[cfg(feature = "dev")]
  let info_file = match logging.directory.as_deref() {
    Some(directory) => {
      let (info_writer, info_guard) = tracing_appender::non_blocking(appender(Path::new(directory), name)?);
      guards.push(info_guard);
      Some(
        tracing_subscriber::fmt::Layer::default()
          .with_ansi(false)
          .event_format(format.clone())
          .with_writer(info_writer)
          .with_filter(InfoOnlyFilter),
      )
    },
    None => None,
  };

  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(format!("{}=debug,warn", CRATE_TARGET)));

  let subscriber = tracing_subscriber::registry()
    .with(env_filter)
    .with(debug_file)
    .with(error_file)
    .with(
      tracing_subscriber::fmt::Layer::default()
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .event_format(format.clone())
        .with_filter(ErrorOnlyFilter),
    );

  #[cfg(feature = "dev")]
  let subscriber = subscriber.with(info_file).with(
    tracing_subscriber::fmt::Layer::default()
      .with_ansi(true)
      .with_writer(std::io::stderr)
      .event_format(format.clone())
      .with_filter(InfoOnlyFilter),
  );

  match tracing::subscriber::set_global_default(subscriber) {
    Ok(()) => {
      let _ = GUARDS.set(guards);
      if let Some(directory) = logging.directory.as_deref() {
        tracing::info!("{}_logging_started::debug_logs::{}/debug/{}.log", name, directory, name);
        tracing::info!("{}_logging_started::error_logs::{}/error/{}.log", name, directory, name);
      }
    },
    Err(e) => {
      eprintln!("Error setting up logging: {}", e);
    },
  }
  Ok(())
}
