use std::env;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host: String,
  pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
  pub server: ServerConfig,
  /// Providers, dashboard, layout and logging settings of the core library.
  #[serde(default)]
  pub wallet: walletscope::config::Config,
}

impl AppConfig {
  pub fn load() -> Result<Self, ConfigError> {
    let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());
    Self::load_from(&run_mode, Environment::with_prefix("walletscope").separator("__"))
  }

  /// Defaults, then `config/default` and `config/<run_mode>` if present, then `environment`.
  /// E.g. `WALLETSCOPE__SERVER__PORT=9000` sets `server.port`.
  pub fn load_from(
    run_mode: &str,
    environment: Environment,
  ) -> Result<Self, ConfigError> {
    let s = Config::builder()
      .set_default("server.host", "0.0.0.0")?
      .set_default("server.port", 8080)?
      .add_source(File::with_name("config/default").required(false))
      .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
      .add_source(environment)
      .build()?;

    s.try_deserialize()
  }
}
