mod application;
mod infrastructure;

use std::sync::Arc;

use actix_cors::Cors;
use actix_web::App;
use actix_web::HttpServer;
use actix_web::dev::Service;
use actix_web::middleware;
use actix_web::web;
use anyhow::Result;
use tracing::Instrument;
use tracing::error;
use tracing::info;
use tracing::info_span;
use uuid::Uuid;
use walletscope::provider::Providers;
use walletscope::tracing::setup_tracing;

use application::services::WalletService;
use infrastructure::config::AppConfig;
use infrastructure::driving::web::api::AppState;
use infrastructure::driving::web::api::health;
use infrastructure::driving::web::api::wallet_routes;

#[actix_web::main]
async fn main() -> Result<()> {
  let mut config = match AppConfig::load() {
    Ok(cfg) => cfg,
    Err(e) => {
      eprintln!("Failed to load configuration: {}", e);
      std::process::exit(1);
    },
  };

  // Secrets may live in a local .env, same as for the CLI.
  let _ = dotenvy::dotenv();
  config.wallet.apply_env_overrides(|name| std::env::var(name).ok());
  config.wallet.validate()?;

  setup_tracing("walletscope-web", &config.wallet.logging)?;
  info!("walletscope_web::configuration_loaded");

  let providers = match Providers::from_config(&config.wallet.provider) {
    Ok(providers) => providers,
    Err(e) => {
      error!("walletscope_web::providers::failed::{}", e);
      std::process::exit(1);
    },
  };

  let wallet_service = Arc::new(WalletService::new(providers, &config.wallet));
  let app_state = web::Data::new(AppState { wallet_service });

  let server_config = config.server.clone();
  let server = HttpServer::new(move || {
    let cors = Cors::default().allow_any_origin().allow_any_method().allow_any_header();

    App::new()
      .wrap(middleware::Logger::default())
      .wrap(cors)
      .wrap_fn(|req, srv| {
        let span = info_span!("request", id = %Uuid::new_v4(), path = %req.path());
        srv.call(req).instrument(span)
      })
      .app_data(app_state.clone())
      .route("/health", web::get().to(health))
      .service(wallet_routes::<WalletService>())
  })
  .bind((server_config.host.clone(), server_config.port))?
  .run();

  info!("walletscope_web::listening::{}:{}", server_config.host, server_config.port);
  server.await?;

  info!("walletscope_web::shutting_down");
  Ok(())
}
