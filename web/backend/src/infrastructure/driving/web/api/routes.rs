use actix_web::HttpResponse;
use actix_web::Responder;
use actix_web::Scope;
use actix_web::web;
use serde_json::json;

use super::handlers::graph;
use super::handlers::monthly_transactions;
use super::handlers::overview;
use super::handlers::reports;
use super::handlers::top_interactions;
use super::handlers::total_transactions;
use super::handlers::transaction_details;
use super::handlers::transactions;
use super::handlers::wallet_page;
use crate::application::ports::in_ports::WalletQueryUseCase;

pub fn wallet_routes<T>() -> Scope
where
  T: WalletQueryUseCase + 'static,
{
  web::scope("/api")
    .route("/{chain}/transaction/{hash}", web::get().to(transaction_details::<T>))
    .route("/{chain}/{address}/overview", web::get().to(overview::<T>))
    .route("/{chain}/{address}/transactions", web::get().to(transactions::<T>))
    .route("/{chain}/{address}/top-interactions", web::get().to(top_interactions::<T>))
    .route("/{chain}/{address}/monthly-transactions", web::get().to(monthly_transactions::<T>))
    .route("/{chain}/{address}/total-transactions", web::get().to(total_transactions::<T>))
    .route("/{chain}/{address}/reports", web::get().to(reports::<T>))
    .route("/{chain}/{address}/graph", web::get().to(graph::<T>))
    .route("/{chain}/{address}/details", web::get().to(wallet_page::<T>))
}

pub async fn health() -> impl Responder { HttpResponse::Ok().json(json!({ "status": "ok" })) }
