use actix_web::HttpResponse;
use actix_web::ResponseError;
use actix_web::http::StatusCode;
use serde_json::json;
use thiserror::Error;
use tracing::warn;
use walletscope::view::DATA_UNAVAILABLE;

use crate::application::ports::in_ports::QueryError;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] QueryError);

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match &self.0 {
      QueryError::Request(e) if e.is_not_found() => StatusCode::NOT_FOUND,
      QueryError::Request(_) => StatusCode::BAD_REQUEST,
      QueryError::Fetch(_) => StatusCode::BAD_GATEWAY,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let message = match &self.0 {
      QueryError::Request(e) => e.to_string(),
      // Upstream details stay in the logs.
      QueryError::Fetch(e) => {
        warn!("api::fetch_failed::{}", e);
        DATA_UNAVAILABLE.to_string()
      },
    };
    HttpResponse::build(self.status_code()).json(json!({ "error": message }))
  }
}
