// farmconnect/src/errors.rs

use crate::services::cart::CartError;
use crate::services::splitter::SplitError;
use crate::stores::StoreError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use farmflow::FlowError;
use serde_json::json;
use thiserror::Error;

/// Shown to the customer whenever an order or stock write fails.
pub const ORDER_FAILED_MESSAGE: &str = "Failed to place order. Please try again.";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error(transparent)]
  Cart(#[from] CartError),

  #[error("No active session. Start a session first.")]
  SessionMissing,

  /// A remote write failed during checkout. Retryable; the cart is left as it was.
  #[error("{}", ORDER_FAILED_MESSAGE)]
  OrderPlacement {
    #[source]
    source: StoreError,
  },

  #[error("Store Error: {0}")]
  Store(#[from] StoreError),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl From<SplitError> for AppError {
  fn from(err: SplitError) -> Self {
    AppError::Validation(err.to_string())
  }
}

impl AppError {
  pub fn order_placement(source: StoreError) -> Self {
    AppError::OrderPlacement { source }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Cart(CartError::LineNotFound { .. }) => StatusCode::NOT_FOUND,
      AppError::Cart(_) => StatusCode::CONFLICT,
      AppError::SessionMissing => StatusCode::CONFLICT,
      AppError::OrderPlacement { .. } => StatusCode::BAD_GATEWAY,
      AppError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
      AppError::Store(_) => StatusCode::BAD_GATEWAY,
      AppError::Config(_) | AppError::Workflow { .. } | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, source = ?std::error::Error::source(self), "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    match self {
      AppError::Store(_) => HttpResponse::build(status).json(json!({"error": "Store operation failed"})),
      AppError::Config(m) => HttpResponse::build(status).json(json!({"error": "Configuration issue", "detail": m})),
      AppError::Workflow { source } => HttpResponse::build(status)
        .json(json!({"error": "Workflow processing error", "detail": source.to_string()})),
      AppError::Internal(m) => {
        HttpResponse::build(status).json(json!({"error": "An internal error occurred", "detail": m}))
      }
      other => HttpResponse::build(status).json(json!({"error": other.to_string()})),
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
  use super::*;
  use uuid::Uuid;

  #[test]
  fn status_codes() {
    assert_eq!(AppError::Validation("x".into()).status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(AppError::SessionMissing.status_code(), StatusCode::CONFLICT);
    assert_eq!(
      AppError::Cart(CartError::LineNotFound { product_id: Uuid::nil() }).status_code(),
      StatusCode::NOT_FOUND
    );
    assert_eq!(
      AppError::Cart(CartError::CheckoutInProgress).status_code(),
      StatusCode::CONFLICT
    );
    assert_eq!(
      AppError::order_placement(StoreError::Unavailable("down".into())).status_code(),
      StatusCode::BAD_GATEWAY
    );
  }

  #[test]
  fn order_placement_shows_generic_message() {
    let err = AppError::order_placement(StoreError::Unavailable("socket closed".into()));
    assert_eq!(err.to_string(), ORDER_FAILED_MESSAGE);
  }

  #[test]
  fn empty_split_is_a_validation_error() {
    let err = AppError::from(SplitError::EmptyCart);
    assert!(matches!(err, AppError::Validation(ref m) if m == "Your cart is empty"));
  }
}
