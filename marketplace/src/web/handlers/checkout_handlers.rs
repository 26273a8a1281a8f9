// farmconnect/src/web/handlers/checkout_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::models::DeliveryDetails;
use crate::services::checkout_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(
    name = "handler::place_order",
    skip(app_state, req_payload, auth_user),
    fields(uid = %auth_user.user().uid, payment_method = %req_payload.payment_method)
)]
pub async fn place_order_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<DeliveryDetails>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let receipt = checkout_service::place_order(&app_state, auth_user.user(), req_payload.into_inner()).await?;
  info!(orders = receipt.orders.len(), "Checkout succeeded.");

  Ok(HttpResponse::Created().json(json!({
      "message": format!(
        "Order placed successfully! {} order(s) sent to {} farmer(s).",
        receipt.orders.len(),
        receipt.farmer_count
      ),
      "receipt": receipt
  })))
}
