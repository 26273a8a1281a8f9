// farmconnect/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;

use crate::errors::AppError;
use crate::services::checkout_service;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::list_orders", skip(app_state, auth_user), fields(uid = %auth_user.user().uid))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let orders = checkout_service::order_history(&app_state, auth_user.user()).await?;
  Ok(HttpResponse::Ok().json(json!({
      "count": orders.len(),
      "orders": orders
  })))
}
