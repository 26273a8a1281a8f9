// farmconnect/src/web/handlers/session_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use super::cart_handlers::CartView;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[instrument(name = "handler::start_session", skip(app_state, auth_user), fields(uid = %auth_user.user().uid))]
pub async fn start_session_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state.sessions.start(&auth_user.user().uid);
  info!("Session started with an empty cart.");
  let view = CartView::from_cart(&cart.read(), &app_state);
  Ok(HttpResponse::Created().json(json!({
      "message": "Session started.",
      "cart": view
  })))
}

#[instrument(name = "handler::end_session", skip(app_state, auth_user), fields(uid = %auth_user.user().uid))]
pub async fn end_session_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let ended = app_state.sessions.end(&auth_user.user().uid);
  Ok(HttpResponse::Ok().json(json!({ "ended": ended })))
}
