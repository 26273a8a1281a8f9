// farmconnect/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CartLine;
use crate::services::cart::Cart;
use crate::services::{checkout_service, money};
use crate::state::AppState;
use crate::web::extractors::AuthenticatedUser;

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
  pub lines: Vec<CartLine>,
  #[serde(with = "rust_decimal::serde::float")]
  pub total: Decimal,
  pub formatted_total: String,
  pub items_count: u32,
  pub distinct_lines: usize,
}

impl CartView {
  pub fn from_cart(cart: &Cart, app_state: &AppState) -> Self {
    let total = cart.cart_total();
    Self {
      lines: cart.lines().to_vec(),
      total,
      formatted_total: money::format_amount(total, app_state.config.currency),
      items_count: cart.items_count(),
      distinct_lines: cart.distinct_lines(),
    }
  }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequestPayload {
  pub product_id: Uuid,
}

#[derive(Deserialize, Debug)]
pub struct UpdateQuantityPayload {
  pub quantity: i64,
}

fn current_view(app_state: &AppState, uid: &str) -> Result<CartView, AppError> {
  let cart = app_state.sessions.cart_for(uid).ok_or(AppError::SessionMissing)?;
  let view = CartView::from_cart(&cart.read(), app_state);
  Ok(view)
}

#[instrument(name = "handler::view_cart", skip(app_state, auth_user), fields(uid = %auth_user.user().uid))]
pub async fn view_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let view = current_view(&app_state, &auth_user.user().uid)?;
  Ok(HttpResponse::Ok().json(json!({ "cart": view })))
}

#[instrument(
    name = "handler::add_to_cart",
    skip(app_state, req_payload, auth_user),
    fields(uid = %auth_user.user().uid, product_id = %req_payload.product_id)
)]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<AddToCartRequestPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let line = checkout_service::add_to_cart(&app_state, auth_user.user(), req_payload.product_id).await?;
  info!(quantity = line.quantity, "Item added to cart.");

  let view = current_view(&app_state, &auth_user.user().uid)?;
  Ok(HttpResponse::Ok().json(json!({
      "message": "Item added to cart successfully.",
      "cartItem": line,
      "cart": view
  })))
}

#[instrument(
    name = "handler::update_cart_item",
    skip(app_state, path, req_payload, auth_user),
    fields(uid = %auth_user.user().uid, product_id = %path.as_ref(), quantity = req_payload.quantity)
)]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  req_payload: web::Json<UpdateQuantityPayload>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cart = app_state
    .sessions
    .cart_for(&auth_user.user().uid)
    .ok_or(AppError::SessionMissing)?;
  let line = cart.write().update_quantity(product_id, req_payload.quantity)?;

  let view = CartView::from_cart(&cart.read(), &app_state);
  Ok(HttpResponse::Ok().json(json!({
      "cartItem": line,
      "removed": line.is_none(),
      "cart": view
  })))
}

#[instrument(
    name = "handler::remove_cart_item",
    skip(app_state, path, auth_user),
    fields(uid = %auth_user.user().uid, product_id = %path.as_ref())
)]
pub async fn remove_cart_item_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let product_id = path.into_inner();
  let cart = app_state
    .sessions
    .cart_for(&auth_user.user().uid)
    .ok_or(AppError::SessionMissing)?;
  let removed = cart.write().remove_from_cart(product_id);

  let view = CartView::from_cart(&cart.read(), &app_state);
  Ok(HttpResponse::Ok().json(json!({
      "removed": removed.is_some(),
      "cart": view
  })))
}

#[instrument(name = "handler::clear_cart", skip(app_state, auth_user), fields(uid = %auth_user.user().uid))]
pub async fn clear_cart_handler(
  app_state: web::Data<AppState>,
  auth_user: AuthenticatedUser,
) -> Result<HttpResponse, AppError> {
  let cart = app_state
    .sessions
    .cart_for(&auth_user.user().uid)
    .ok_or(AppError::SessionMissing)?;
  cart.write().clear_cart();

  let view = CartView::from_cart(&cart.read(), &app_state);
  Ok(HttpResponse::Ok().json(json!({ "cart": view })))
}
