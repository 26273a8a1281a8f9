// farmconnect/src/services/checkout_service.rs

//! Entry points the web layer calls to run the cart and checkout workflows.

use crate::errors::{AppError, Result};
use crate::models::{CartLine, CurrentUser, DeliveryDetails, Order};
use crate::pipelines::contexts::{AddToCartCtxData, CheckoutCtxData, CheckoutPhase};
use crate::services::cart::Cart;
use crate::services::money;
use crate::state::AppState;
use farmflow::{FlowOutcome, FlowState};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// What the customer sees after a successful checkout.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutReceipt {
  pub orders: Vec<Order>,
  pub farmer_count: usize,
  #[serde(with = "rust_decimal::serde::str")]
  pub total_amount: Decimal,
  pub formatted_total: String,
  /// How long the confirmation should stay on screen before it is dismissed.
  pub confirmation_display_secs: u64,
  pub phases: Vec<CheckoutPhase>,
}

#[instrument(name = "checkout_service::add_to_cart", skip(state), fields(uid = %user.uid), err(Display))]
pub async fn add_to_cart(state: &AppState, user: &CurrentUser, product_id: Uuid) -> Result<CartLine> {
  let cart = state.sessions.cart_for(&user.uid).ok_or(AppError::SessionMissing)?;
  let ctx = FlowState::new(AddToCartCtxData::new(state.clone(), cart, product_id));

  match state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let line = ctx.read().updated_line.clone();
      line.ok_or_else(|| AppError::Internal("Cart update completed, but the line is unavailable.".to_string()))
    }
    FlowOutcome::Halted => Err(AppError::Internal("Process to add item to cart was halted.".to_string())),
  }
}

/// Holds a cart's checkout flag and releases it when dropped, including when
/// the request future is cancelled.
struct CheckoutClaim {
  cart: FlowState<Cart>,
}

impl CheckoutClaim {
  fn acquire(cart: FlowState<Cart>) -> Result<Self> {
    cart.write().begin_checkout()?;
    Ok(Self { cart })
  }
}

impl Drop for CheckoutClaim {
  fn drop(&mut self) {
    self.cart.write().finish_checkout();
  }
}

/// Runs the checkout workflow for the user's session cart.
///
/// On failure the cart is left untouched and keeps its checkout key, so a retry
/// of the same lines does not duplicate orders that were already written. A
/// second checkout on the same cart while one is running fails with
/// `CartError::CheckoutInProgress`.
#[instrument(name = "checkout_service::place_order", skip(state, details), fields(uid = %user.uid), err(Display))]
pub async fn place_order(state: &AppState, user: &CurrentUser, details: DeliveryDetails) -> Result<CheckoutReceipt> {
  let cart = state.sessions.cart_for(&user.uid).ok_or(AppError::SessionMissing)?;
  let _claim = CheckoutClaim::acquire(cart.clone())?;
  let ctx = FlowState::new(CheckoutCtxData::new(state.clone(), user.clone(), details, cart));

  match state.flows.run(ctx.clone()).await? {
    FlowOutcome::Completed => {
      let guard = ctx.read();
      let total_amount: Decimal = guard.placed_orders.iter().map(|o| o.total_amount).sum();
      info!(orders = guard.placed_orders.len(), %total_amount, "Order placed.");
      Ok(CheckoutReceipt {
        orders: guard.placed_orders.clone(),
        farmer_count: guard.intents.len(),
        total_amount,
        formatted_total: money::format_amount(total_amount, state.config.currency),
        confirmation_display_secs: state.config.confirmation_display_secs,
        phases: guard.phase_history.clone(),
      })
    }
    FlowOutcome::Halted => {
      warn!("Checkout pipeline was halted by a handler.");
      Err(AppError::Internal("Checkout was halted before completion.".to_string()))
    }
  }
}

#[instrument(name = "checkout_service::order_history", skip(state), fields(uid = %user.uid), err(Display))]
pub async fn order_history(state: &AppState, user: &CurrentUser) -> Result<Vec<Order>> {
  Ok(state.orders.orders_for_customer(&user.uid).await?)
}
