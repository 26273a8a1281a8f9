// farmconnect/src/pipelines/contexts.rs

//! State structs carried through the pipelines. Handlers receive them wrapped in `farmflow::FlowState`.

use crate::models::{CartLine, CurrentUser, DeliveryDetails, Order, OrderIntent, Product};
use crate::services::cart::Cart;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use farmflow::FlowState;
use serde::Serialize;
use uuid::Uuid;

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub cart: FlowState<Cart>,
  pub product_id: Uuid,
  pub product: Option<Product>,
  pub updated_line: Option<CartLine>,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, cart: FlowState<Cart>, product_id: Uuid) -> Self {
    Self {
      app_state,
      cart,
      product_id,
      product: None,
      updated_line: None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckoutPhase {
  Idle,
  Validating,
  Submitting,
  Completed,
  Failed,
}

/// Stock written for one product by a completed checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockUpdate {
  pub product_id: Uuid,
  pub purchased: u32,
  pub new_quantity: u32,
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub user: CurrentUser,
  pub details: DeliveryDetails,
  pub cart: FlowState<Cart>,

  pub phase: CheckoutPhase,
  pub phase_history: Vec<CheckoutPhase>,

  /// Cart lines as they were when validation passed. Later steps read only this.
  pub cart_snapshot: Vec<CartLine>,
  pub checkout_key: Option<Uuid>,
  pub order_date: Option<DateTime<Utc>>,
  pub intents: Vec<OrderIntent>,
  pub placed_orders: Vec<Order>,
  pub stock_updates: Vec<StockUpdate>,
  pub failure_step: Option<String>,
  pub failure_reason: Option<String>,
}

impl CheckoutCtxData {
  pub fn new(app_state: AppState, user: CurrentUser, details: DeliveryDetails, cart: FlowState<Cart>) -> Self {
    Self {
      app_state,
      user,
      details,
      cart,
      phase: CheckoutPhase::Idle,
      phase_history: vec![CheckoutPhase::Idle],
      cart_snapshot: Vec::new(),
      checkout_key: None,
      order_date: None,
      intents: Vec::new(),
      placed_orders: Vec::new(),
      stock_updates: Vec::new(),
      failure_step: None,
      failure_reason: None,
    }
  }

  pub fn enter(&mut self, phase: CheckoutPhase) {
    if self.phase != phase {
      self.phase = phase;
      self.phase_history.push(phase);
    }
  }
}
