// farmconnect/src/pipelines/checkout_pipeline.rs

use crate::config::StockPolicy;
use crate::errors::AppError;
use crate::models::{NewOrder, OrderStatus, PaymentStatus};
use crate::pipelines::contexts::{CheckoutCtxData, CheckoutPhase, StockUpdate};
use crate::services::splitter;
use crate::stores::StoreError;
use chrono::{Duration, Utc};
use farmflow::{FlowRegistry, FlowResult, FlowState, Pipeline, StepControl};
use futures_util::future::join_all;
use std::collections::HashMap;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DELIVERY_ADDRESS_REQUIRED: &str = "Delivery address is required";
pub const PHONE_REQUIRED: &str = "Phone number is required";
pub const CART_EMPTY: &str = "Your cart is empty";

pub fn register_checkout_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("validate_delivery_details", false, None),
    ("split_cart_by_farmer", false, None),
    ("create_farmer_orders", false, None),
    ("decrement_product_stock", false, None),
    ("clear_cart", false, None),
    ("log_checkout_summary", true, None),
  ]);

  // Step 1: Validate delivery details and the cart. No remote writes happen before this passes.
  p.on("validate_delivery_details", |ctx: FlowState<CheckoutCtxData>| async move {
    let mut guard = ctx.write();
    guard.enter(CheckoutPhase::Validating);

    if guard.details.delivery_address.trim().is_empty() {
      return Err(AppError::Validation(DELIVERY_ADDRESS_REQUIRED.to_string()));
    }
    if guard.details.phone.trim().is_empty() {
      return Err(AppError::Validation(PHONE_REQUIRED.to_string()));
    }

    let (lines, checkout_key) = {
      let cart = guard.cart.read();
      (cart.lines().to_vec(), cart.checkout_key())
    };
    if lines.is_empty() {
      return Err(AppError::Validation(CART_EMPTY.to_string()));
    }
    guard.cart_snapshot = lines;
    guard.checkout_key = Some(checkout_key);
    info!(uid = %guard.user.uid, %checkout_key, "Checkout: delivery details validated.");
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  // Step 2: One intent per farmer.
  p.on("split_cart_by_farmer", |ctx: FlowState<CheckoutCtxData>| async move {
    let mut guard = ctx.write();
    guard.enter(CheckoutPhase::Submitting);
    let intents = splitter::split_lines(&guard.cart_snapshot)?;
    info!(farmers = intents.len(), "Checkout: cart split by farmer.");
    guard.intents = intents;
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  // Step 3: Concurrent order writes, all awaited before deciding the outcome.
  p.on("create_farmer_orders", |ctx: FlowState<CheckoutCtxData>| async move {
    let (orders_store, new_orders) = {
      let mut guard = ctx.write();
      let checkout_key = guard
        .checkout_key
        .ok_or_else(|| AppError::Internal("checkout key missing after validation".to_string()))?;
      let order_date = Utc::now();
      let estimated_delivery = order_date + Duration::days(guard.app_state.config.delivery_lead_days);
      guard.order_date = Some(order_date);

      let new_orders: Vec<NewOrder> = guard
        .intents
        .iter()
        .map(|intent| NewOrder {
          checkout_key,
          customer_id: guard.user.uid.clone(),
          customer_email: guard.user.email.clone(),
          farmer_id: intent.farmer_id.clone(),
          farmer_name: intent.farmer_name.clone(),
          items: intent.items.clone(),
          total_amount: intent.total_amount,
          delivery_address: guard.details.delivery_address.trim().to_string(),
          phone: guard.details.phone.trim().to_string(),
          notes: guard.details.notes.clone(),
          payment_method: guard.details.payment_method,
          status: OrderStatus::Pending,
          payment_status: PaymentStatus::Pending,
          order_date,
          estimated_delivery,
        })
        .collect();
      (guard.app_state.orders.clone(), new_orders)
    };

    let farmer_ids: Vec<String> = new_orders.iter().map(|o| o.farmer_id.clone()).collect();
    let results = join_all(new_orders.into_iter().map(|o| orders_store.create_order(o))).await;

    let mut placed = Vec::with_capacity(results.len());
    let mut first_error: Option<StoreError> = None;
    for (farmer_id, result) in farmer_ids.iter().zip(results) {
      match result {
        Ok(order) => {
          info!(order_id = %order.id, %farmer_id, "Checkout: order written.");
          placed.push(order);
        }
        Err(e) => {
          error!(%farmer_id, error = %e, "Checkout: order write failed.");
          first_error.get_or_insert(e);
        }
      }
    }

    ctx.write().placed_orders = placed;
    match first_error {
      Some(e) => Err(AppError::order_placement(e)),
      None => Ok(StepControl::Continue),
    }
  })?;

  // Step 4: One stock write per distinct product, based on the validated snapshot.
  p.on("decrement_product_stock", |ctx: FlowState<CheckoutCtxData>| async move {
    let (catalog, policy, purchases) = {
      let guard = ctx.read();
      let mut purchases: Vec<(Uuid, u32, u32)> = Vec::new();
      let mut seen: HashMap<Uuid, usize> = HashMap::new();
      for item in guard.intents.iter().flat_map(|i| i.items.iter()) {
        let available = guard
          .cart_snapshot
          .iter()
          .find(|l| l.product_id == item.product_id)
          .map(|l| l.available_quantity)
          .ok_or_else(|| AppError::Internal(format!("product {} is missing from the checkout snapshot", item.product_id)))?;
        match seen.get(&item.product_id) {
          Some(&idx) => purchases[idx].1 += item.quantity,
          None => {
            seen.insert(item.product_id, purchases.len());
            purchases.push((item.product_id, item.quantity, available));
          }
        }
      }
      (guard.app_state.catalog.clone(), guard.app_state.config.stock_policy, purchases)
    };

    let updated_at = Utc::now();
    let writes = purchases.iter().map(|&(product_id, purchased, available)| {
      let catalog = catalog.clone();
      async move {
        let new_quantity = match policy {
          StockPolicy::Clamp => {
            let new_quantity = available.saturating_sub(purchased);
            catalog.set_quantity(product_id, new_quantity, updated_at).await?;
            new_quantity
          }
          StockPolicy::Conditional => catalog.decrement_if_available(product_id, purchased, updated_at).await?,
        };
        Ok::<_, StoreError>(StockUpdate {
          product_id,
          purchased,
          new_quantity,
        })
      }
    });
    let results = join_all(writes).await;

    let mut updates = Vec::with_capacity(results.len());
    let mut first_error: Option<StoreError> = None;
    for ((product_id, _, _), result) in purchases.iter().zip(results) {
      match result {
        Ok(update) => updates.push(update),
        Err(e) => {
          error!(%product_id, error = %e, "Checkout: stock update failed.");
          first_error.get_or_insert(e);
        }
      }
    }

    ctx.write().stock_updates = updates;
    match first_error {
      Some(e) => Err(AppError::order_placement(e)),
      None => Ok(StepControl::Continue),
    }
  })?;

  // Step 5: Only reached when every write succeeded. Removes what was bought, nothing more.
  p.on("clear_cart", |ctx: FlowState<CheckoutCtxData>| async move {
    let mut guard = ctx.write();
    let purchased: Vec<(Uuid, u32)> = guard.stock_updates.iter().map(|u| (u.product_id, u.purchased)).collect();
    guard.cart.write().settle_purchase(&purchased);
    guard.enter(CheckoutPhase::Completed);
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on("log_checkout_summary", |ctx: FlowState<CheckoutCtxData>| async move {
    let guard = ctx.read();
    let order_ids: Vec<String> = guard.placed_orders.iter().map(|o| o.id.to_string()).collect();
    info!(
      uid = %guard.user.uid,
      orders = ?order_ids,
      stock_writes = guard.stock_updates.len(),
      payment_method = %guard.details.payment_method,
      "Checkout completed."
    );
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  p.on_failure(|ctx, step_name, err| {
    let mut guard = ctx.write();
    warn!(step_name, error = %err, uid = %guard.user.uid, "Checkout failed.");
    guard.enter(CheckoutPhase::Failed);
    guard.failure_step = Some(step_name.to_string());
    guard.failure_reason = Some(err.to_string());
  });

  registry.register(p);
  info!("Checkout pipeline registered.");
  Ok(())
}
