// farmconnect/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::AddToCartCtxData;
use farmflow::{FlowRegistry, FlowResult, FlowState, Pipeline, StepControl};
use tracing::{info, warn};

pub fn register_add_to_cart_pipeline(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("fetch_product_for_cart", false, None),
    ("add_line_to_cart", false, None),
  ]);

  // Step 1: Current catalog record, so the line caches fresh price and stock.
  p.on("fetch_product_for_cart", |ctx: FlowState<AddToCartCtxData>| async move {
    let (product_id, catalog) = {
      let guard = ctx.read();
      (guard.product_id, guard.app_state.catalog.clone())
    };

    match catalog.get_product(product_id).await? {
      Some(product) => {
        info!(%product_id, stock = product.quantity, "Add to Cart: product fetched.");
        ctx.write().product = Some(product);
        Ok(StepControl::Continue)
      }
      None => {
        warn!(%product_id, "Add to Cart: product not found.");
        Err(AppError::NotFound(format!("Product with ID {} not found.", product_id)))
      }
    }
  })?;

  // Step 2: Apply to the session cart.
  p.on("add_line_to_cart", |ctx: FlowState<AddToCartCtxData>| async move {
    let mut guard = ctx.write();
    let product = guard
      .product
      .clone()
      .ok_or_else(|| AppError::Internal("product not loaded before add_line_to_cart".to_string()))?;
    let line = guard.cart.write().add_to_cart(&product)?;
    info!(product_id = %line.product_id, quantity = line.quantity, "Add to Cart: line updated.");
    guard.updated_line = Some(line);
    Ok::<_, AppError>(StepControl::Continue)
  })?;

  registry.register(p);
  info!("Add to cart pipeline registered.");
  Ok(())
}
