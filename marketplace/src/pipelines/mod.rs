// farmconnect/src/pipelines/mod.rs

//! Defines and registers the workflows run by the marketplace.

use crate::errors::AppError;
use farmflow::{FlowRegistry, FlowResult};

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod contexts;

/// Registers every pipeline with `registry`. Called once per `AppState`.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) -> FlowResult<()> {
  tracing::info!("Registering pipelines...");
  cart_pipeline::register_add_to_cart_pipeline(registry)?;
  checkout_pipeline::register_checkout_pipeline(registry)?;
  tracing::info!(count = registry.len(), "All application pipelines registered.");
  Ok(())
}
