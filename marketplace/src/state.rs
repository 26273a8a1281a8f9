// farmconnect/src/state.rs

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::pipelines;
use crate::services::sessions::SessionRegistry;
use crate::stores::{CatalogStore, MemoryCatalogStore, MemoryOrderStore, OrderStore};
use farmflow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub catalog: Arc<dyn CatalogStore>,
  pub orders: Arc<dyn OrderStore>,
  pub sessions: Arc<SessionRegistry>,
  pub flows: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires the stores together with a fresh session registry and all pipelines registered.
  pub fn new(config: AppConfig, catalog: Arc<dyn CatalogStore>, orders: Arc<dyn OrderStore>) -> Result<Self> {
    let flows = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flows)?;
    Ok(Self {
      catalog,
      orders,
      sessions: Arc::new(SessionRegistry::new()),
      flows,
      config: Arc::new(config),
    })
  }

  pub fn in_memory(config: AppConfig) -> Result<Self> {
    Self::new(
      config,
      Arc::new(MemoryCatalogStore::new()),
      Arc::new(MemoryOrderStore::new()),
    )
  }
}
