// farmconnect/src/stores/mod.rs

//! Catalog and order persistence, behind traits so the checkout pipeline can
//! run against PostgreSQL or in-memory maps.

use crate::models::{NewOrder, Order, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCatalogStore, MemoryOrderStore};
pub use postgres::{PgCatalogStore, PgOrderStore};

#[derive(Debug, Error)]
pub enum StoreError {
  #[error("{entity} {id} not found")]
  NotFound { entity: &'static str, id: String },

  #[error("Only {available} left of product {product_id}, {requested} requested")]
  InsufficientStock {
    product_id: Uuid,
    available: u32,
    requested: u32,
  },

  #[error("Store unavailable: {0}")]
  Unavailable(String),

  #[error("Stored record is malformed: {0}")]
  Corrupt(String),

  #[error("Database error: {0}")]
  Database(#[from] sqlx::Error),
}

impl StoreError {
  pub fn product_not_found(id: Uuid) -> Self {
    StoreError::NotFound {
      entity: "Product",
      id: id.to_string(),
    }
  }
}

#[async_trait]
pub trait CatalogStore: Send + Sync + 'static {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

  /// All products, by name. `search` filters on product or farmer name, ignoring case.
  async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError>;

  async fn insert_product(&self, product: Product) -> Result<Product, StoreError>;

  /// Overwrites only the quantity and `updated_at` of a product.
  async fn set_quantity(&self, id: Uuid, quantity: u32, updated_at: DateTime<Utc>) -> Result<(), StoreError>;

  /// Subtracts `by` only if at least that many units remain, returning the new quantity.
  async fn decrement_if_available(&self, id: Uuid, by: u32, updated_at: DateTime<Utc>) -> Result<u32, StoreError>;
}

#[async_trait]
pub trait OrderStore: Send + Sync + 'static {
  /// Persists an order and assigns its id.
  ///
  /// Writing the same `(checkout_key, farmer_id)` again returns the order
  /// stored the first time instead of creating a second one.
  async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

  /// The customer's orders, newest `order_date` first.
  async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StoreError>;
}
