// farmconnect/src/stores/memory.rs

use super::{CatalogStore, OrderStore, StoreError};
use crate::models::{NewOrder, Order, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryCatalogStore {
  products: RwLock<HashMap<Uuid, Product>>,
}

impl MemoryCatalogStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
    Ok(self.products.read().get(&id).cloned())
  }

  async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError> {
    let mut products: Vec<Product> = self
      .products
      .read()
      .values()
      .filter(|p| search.map_or(true, |term| p.matches_search(term)))
      .cloned()
      .collect();
    products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
    Ok(products)
  }

  async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
    self.products.write().insert(product.id, product.clone());
    Ok(product)
  }

  async fn set_quantity(&self, id: Uuid, quantity: u32, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
    let mut products = self.products.write();
    let product = products.get_mut(&id).ok_or_else(|| StoreError::product_not_found(id))?;
    product.quantity = quantity;
    product.updated_at = updated_at;
    debug!(product_id = %id, quantity, "Quantity set.");
    Ok(())
  }

  async fn decrement_if_available(&self, id: Uuid, by: u32, updated_at: DateTime<Utc>) -> Result<u32, StoreError> {
    let mut products = self.products.write();
    let product = products.get_mut(&id).ok_or_else(|| StoreError::product_not_found(id))?;
    if product.quantity < by {
      return Err(StoreError::InsufficientStock {
        product_id: id,
        available: product.quantity,
        requested: by,
      });
    }
    product.quantity -= by;
    product.updated_at = updated_at;
    Ok(product.quantity)
  }
}

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
  orders: RwLock<Vec<Order>>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.orders.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.orders.read().is_empty()
  }

  pub fn all(&self) -> Vec<Order> {
    self.orders.read().clone()
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
    let mut orders = self.orders.write();
    if let Some(existing) = orders
      .iter()
      .find(|o| o.checkout_key == order.checkout_key && o.farmer_id == order.farmer_id)
    {
      debug!(order_id = %existing.id, farmer_id = %existing.farmer_id, "Order already written for this checkout.");
      return Ok(existing.clone());
    }
    let stored = order.into_order(Uuid::new_v4());
    orders.push(stored.clone());
    Ok(stored)
  }

  async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StoreError> {
    let mut found: Vec<Order> = self
      .orders
      .read()
      .iter()
      .filter(|o| o.customer_id == customer_id)
      .cloned()
      .collect();
    found.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    Ok(found)
  }
}
