// tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use farmconnect::config::{AppConfig, StockPolicy};
use farmconnect::models::{CurrentUser, DeliveryDetails, NewOrder, Order, PaymentMethod, Product};
use farmconnect::state::AppState;
use farmconnect::stores::{CatalogStore, MemoryCatalogStore, MemoryOrderStore, OrderStore, StoreError};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub fn product(name: &str, farmer_id: &str, price: Decimal, quantity: u32) -> Product {
  let now = Utc::now();
  Product {
    id: Uuid::new_v4(),
    name: name.to_string(),
    description: format!("{} from {}", name, farmer_id),
    price,
    quantity,
    category: "vegetables".to_string(),
    farmer_id: farmer_id.to_string(),
    farmer_name: format!("Farm {}", farmer_id),
    location: "Pune, Maharashtra".to_string(),
    image_url: None,
    is_available: true,
    created_at: now,
    updated_at: now,
  }
}

pub fn customer(uid: &str) -> CurrentUser {
  CurrentUser {
    uid: uid.to_string(),
    email: format!("{}@farmconnect.test", uid),
  }
}

pub fn delivery() -> DeliveryDetails {
  DeliveryDetails {
    delivery_address: "12 MG Road, Pune".to_string(),
    phone: "+91-9876543212".to_string(),
    notes: "Leave at the gate".to_string(),
    payment_method: PaymentMethod::CashOnDelivery,
  }
}

pub fn config_with(policy: StockPolicy) -> AppConfig {
  AppConfig {
    stock_policy: policy,
    ..AppConfig::default()
  }
}

/// App state over in-memory stores, with typed handles kept for assertions.
pub struct TestApp {
  pub state: AppState,
  pub catalog: Arc<MemoryCatalogStore>,
  pub orders: Arc<MemoryOrderStore>,
}

pub fn test_app(policy: StockPolicy) -> TestApp {
  let catalog = Arc::new(MemoryCatalogStore::new());
  let orders = Arc::new(MemoryOrderStore::new());
  let state = AppState::new(config_with(policy), catalog.clone(), orders.clone()).unwrap();
  TestApp { state, catalog, orders }
}

impl TestApp {
  pub async fn stock(&self, product_id: Uuid) -> u32 {
    self.catalog.get_product(product_id).await.unwrap().unwrap().quantity
  }
}

/// Order store that rejects writes for one farmer until disarmed.
#[derive(Default)]
pub struct FlakyOrderStore {
  pub inner: MemoryOrderStore,
  failing_farmer: Mutex<Option<String>>,
  pub rejected: AtomicUsize,
}

impl FlakyOrderStore {
  pub fn failing_for(farmer_id: &str) -> Self {
    Self {
      failing_farmer: Mutex::new(Some(farmer_id.to_string())),
      ..Self::default()
    }
  }

  pub fn disarm(&self) {
    *self.failing_farmer.lock() = None;
  }
}

#[async_trait]
impl OrderStore for FlakyOrderStore {
  async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
    if self.failing_farmer.lock().as_deref() == Some(order.farmer_id.as_str()) {
      self.rejected.fetch_add(1, Ordering::SeqCst);
      return Err(StoreError::Unavailable(format!("order write for {} timed out", order.farmer_id)));
    }
    self.inner.create_order(order).await
  }

  async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StoreError> {
    self.inner.orders_for_customer(customer_id).await
  }
}

/// Catalog whose stock writes fail while `fail_stock_writes` is set.
#[derive(Default)]
pub struct BrokenStockCatalog {
  pub inner: MemoryCatalogStore,
  pub fail_stock_writes: AtomicBool,
}

#[async_trait]
impl CatalogStore for BrokenStockCatalog {
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
    self.inner.get_product(id).await
  }

  async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError> {
    self.inner.list_products(search).await
  }

  async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
    self.inner.insert_product(product).await
  }

  async fn set_quantity(&self, id: Uuid, quantity: u32, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
    if self.fail_stock_writes.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("catalog write rejected".to_string()));
    }
    self.inner.set_quantity(id, quantity, updated_at).await
  }

  async fn decrement_if_available(&self, id: Uuid, by: u32, updated_at: DateTime<Utc>) -> Result<u32, StoreError> {
    if self.fail_stock_writes.load(Ordering::SeqCst) {
      return Err(StoreError::Unavailable("catalog write rejected".to_string()));
    }
    self.inner.decrement_if_available(id, by, updated_at).await
  }
}

/// Order store whose writes take `delay` to land.
pub struct SlowOrderStore {
  pub inner: MemoryOrderStore,
  pub delay: Duration,
}

impl SlowOrderStore {
  pub fn new(delay: Duration) -> Self {
    Self {
      inner: MemoryOrderStore::new(),
      delay,
    }
  }
}

#[async_trait]
impl OrderStore for SlowOrderStore {
  async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.create_order(order).await
  }

  async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StoreError> {
    self.inner.orders_for_customer(customer_id).await
  }
}
