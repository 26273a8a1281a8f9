// farmconnect/src/stores/postgres.rs

use super::{CatalogStore, OrderStore, StoreError};
use crate::models::{NewOrder, Order, OrderItem, Product};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{instrument, warn};
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, description, price, quantity, category, farmer_id, farmer_name, location, \
   image_url, is_available, created_at, updated_at";

const ORDER_COLUMNS: &str = "id, checkout_key, customer_id, customer_email, farmer_id, farmer_name, items, \
   total_amount, delivery_address, phone, notes, payment_method, status, payment_status, order_date, estimated_delivery";

#[derive(Debug, FromRow)]
struct ProductRow {
  id: Uuid,
  name: String,
  description: String,
  price: Decimal,
  quantity: i32,
  category: String,
  farmer_id: String,
  farmer_name: String,
  location: String,
  image_url: Option<String>,
  is_available: bool,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
  fn from(row: ProductRow) -> Self {
    Product {
      id: row.id,
      name: row.name,
      description: row.description,
      price: row.price,
      quantity: u32::try_from(row.quantity).unwrap_or(0),
      category: row.category,
      farmer_id: row.farmer_id,
      farmer_name: row.farmer_name,
      location: row.location,
      image_url: row.image_url,
      is_available: row.is_available,
      created_at: row.created_at,
      updated_at: row.updated_at,
    }
  }
}

#[derive(Debug, FromRow)]
struct OrderRow {
  id: Uuid,
  checkout_key: Uuid,
  customer_id: String,
  customer_email: String,
  farmer_id: String,
  farmer_name: String,
  items: Json<Vec<OrderItem>>,
  total_amount: Decimal,
  delivery_address: String,
  phone: String,
  notes: String,
  payment_method: String,
  status: String,
  payment_status: String,
  order_date: DateTime<Utc>,
  estimated_delivery: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let corrupt = |e: crate::models::UnknownVariant| StoreError::Corrupt(format!("order {}: {}", row.id, e));
    Ok(Order {
      id: row.id,
      checkout_key: row.checkout_key,
      customer_id: row.customer_id,
      customer_email: row.customer_email,
      farmer_id: row.farmer_id,
      farmer_name: row.farmer_name,
      items: row.items.0,
      total_amount: row.total_amount,
      delivery_address: row.delivery_address,
      phone: row.phone,
      notes: row.notes,
      payment_method: row.payment_method.parse().map_err(corrupt)?,
      status: row.status.parse().map_err(corrupt)?,
      payment_status: row.payment_status.parse().map_err(corrupt)?,
      order_date: row.order_date,
      estimated_delivery: row.estimated_delivery,
    })
  }
}

fn to_db_quantity(quantity: u32) -> Result<i32, StoreError> {
  i32::try_from(quantity).map_err(|_| StoreError::Corrupt(format!("quantity {} does not fit the column", quantity)))
}

/// Applies the bundled migrations under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), StoreError> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| StoreError::Database(e.into()))
}

#[derive(Debug, Clone)]
pub struct PgCatalogStore {
  pool: PgPool,
}

impl PgCatalogStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
  #[instrument(name = "PgCatalogStore::get_product", skip(self), err(Display))]
  async fn get_product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
    let row: Option<ProductRow> = sqlx::query_as(&format!("SELECT {} FROM products WHERE id = $1", PRODUCT_COLUMNS))
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(row.map(Product::from))
  }

  #[instrument(name = "PgCatalogStore::list_products", skip(self), err(Display))]
  async fn list_products(&self, search: Option<&str>) -> Result<Vec<Product>, StoreError> {
    let pattern = search
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| format!("%{}%", s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")));
    let rows: Vec<ProductRow> = sqlx::query_as(&format!(
      "SELECT {} FROM products \
       WHERE $1::text IS NULL OR name ILIKE $1 OR farmer_name ILIKE $1 \
       ORDER BY name, id",
      PRODUCT_COLUMNS
    ))
    .bind(pattern)
    .fetch_all(&self.pool)
    .await?;
    Ok(rows.into_iter().map(Product::from).collect())
  }

  #[instrument(name = "PgCatalogStore::insert_product", skip(self, product), fields(product_id = %product.id), err(Display))]
  async fn insert_product(&self, product: Product) -> Result<Product, StoreError> {
    sqlx::query(
      "INSERT INTO products (id, name, description, price, quantity, category, farmer_id, farmer_name, location, \
       image_url, is_available, created_at, updated_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
       ON CONFLICT (id) DO NOTHING",
    )
    .bind(product.id)
    .bind(&product.name)
    .bind(&product.description)
    .bind(product.price)
    .bind(to_db_quantity(product.quantity)?)
    .bind(&product.category)
    .bind(&product.farmer_id)
    .bind(&product.farmer_name)
    .bind(&product.location)
    .bind(&product.image_url)
    .bind(product.is_available)
    .bind(product.created_at)
    .bind(product.updated_at)
    .execute(&self.pool)
    .await?;
    Ok(product)
  }

  #[instrument(name = "PgCatalogStore::set_quantity", skip(self), err(Display))]
  async fn set_quantity(&self, id: Uuid, quantity: u32, updated_at: DateTime<Utc>) -> Result<(), StoreError> {
    let result = sqlx::query("UPDATE products SET quantity = $2, updated_at = $3 WHERE id = $1")
      .bind(id)
      .bind(to_db_quantity(quantity)?)
      .bind(updated_at)
      .execute(&self.pool)
      .await?;
    if result.rows_affected() == 0 {
      return Err(StoreError::product_not_found(id));
    }
    Ok(())
  }

  #[instrument(name = "PgCatalogStore::decrement_if_available", skip(self), err(Display))]
  async fn decrement_if_available(&self, id: Uuid, by: u32, updated_at: DateTime<Utc>) -> Result<u32, StoreError> {
    let remaining: Option<i32> = sqlx::query_scalar(
      "UPDATE products SET quantity = quantity - $2, updated_at = $3 \
       WHERE id = $1 AND quantity >= $2 RETURNING quantity",
    )
    .bind(id)
    .bind(to_db_quantity(by)?)
    .bind(updated_at)
    .fetch_optional(&self.pool)
    .await?;

    if let Some(remaining) = remaining {
      return Ok(u32::try_from(remaining).unwrap_or(0));
    }

    let available: Option<i32> = sqlx::query_scalar("SELECT quantity FROM products WHERE id = $1")
      .bind(id)
      .fetch_optional(&self.pool)
      .await?;
    match available {
      Some(available) => {
        warn!(product_id = %id, available, requested = by, "Conditional decrement refused.");
        Err(StoreError::InsufficientStock {
          product_id: id,
          available: u32::try_from(available).unwrap_or(0),
          requested: by,
        })
      }
      None => Err(StoreError::product_not_found(id)),
    }
  }
}

#[derive(Debug, Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(
    name = "PgOrderStore::create_order",
    skip(self, order),
    fields(checkout_key = %order.checkout_key, farmer_id = %order.farmer_id),
    err(Display)
  )]
  async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
    // A repeated (checkout_key, farmer_id) touches the existing row so RETURNING yields it.
    let row: OrderRow = sqlx::query_as(&format!(
      "INSERT INTO orders (id, checkout_key, customer_id, customer_email, farmer_id, farmer_name, items, \
       total_amount, delivery_address, phone, notes, payment_method, status, payment_status, order_date, \
       estimated_delivery) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
       ON CONFLICT (checkout_key, farmer_id) DO UPDATE SET checkout_key = EXCLUDED.checkout_key \
       RETURNING {}",
      ORDER_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(order.checkout_key)
    .bind(&order.customer_id)
    .bind(&order.customer_email)
    .bind(&order.farmer_id)
    .bind(&order.farmer_name)
    .bind(Json(&order.items))
    .bind(order.total_amount)
    .bind(&order.delivery_address)
    .bind(&order.phone)
    .bind(&order.notes)
    .bind(order.payment_method.as_str())
    .bind(order.status.as_str())
    .bind(order.payment_status.as_str())
    .bind(order.order_date)
    .bind(order.estimated_delivery)
    .fetch_one(&self.pool)
    .await?;
    Order::try_from(row)
  }

  #[instrument(name = "PgOrderStore::orders_for_customer", skip(self), err(Display))]
  async fn orders_for_customer(&self, customer_id: &str) -> Result<Vec<Order>, StoreError> {
    let rows: Vec<OrderRow> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE customer_id = $1 ORDER BY order_date DESC",
      ORDER_COLUMNS
    ))
    .bind(customer_id)
    .fetch_all(&self.pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
  }
}
