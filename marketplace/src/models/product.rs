// farmconnect/src/models/product.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Products with fewer units than this (but more than zero) are flagged as low stock.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// A catalog entry listed by a farmer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub id: Uuid,
  pub name: String,
  #[serde(default)]
  pub description: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub price: Decimal,
  pub quantity: u32,
  #[serde(default)]
  pub category: String,
  pub farmer_id: String,
  pub farmer_name: String,
  #[serde(default)]
  pub location: String,
  pub image_url: Option<String>,
  pub is_available: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Product {
  pub fn is_in_stock(&self) -> bool {
    self.quantity > 0
  }

  pub fn is_low_stock(&self) -> bool {
    self.quantity > 0 && self.quantity < LOW_STOCK_THRESHOLD
  }

  /// Case-insensitive match on the product name or the farmer's name.
  pub fn matches_search(&self, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    term.is_empty() || self.name.to_lowercase().contains(&term) || self.farmer_name.to_lowercase().contains(&term)
  }
}
