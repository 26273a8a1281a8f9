// farmconnect/src/models/order_intent.rs

use crate::models::OrderItem;
use rust_decimal::Decimal;
use serde::Serialize;

/// The slice of a cart destined for one farmer. Built at submission time and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderIntent {
  pub farmer_id: String,
  pub farmer_name: String,
  pub items: Vec<OrderItem>,
  #[serde(with = "rust_decimal::serde::float")]
  pub total_amount: Decimal,
}

impl OrderIntent {
  pub fn units(&self) -> u32 {
    self.items.iter().map(|i| i.quantity).sum()
  }
}
