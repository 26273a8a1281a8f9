// farmconnect/src/models/cart_line.rs

use crate::models::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One product in a session cart, with the price and stock snapshot taken when it was added.
///
/// `quantity` never exceeds `available_quantity`; a line whose quantity would
/// drop to zero is removed from the cart instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub product_id: Uuid,
  pub name: String,
  #[serde(with = "rust_decimal::serde::float")]
  pub unit_price: Decimal,
  pub quantity: u32,
  pub available_quantity: u32,
  pub farmer_id: String,
  pub farmer_name: String,
  pub image_url: Option<String>,
}

impl CartLine {
  /// A fresh line holding a single unit of `product`.
  pub fn from_product(product: &Product) -> Self {
    Self {
      product_id: product.id,
      name: product.name.clone(),
      unit_price: product.price,
      quantity: 1,
      available_quantity: product.quantity,
      farmer_id: product.farmer_id.clone(),
      farmer_name: product.farmer_name.clone(),
      image_url: product.image_url.clone(),
    }
  }

  /// Replaces the cached catalog snapshot and re-clamps the quantity against it.
  pub fn refresh_from(&mut self, product: &Product) {
    self.name = product.name.clone();
    self.unit_price = product.price;
    self.available_quantity = product.quantity;
    self.farmer_id = product.farmer_id.clone();
    self.farmer_name = product.farmer_name.clone();
    self.image_url = product.image_url.clone();
    self.quantity = self.quantity.min(self.available_quantity);
  }

  pub fn line_total(&self) -> Decimal {
    self.unit_price * Decimal::from(self.quantity)
  }
}
