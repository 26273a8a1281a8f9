// farmconnect/src/services/splitter.rs

use crate::models::{CartLine, OrderIntent, OrderItem};
use crate::services::cart::Cart;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SplitError {
  #[error("Your cart is empty")]
  EmptyCart,
}

/// Groups the cart into one intent per farmer.
///
/// Farmers appear in the order their first line was added and each intent keeps
/// its lines in cart order.
pub fn split_by_farmer(cart: &Cart) -> Result<Vec<OrderIntent>, SplitError> {
  split_lines(cart.lines())
}

pub fn split_lines(lines: &[CartLine]) -> Result<Vec<OrderIntent>, SplitError> {
  if lines.is_empty() {
    return Err(SplitError::EmptyCart);
  }

  let mut intents: Vec<OrderIntent> = Vec::new();
  let mut by_farmer: HashMap<&str, usize> = HashMap::new();

  for line in lines {
    let idx = *by_farmer.entry(line.farmer_id.as_str()).or_insert_with(|| {
      intents.push(OrderIntent {
        farmer_id: line.farmer_id.clone(),
        farmer_name: line.farmer_name.clone(),
        items: Vec::new(),
        total_amount: Decimal::ZERO,
      });
      intents.len() - 1
    });

    let item = OrderItem {
      product_id: line.product_id,
      product_name: line.name.clone(),
      quantity: line.quantity,
      price_per_unit: line.unit_price,
      total_price: line.line_total(),
      image_url: line.image_url.clone(),
    };
    let intent = &mut intents[idx];
    intent.total_amount += item.total_price;
    intent.items.push(item);
  }

  Ok(intents)
}
