// farmconnect/src/services/cart.rs

//! Session cart: an insertion-ordered set of lines keyed by product id.

use crate::models::{CartLine, Product};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartError {
  #[error("{name} is out of stock")]
  OutOfStock { product_id: Uuid, name: String },

  #[error("{name} is not available right now")]
  Unavailable { product_id: Uuid, name: String },

  #[error("Product {product_id} is not in the cart")]
  LineNotFound { product_id: Uuid },

  #[error("A checkout is already in progress for this cart")]
  CheckoutInProgress,
}

/// The cart of one customer session.
///
/// Also carries the checkout key of the next checkout attempt. The key is kept
/// across failed attempts and replaced whenever the lines change or a checkout
/// succeeds, so one key always names one set of lines.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
  lines: Vec<CartLine>,
  #[serde(skip)]
  checkout_key: Uuid,
  #[serde(skip)]
  checking_out: bool,
}

impl Default for Cart {
  fn default() -> Self {
    Self::new()
  }
}

impl Cart {
  pub fn new() -> Self {
    Self {
      lines: Vec::new(),
      checkout_key: Uuid::new_v4(),
      checking_out: false,
    }
  }

  pub fn lines(&self) -> &[CartLine] {
    &self.lines
  }

  pub fn line(&self, product_id: Uuid) -> Option<&CartLine> {
    self.lines.iter().find(|l| l.product_id == product_id)
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// Adds one unit of `product`, or bumps an existing line by one up to the available stock.
  ///
  /// An existing line takes the product's current price and stock before the bump.
  pub fn add_to_cart(&mut self, product: &Product) -> Result<CartLine, CartError> {
    if !product.is_available {
      return Err(CartError::Unavailable {
        product_id: product.id,
        name: product.name.clone(),
      });
    }
    if product.quantity == 0 {
      return Err(CartError::OutOfStock {
        product_id: product.id,
        name: product.name.clone(),
      });
    }

    if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
      line.refresh_from(product);
      line.quantity = (line.quantity + 1).min(line.available_quantity);
      debug!(product_id = %product.id, quantity = line.quantity, "Cart line incremented.");
      let line = line.clone();
      self.rotate_checkout_key();
      return Ok(line);
    }

    let line = CartLine::from_product(product);
    debug!(product_id = %product.id, "Cart line added.");
    self.lines.push(line.clone());
    self.rotate_checkout_key();
    Ok(line)
  }

  /// Sets a line's quantity, clamped to `[0, available_quantity]`.
  ///
  /// Returns `None` when the line was removed because the quantity reached zero.
  pub fn update_quantity(&mut self, product_id: Uuid, new_quantity: i64) -> Result<Option<CartLine>, CartError> {
    let idx = self
      .lines
      .iter()
      .position(|l| l.product_id == product_id)
      .ok_or(CartError::LineNotFound { product_id })?;

    self.rotate_checkout_key();
    if new_quantity <= 0 {
      self.lines.remove(idx);
      debug!(%product_id, "Cart line removed by zero quantity.");
      return Ok(None);
    }

    let line = &mut self.lines[idx];
    let capped = u32::try_from(new_quantity).unwrap_or(u32::MAX);
    line.quantity = capped.min(line.available_quantity);
    if line.quantity == 0 {
      self.lines.remove(idx);
      return Ok(None);
    }
    Ok(Some(line.clone()))
  }

  pub fn remove_from_cart(&mut self, product_id: Uuid) -> Option<CartLine> {
    let idx = self.lines.iter().position(|l| l.product_id == product_id)?;
    self.rotate_checkout_key();
    Some(self.lines.remove(idx))
  }

  pub fn clear_cart(&mut self) {
    if !self.lines.is_empty() {
      self.lines.clear();
      self.rotate_checkout_key();
    }
  }

  /// Takes purchased units out of the cart after a successful checkout.
  ///
  /// Only the given quantities are removed; lines added or topped up while the
  /// checkout ran stay in the cart. The checkout key is replaced.
  pub fn settle_purchase(&mut self, purchased: &[(Uuid, u32)]) {
    for &(product_id, quantity) in purchased {
      if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
        line.quantity = line.quantity.saturating_sub(quantity);
      }
    }
    self.lines.retain(|l| l.quantity > 0);
    self.rotate_checkout_key();
  }

  pub fn cart_total(&self) -> Decimal {
    self.lines.iter().map(CartLine::line_total).sum()
  }

  /// Total units across all lines.
  pub fn items_count(&self) -> u32 {
    self.lines.iter().map(|l| l.quantity).sum()
  }

  pub fn distinct_lines(&self) -> usize {
    self.lines.len()
  }

  pub fn checkout_key(&self) -> Uuid {
    self.checkout_key
  }

  pub fn rotate_checkout_key(&mut self) -> Uuid {
    self.checkout_key = Uuid::new_v4();
    self.checkout_key
  }

  /// Marks the cart as checking out. Fails while another checkout holds it.
  pub fn begin_checkout(&mut self) -> Result<(), CartError> {
    if self.checking_out {
      return Err(CartError::CheckoutInProgress);
    }
    self.checking_out = true;
    Ok(())
  }

  pub fn finish_checkout(&mut self) {
    self.checking_out = false;
  }

  pub fn is_checking_out(&self) -> bool {
    self.checking_out
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::Utc;
  use proptest::prelude::*;
  use rust_decimal_macros::dec;

  fn product(name: &str, price: Decimal, quantity: u32, farmer: &str) -> Product {
    let now = Utc::now();
    Product {
      id: Uuid::new_v4(),
      name: name.to_string(),
      description: String::new(),
      price,
      quantity,
      category: "vegetables".to_string(),
      farmer_id: farmer.to_string(),
      farmer_name: format!("{} farm", farmer),
      location: String::new(),
      image_url: None,
      is_available: true,
      created_at: now,
      updated_at: now,
    }
  }

  #[test]
  fn adding_twice_increments_and_caps_at_stock() {
    let mut cart = Cart::new();
    let basil = product("Basil", dec!(20), 2, "a");

    assert_eq!(cart.add_to_cart(&basil).unwrap().quantity, 1);
    assert_eq!(cart.add_to_cart(&basil).unwrap().quantity, 2);
    assert_eq!(cart.add_to_cart(&basil).unwrap().quantity, 2);
    assert_eq!(cart.distinct_lines(), 1);
    assert_eq!(cart.items_count(), 2);
  }

  #[test]
  fn out_of_stock_and_unavailable_products_are_rejected() {
    let mut cart = Cart::new();
    let empty = product("Okra", dec!(10), 0, "a");
    assert!(matches!(cart.add_to_cart(&empty), Err(CartError::OutOfStock { .. })));

    let mut hidden = product("Okra", dec!(10), 5, "a");
    hidden.is_available = false;
    assert!(matches!(cart.add_to_cart(&hidden), Err(CartError::Unavailable { .. })));
    assert!(cart.is_empty());
  }

  #[test]
  fn re_adding_refreshes_snapshot_and_reclamps() {
    let mut cart = Cart::new();
    let mut tomatoes = product("Tomatoes", dec!(45), 10, "a");
    cart.add_to_cart(&tomatoes).unwrap();
    cart.update_quantity(tomatoes.id, 8).unwrap();

    tomatoes.price = dec!(50);
    tomatoes.quantity = 3;
    let line = cart.add_to_cart(&tomatoes).unwrap();
    assert_eq!(line.unit_price, dec!(50));
    assert_eq!(line.available_quantity, 3);
    assert_eq!(line.quantity, 3);
  }

  #[test]
  fn update_quantity_clamps_and_zero_removes() {
    let mut cart = Cart::new();
    let lettuce = product("Lettuce", dec!(30), 5, "a");
    cart.add_to_cart(&lettuce).unwrap();

    let line = cart.update_quantity(lettuce.id, 99).unwrap().unwrap();
    assert_eq!(line.quantity, 5);

    assert_eq!(cart.update_quantity(lettuce.id, 0).unwrap(), None);
    assert!(cart.is_empty());

    assert_eq!(
      cart.update_quantity(lettuce.id, 1),
      Err(CartError::LineNotFound { product_id: lettuce.id })
    );
  }

  #[test]
  fn negative_quantity_removes_line() {
    let mut cart = Cart::new();
    let carrots = product("Carrots", dec!(40), 5, "b");
    cart.add_to_cart(&carrots).unwrap();
    assert_eq!(cart.update_quantity(carrots.id, -3).unwrap(), None);
    assert_eq!(cart.items_count(), 0);
  }

  #[test]
  fn totals_use_exact_decimals() {
    let mut cart = Cart::new();
    let herbs = product("Herbs", dec!(0.10), 10, "a");
    let honey = product("Honey", dec!(0.20), 10, "b");
    cart.add_to_cart(&herbs).unwrap();
    cart.add_to_cart(&honey).unwrap();
    assert_eq!(cart.cart_total(), dec!(0.30));

    cart.update_quantity(herbs.id, 3).unwrap();
    assert_eq!(cart.cart_total(), dec!(0.50));
    assert_eq!(cart.items_count(), 4);
  }

  #[test]
  fn remove_and_clear() {
    let mut cart = Cart::new();
    let a = product("A", dec!(1), 3, "a");
    let b = product("B", dec!(2), 3, "a");
    cart.add_to_cart(&a).unwrap();
    cart.add_to_cart(&b).unwrap();

    assert_eq!(cart.remove_from_cart(a.id).map(|l| l.name), Some("A".to_string()));
    assert_eq!(cart.remove_from_cart(a.id), None);
    assert_eq!(cart.lines()[0].product_id, b.id);

    cart.clear_cart();
    let key = cart.checkout_key();
    cart.clear_cart();
    assert!(cart.is_empty());
    assert_eq!(cart.cart_total(), Decimal::ZERO);
    assert_eq!(cart.checkout_key(), key);
    assert_ne!(cart.rotate_checkout_key(), key);
  }

  #[test]
  fn every_line_change_replaces_the_checkout_key() {
    let mut cart = Cart::new();
    let tomatoes = product("Tomatoes", dec!(45), 10, "a");

    let mut key = cart.checkout_key();
    let mut assert_rotated = |cart: &Cart| {
      assert_ne!(cart.checkout_key(), key);
      key = cart.checkout_key();
    };

    cart.add_to_cart(&tomatoes).unwrap();
    assert_rotated(&cart);
    cart.add_to_cart(&tomatoes).unwrap();
    assert_rotated(&cart);
    cart.update_quantity(tomatoes.id, 5).unwrap();
    assert_rotated(&cart);
    cart.remove_from_cart(tomatoes.id);
    assert_rotated(&cart);

    let unchanged = cart.checkout_key();
    assert_eq!(cart.remove_from_cart(tomatoes.id), None);
    assert!(cart.update_quantity(tomatoes.id, 2).is_err());
    assert_eq!(cart.checkout_key(), unchanged);
  }

  #[test]
  fn settle_purchase_leaves_units_added_later() {
    let mut cart = Cart::new();
    let tomatoes = product("Tomatoes", dec!(45), 10, "a");
    let honey = product("Honey", dec!(250), 5, "b");
    cart.add_to_cart(&tomatoes).unwrap();
    cart.update_quantity(tomatoes.id, 4).unwrap();
    cart.add_to_cart(&honey).unwrap();
    let key = cart.checkout_key();

    cart.settle_purchase(&[(tomatoes.id, 2), (honey.id, 1)]);

    assert_eq!(cart.distinct_lines(), 1);
    assert_eq!(cart.line(tomatoes.id).map(|l| l.quantity), Some(2));
    assert_ne!(cart.checkout_key(), key);
  }

  #[test]
  fn only_one_checkout_at_a_time() {
    let mut cart = Cart::new();
    assert!(cart.begin_checkout().is_ok());
    assert_eq!(cart.begin_checkout(), Err(CartError::CheckoutInProgress));
    assert!(cart.is_checking_out());
    cart.finish_checkout();
    assert!(cart.begin_checkout().is_ok());
  }

  #[derive(Debug, Clone)]
  enum CartOp {
    Add(usize),
    Update(usize, i64),
    Remove(usize),
  }

  fn cart_op() -> impl Strategy<Value = CartOp> {
    prop_oneof![
      (0..3usize).prop_map(CartOp::Add),
      (0..3usize, -2i64..8).prop_map(|(i, q)| CartOp::Update(i, q)),
      (0..3usize).prop_map(CartOp::Remove),
    ]
  }

  proptest! {
    #[test]
    fn totals_match_line_quantities_for_any_sequence(ops in proptest::collection::vec(cart_op(), 0..40)) {
      let shelf = [
        product("Herbs", dec!(0.10), 4, "a"),
        product("Honey", dec!(33.33), 6, "b"),
        product("Rice", dec!(19.99), 2, "a"),
      ];
      let mut cart = Cart::new();
      // (shelf index, quantity) in insertion order.
      let mut expected_lines: Vec<(usize, u32)> = Vec::new();

      for op in ops {
        match op {
          CartOp::Add(i) => {
            cart.add_to_cart(&shelf[i]).unwrap();
            match expected_lines.iter_mut().find(|(j, _)| *j == i) {
              Some(entry) => entry.1 = (entry.1 + 1).min(shelf[i].quantity),
              None => expected_lines.push((i, 1)),
            }
          }
          CartOp::Update(i, q) => {
            let result = cart.update_quantity(shelf[i].id, q);
            match expected_lines.iter().position(|(j, _)| *j == i) {
              None => prop_assert_eq!(result, Err(CartError::LineNotFound { product_id: shelf[i].id })),
              Some(pos) => {
                prop_assert!(result.is_ok());
                if q <= 0 {
                  expected_lines.remove(pos);
                } else {
                  expected_lines[pos].1 = (q as u32).min(shelf[i].quantity);
                }
              }
            }
          }
          CartOp::Remove(i) => {
            let removed = cart.remove_from_cart(shelf[i].id);
            let pos = expected_lines.iter().position(|(j, _)| *j == i);
            prop_assert_eq!(removed.is_some(), pos.is_some());
            if let Some(pos) = pos {
              expected_lines.remove(pos);
            }
          }
        }

        let expected_total: Decimal = expected_lines
          .iter()
          .map(|&(i, q)| shelf[i].price * Decimal::from(q))
          .sum();
        prop_assert_eq!(cart.cart_total(), expected_total);
        prop_assert_eq!(cart.items_count(), expected_lines.iter().map(|&(_, q)| q).sum::<u32>());
        let order: Vec<Uuid> = cart.lines().iter().map(|l| l.product_id).collect();
        let expected_order: Vec<Uuid> = expected_lines.iter().map(|&(i, _)| shelf[i].id).collect();
        prop_assert_eq!(order, expected_order);
      }
    }
  }
}
