// farmconnect/src/services/sessions.rs

use crate::services::cart::Cart;
use farmflow::FlowState;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::info;

/// Live customer sessions, each owning one cart.
///
/// A session starts with an empty cart and its cart is dropped at logout.
#[derive(Debug, Default)]
pub struct SessionRegistry {
  carts: RwLock<HashMap<String, FlowState<Cart>>>,
}

impl SessionRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Starts (or restarts) a session with a fresh, empty cart.
  pub fn start(&self, uid: &str) -> FlowState<Cart> {
    let cart = FlowState::new(Cart::new());
    let replaced = self.carts.write().insert(uid.to_string(), cart.clone()).is_some();
    info!(uid, replaced, "Session started.");
    cart
  }

  /// Ends the session. Returns false when there was none.
  pub fn end(&self, uid: &str) -> bool {
    let removed = self.carts.write().remove(uid).is_some();
    info!(uid, removed, "Session ended.");
    removed
  }

  pub fn cart_for(&self, uid: &str) -> Option<FlowState<Cart>> {
    self.carts.read().get(uid).cloned()
  }

  pub fn active_sessions(&self) -> usize {
    self.carts.read().len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn lifecycle() {
    let sessions = SessionRegistry::new();
    assert!(sessions.cart_for("u1").is_none());

    let cart = sessions.start("u1");
    assert!(sessions.cart_for("u1").is_some_and(|c| c.same_as(&cart)));
    assert_eq!(sessions.active_sessions(), 1);

    let restarted = sessions.start("u1");
    assert!(!restarted.same_as(&cart));

    assert!(sessions.end("u1"));
    assert!(!sessions.end("u1"));
    assert!(sessions.cart_for("u1").is_none());
  }
}
