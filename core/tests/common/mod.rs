// tests/common/mod.rs
#![allow(dead_code)]

use farmflow::{FlowError, FlowState, StepControl};
use tracing::Level;

/// State shaped like a tiny order workflow: it records which handlers ran.
#[derive(Clone, Debug, Default)]
pub struct OrderFlowState {
  pub running_total: i64,
  pub notes: String,
  pub visited: Vec<String>,
  pub halt_at: Option<String>,
  pub failed_step: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("engine error: {0}")]
  Engine(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Engine(format!("{:?}", err))
  }
}

/// Adds `amount` to the running total and records `label`; halts if `halt_at == label`.
pub fn adding_handler(label: &'static str, amount: i64) -> farmflow::Handler<OrderFlowState, TestError> {
  Box::new(move |state: FlowState<OrderFlowState>| {
    Box::pin(async move {
      let mut guard = state.write();
      guard.running_total += amount;
      guard.notes.push_str(label);
      guard.visited.push(label.to_string());
      tracing::debug!(target: "test_handlers", label, total = guard.running_total, "handler ran");
      if guard.halt_at.as_deref() == Some(label) {
        return Ok(StepControl::Halt);
      }
      Ok(StepControl::Continue)
    })
  })
}

pub fn failing_handler(label: &'static str, message: &'static str) -> farmflow::Handler<OrderFlowState, TestError> {
  Box::new(move |state: FlowState<OrderFlowState>| {
    Box::pin(async move {
      state.write().visited.push(label.to_string());
      tracing::warn!(target: "test_handlers", label, "failing on purpose");
      Err(TestError::Handler(message.to_string()))
    })
  })
}

use once_cell::sync::Lazy;
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
