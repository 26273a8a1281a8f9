// tests/pipeline_execution_tests.rs
mod common;

use common::*;
use farmflow::{FlowError, FlowOutcome, FlowState, Pipeline, SkipCondition, StepControl};
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn steps_run_in_declared_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[
    ("price_lines", false, None),
    ("sum_lines", false, None),
    ("stamp_order", false, None),
  ]);
  pipeline.on_boxed("price_lines", adding_handler("price_lines", 45)).unwrap();
  pipeline.on_boxed("sum_lines", adding_handler("sum_lines", 45)).unwrap();
  pipeline.on_boxed("stamp_order", adding_handler("stamp_order", 0)).unwrap();

  let state = FlowState::new(OrderFlowState::default());
  let outcome = pipeline.run(state.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Completed);
  let guard = state.read();
  assert_eq!(guard.running_total, 90);
  assert_eq!(guard.visited, vec!["price_lines", "sum_lines", "stamp_order"]);
}

#[tokio::test]
#[serial]
async fn halt_stops_remaining_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[
    ("validate", false, None),
    ("submit", false, None),
    ("notify", false, None),
  ]);
  pipeline.on_boxed("validate", adding_handler("validate", 1)).unwrap();
  pipeline.on_boxed("submit", adding_handler("submit", 1)).unwrap();
  pipeline.on_boxed("notify", adding_handler("notify", 1)).unwrap();

  let state = FlowState::new(OrderFlowState {
    halt_at: Some("submit".to_string()),
    ..Default::default()
  });
  let outcome = pipeline.run(state.clone()).await.unwrap();

  assert_eq!(outcome, FlowOutcome::Halted);
  assert!(!outcome.is_completed());
  assert_eq!(state.read().visited, vec!["validate", "submit"]);
}

#[tokio::test]
#[serial]
async fn handler_error_is_returned_and_later_steps_do_not_run() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[
    ("write_orders", false, None),
    ("write_stock", false, None),
    ("clear", false, None),
  ]);
  pipeline.on_boxed("write_orders", adding_handler("write_orders", 2)).unwrap();
  pipeline
    .on_boxed("write_stock", failing_handler("write_stock", "store offline"))
    .unwrap();
  pipeline.on_boxed("clear", adding_handler("clear", 0)).unwrap();

  let state = FlowState::new(OrderFlowState::default());
  let err = pipeline.run(state.clone()).await.unwrap_err();

  assert_eq!(err, TestError::Handler("store offline".to_string()));
  assert_eq!(state.read().visited, vec!["write_orders", "write_stock"]);
}

#[tokio::test]
#[serial]
async fn skip_condition_bypasses_step() {
  setup_tracing();
  let skip_when_priced: SkipCondition<OrderFlowState> =
    Arc::new(|s: FlowState<OrderFlowState>| s.read().running_total > 0);
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[
    ("first", false, None),
    ("only_when_empty", false, Some(skip_when_priced)),
    ("last", false, None),
  ]);
  pipeline.on_boxed("first", adding_handler("first", 5)).unwrap();
  pipeline
    .on_boxed("only_when_empty", adding_handler("only_when_empty", 100))
    .unwrap();
  pipeline.on_boxed("last", adding_handler("last", 5)).unwrap();

  let state = FlowState::new(OrderFlowState::default());
  assert_eq!(pipeline.run(state.clone()).await.unwrap(), FlowOutcome::Completed);
  assert_eq!(state.read().running_total, 10);
  assert_eq!(state.read().visited, vec!["first", "last"]);
}

#[tokio::test]
#[serial]
async fn non_optional_step_without_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<OrderFlowState, TestError>::new(&[("unwired", false, None)]);

  let err = pipeline
    .run(FlowState::new(OrderFlowState::default()))
    .await
    .unwrap_err();
  match err {
    TestError::Engine(s) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("unwired"));
    }
    other => panic!("expected engine error, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn optional_step_without_handler_is_skipped() {
  setup_tracing();
  let pipeline = Pipeline::<OrderFlowState, TestError>::new(&[("summary", true, None)]);
  let outcome = pipeline.run(FlowState::new(OrderFlowState::default())).await.unwrap();
  assert_eq!(outcome, FlowOutcome::Completed);
}

#[tokio::test]
#[serial]
async fn before_on_after_run_in_phase_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[("submit", false, None)]);
  pipeline.after("submit", adding_handler("after", 0)).unwrap();
  pipeline.on("submit", adding_handler("on", 0)).unwrap();
  pipeline.before("submit", adding_handler("before", 0)).unwrap();

  let state = FlowState::new(OrderFlowState::default());
  pipeline.run(state.clone()).await.unwrap();
  assert_eq!(state.read().notes, "beforeonafter");
}

#[tokio::test]
#[serial]
async fn handlers_may_await_between_lock_scopes() {
  setup_tracing();
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[("slow", false, None)]);
  pipeline
    .on("slow", |state: FlowState<OrderFlowState>| async move {
      let start = state.read().running_total;
      tokio::time::sleep(std::time::Duration::from_millis(1)).await;
      state.write().running_total = start + 7;
      Ok::<_, TestError>(StepControl::Continue)
    })
    .unwrap();

  let state = FlowState::new(OrderFlowState::default());
  pipeline.run(state.clone()).await.unwrap();
  assert_eq!(state.read().running_total, 7);
}

#[test]
fn registering_on_unknown_step_is_an_error() {
  let mut pipeline = Pipeline::<OrderFlowState, TestError>::new(&[("known", false, None)]);
  let err = pipeline.on_boxed("unknown", adding_handler("unknown", 0)).err();
  assert!(matches!(err, Some(FlowError::StepNotFound { ref step_name }) if step_name == "unknown"));
  assert_eq!(pipeline.step_names(), vec!["known"]);
}
