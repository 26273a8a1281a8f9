// farmflow/src/pipeline/hooks.rs

//! Registration of `before` / `on` / `after` handlers and failure hooks.

use crate::control::StepControl;
use crate::error::{FlowError, FlowResult};
use crate::pipeline::definition::{Handler, Phase, Pipeline};
use crate::state::FlowState;
use std::future::Future;
use tracing::{event, Level};

impl<T, E> Pipeline<T, E>
where
  T: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Registers a handler that runs before the step's `on` handlers.
  ///
  /// The handler's own error type only has to convert into the pipeline's `E`.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.push_handler(Phase::Before, step_name, handler_fn)
  }

  /// Registers the main handler(s) of a step.
  pub fn on<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.push_handler(Phase::On, step_name, handler_fn)
  }

  /// Registers a handler that runs after the step's `on` handlers.
  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.push_handler(Phase::After, step_name, handler_fn)
  }

  /// Registers an already boxed handler, e.g. one shared between pipelines.
  pub fn on_boxed(&mut self, step_name: &str, handler: Handler<T, E>) -> FlowResult<&mut Self> {
    self.ensure_step_exists(step_name)?;
    self.on.entry(step_name.to_string()).or_default().push(handler);
    Ok(self)
  }

  /// Registers a hook called once when a run fails, with the failing step and error.
  ///
  /// Hooks run in registration order before the error is returned to the caller.
  pub fn on_failure(&mut self, hook: impl Fn(FlowState<T>, &str, &E) + Send + Sync + 'static) -> &mut Self {
    self.failure_hooks.push(Box::new(hook));
    self
  }

  fn push_handler<F, HandlerErr>(
    &mut self,
    phase: Phase,
    step_name: &str,
    handler_fn: impl Fn(FlowState<T>) -> F + Send + Sync + 'static,
  ) -> FlowResult<&mut Self>
  where
    F: Future<Output = Result<StepControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<E> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name)?;
    let handler: Handler<T, E> = Box::new(move |state| {
      let fut = handler_fn(state);
      Box::pin(async move { fut.await.map_err(Into::into) })
    });
    self
      .handlers_for_mut(phase)
      .entry(step_name.to_string())
      .or_default()
      .push(handler);
    event!(Level::TRACE, step_name, phase = phase.as_str(), "Handler registered.");
    Ok(self)
  }
}
