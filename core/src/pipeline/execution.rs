// farmflow/src/pipeline/execution.rs

//! `Pipeline::run`: walks the steps in order and drives each phase's handlers.

use crate::control::{FlowOutcome, StepControl};
use crate::error::FlowError;
use crate::pipeline::definition::{Phase, Pipeline};
use crate::state::FlowState;
use crate::step::StepDef;
use tracing::{event, info_span, instrument, Instrument, Level};

impl<T, E> Pipeline<T, E>
where
  T: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Runs every step against `state`.
  ///
  /// Returns `Halted` as soon as a handler asks to halt, and the handler's
  /// error (after notifying the failure hooks) as soon as one fails. A
  /// non-optional step without any handler fails with
  /// `FlowError::HandlerMissing` converted into `E`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      state_type = %std::any::type_name::<T>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, state: FlowState<T>) -> Result<FlowOutcome, E> {
    event!(Level::DEBUG, "Run starting.");

    for (step_idx, step) in self.steps.iter().enumerate() {
      let span = info_span!(
        "flow_step",
        step_name = step.name.as_str(),
        step_index = step_idx,
        optional = step.optional
      );
      match self.run_step(step, &state).instrument(span).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Halt) => {
          event!(Level::INFO, step_name = step.name.as_str(), "Run halted.");
          return Ok(FlowOutcome::Halted);
        }
        Err(err) => {
          self.notify_failure(&state, &step.name, &err);
          return Err(err);
        }
      }
    }

    event!(Level::DEBUG, "Run completed.");
    Ok(FlowOutcome::Completed)
  }

  async fn run_step(&self, step: &StepDef<T>, state: &FlowState<T>) -> Result<StepControl, E> {
    if let Some(skip_if) = &step.skip_if {
      if skip_if(state.clone()) {
        event!(Level::INFO, "Step skipped by its condition.");
        return Ok(StepControl::Continue);
      }
    }

    if !self.has_handlers(&step.name) {
      if step.optional {
        event!(Level::DEBUG, "Optional step has no handlers, skipping.");
        return Ok(StepControl::Continue);
      }
      event!(Level::ERROR, "Non-optional step has no handlers.");
      return Err(E::from(FlowError::HandlerMissing {
        step_name: step.name.clone(),
      }));
    }

    for phase in Phase::ALL {
      if self.run_phase(phase, &step.name, state).await? == StepControl::Halt {
        return Ok(StepControl::Halt);
      }
    }
    event!(Level::DEBUG, "Step finished.");
    Ok(StepControl::Continue)
  }

  async fn run_phase(&self, phase: Phase, step_name: &str, state: &FlowState<T>) -> Result<StepControl, E> {
    let Some(handlers) = self.handlers_for(phase).get(step_name) else {
      return Ok(StepControl::Continue);
    };

    for (handler_idx, handler) in handlers.iter().enumerate() {
      let span = info_span!("flow_handler", phase = phase.as_str(), handler_index = handler_idx);
      match handler(state.clone()).instrument(span).await {
        Ok(StepControl::Continue) => {}
        Ok(StepControl::Halt) => {
          event!(Level::INFO, phase = phase.as_str(), "Handler asked to halt.");
          return Ok(StepControl::Halt);
        }
        Err(err) => {
          event!(Level::ERROR, phase = phase.as_str(), error = %err, "Handler failed.");
          return Err(err);
        }
      }
    }
    Ok(StepControl::Continue)
  }

  fn notify_failure(&self, state: &FlowState<T>, step_name: &str, err: &E) {
    for hook in &self.failure_hooks {
      hook(state.clone(), step_name, err);
    }
  }
}
