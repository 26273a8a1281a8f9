// farmflow/src/lib.rs

//! farmflow: a small asynchronous, step-based workflow engine.
//!
//! A workflow is a [`Pipeline`] of named steps run in order against a shared
//! [`FlowState`]. Each step may carry `before`, `on` and `after` handlers;
//! handlers are async and decide whether the run continues or halts. Steps
//! can be optional or skipped by a condition, and failure hooks observe the
//! step and error that ended a run.
//!
//! The [`FlowRegistry`] keys pipelines by their state type so a caller only
//! needs the state value to dispatch the right workflow.

pub mod control;
pub mod error;
pub mod pipeline;
pub mod registry;
pub mod state;
pub mod step;

pub use crate::control::{FlowOutcome, StepControl};
pub use crate::error::{FlowError, FlowResult};
pub use crate::pipeline::{FailureHook, Handler, Pipeline};
pub use crate::registry::FlowRegistry;
pub use crate::state::FlowState;
pub use crate::step::{SkipCondition, StepDef};

/*
    Typical use:
    1. Define a state struct `MyState` holding inputs, intermediate values and outputs.
    2. Build `Pipeline::<MyState, MyError>::new(&[("step_a", false, None), ...])`.
    3. Attach async handlers with `.on("step_a", ...)`, `.before(...)`, `.after(...)`.
    4. Optionally attach `.on_failure(...)` hooks to record how a run ended.
    5. Register it with a `FlowRegistry<AppError>` and call
       `registry.run(FlowState::new(my_state)).await`.
*/
