// farmflow/src/pipeline/mod.rs

//! The `Pipeline<T, E>` type: step definitions, hook registration and execution.

pub mod definition;
pub mod execution;
pub mod hooks;

pub use definition::{FailureHook, Handler, Pipeline};
