// farmflow/src/registry.rs

//! `FlowRegistry<AppErr>`: pipelines keyed by the type of state they run on.

use crate::control::FlowOutcome;
use crate::error::FlowError;
use crate::pipeline::Pipeline;
use crate::state::FlowState;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::{event, instrument, Level};

#[async_trait]
trait ErasedRunner<AppErr>: Send + Sync
where
  AppErr: std::error::Error + Send + Sync + 'static,
{
  /// `state` must be a boxed `FlowState<T>` for the runner's `T`.
  async fn run_erased(&self, state: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr>;
}

struct TypedRunner<T, E, AppErr>
where
  T: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pipeline: Arc<Pipeline<T, E>>,
  _app_err: PhantomData<fn() -> AppErr>,
}

#[async_trait]
impl<T, E, AppErr> ErasedRunner<AppErr> for TypedRunner<T, E, AppErr>
where
  T: 'static + Send + Sync,
  E: std::error::Error + From<FlowError> + Send + Sync + 'static,
  AppErr: std::error::Error + From<E> + From<FlowError> + Send + Sync + 'static,
{
  async fn run_erased(&self, state: Box<dyn Any + Send>) -> Result<FlowOutcome, AppErr> {
    let typed = match state.downcast::<FlowState<T>>() {
      Ok(boxed) => *boxed,
      Err(_) => {
        let expected_type = std::any::type_name::<FlowState<T>>().to_string();
        event!(Level::ERROR, %expected_type, "State type mismatch in registry dispatch.");
        return Err(AppErr::from(FlowError::TypeMismatch { expected_type }));
      }
    };
    self.pipeline.run(typed).await.map_err(AppErr::from)
  }
}

/// Registry of pipelines, one per state type.
///
/// `AppErr` is what `run` returns; it must absorb both engine errors and the
/// error type of every registered pipeline.
pub struct FlowRegistry<AppErr = FlowError>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  runners: RwLock<HashMap<TypeId, Arc<dyn ErasedRunner<AppErr>>>>,
}

impl<AppErr> FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub fn new() -> Self {
    Self {
      runners: RwLock::new(HashMap::new()),
    }
  }

  /// Registers `pipeline` for state type `T`, replacing any earlier one.
  pub fn register<T, E>(&self, pipeline: Pipeline<T, E>)
  where
    T: 'static + Send + Sync,
    E: std::error::Error + From<FlowError> + Send + Sync + 'static,
    AppErr: From<E>,
  {
    event!(Level::DEBUG, state_type = %std::any::type_name::<T>(), steps = ?pipeline.step_names(), "Registering pipeline.");
    let runner = TypedRunner::<T, E, AppErr> {
      pipeline: Arc::new(pipeline),
      _app_err: PhantomData,
    };
    self.runners.write().insert(TypeId::of::<T>(), Arc::new(runner));
  }

  pub fn is_registered<T: 'static>(&self) -> bool {
    self.runners.read().contains_key(&TypeId::of::<T>())
  }

  pub fn len(&self) -> usize {
    self.runners.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.runners.read().is_empty()
  }

  /// Runs the pipeline registered for `T` against `state`.
  #[instrument(name = "FlowRegistry::run", skip_all, fields(state_type = %std::any::type_name::<T>()))]
  pub async fn run<T>(&self, state: FlowState<T>) -> Result<FlowOutcome, AppErr>
  where
    T: 'static + Send + Sync,
  {
    // The read guard is released before awaiting the run.
    let runner = self.runners.read().get(&TypeId::of::<T>()).cloned();
    let runner = runner.ok_or_else(|| {
      let state_type = std::any::type_name::<T>().to_string();
      event!(Level::ERROR, %state_type, "No pipeline registered.");
      AppErr::from(FlowError::NotRegistered { state_type })
    })?;
    runner.run_erased(Box::new(state)).await
  }
}

impl<AppErr> Default for FlowRegistry<AppErr>
where
  AppErr: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn default() -> Self {
    Self::new()
  }
}
