use crate::{FlowContext, TaskError, Value};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

/// A task's asynchronous unit of work.
#[async_trait]
pub trait TaskExec: Send + Sync {
    async fn call(&self, ctx: &FlowContext, input: &[Value]) -> Result<Value, TaskError>;
}

/// Adapter so plain async closures can act as tasks.
struct FnExec<F>(F);

#[async_trait]
impl<F, Fut> TaskExec for FnExec<F>
where
    F: Fn(FlowContext, Vec<Value>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TaskError>> + Send + 'static,
{
    async fn call(&self, ctx: &FlowContext, input: &[Value]) -> Result<Value, TaskError> {
        (self.0)(ctx.clone(), input.to_vec()).await
    }
}

/// Leaf unit of work: an id plus an asynchronous execute function.
#[derive(Clone)]
pub struct Task {
    pub id: String,
    pub exec: Arc<dyn TaskExec>,
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("id", &self.id).finish()
    }
}

impl Task {
    pub fn new(id: impl Into<String>, exec: Arc<dyn TaskExec>) -> Self {
        Self {
            id: id.into(),
            exec,
        }
    }

    /// Wraps an async closure under a generated id.
    pub fn from_fn<F, Fut>(f: F) -> Self
    where
        F: Fn(FlowContext, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, TaskError>> + Send + 'static,
    {
        Self::from_fn_with_id(f, Uuid::new_v4().to_string())
    }

    /// Wraps an async closure under the given id.
    pub fn from_fn_with_id<F, Fut>(f: F, id: impl Into<String>) -> Self
    where
        F: Fn(FlowContext, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, TaskError>> + Send + 'static,
    {
        Self::new(id, Arc::new(FnExec(f)))
    }

    /// Rewraps the execute function under a new id; a task that already
    /// carries the id is returned unchanged.
    pub fn with_id(self, id: impl Into<String>) -> Self {
        let id = id.into();
        if self.id == id {
            self
        } else {
            Self { id, exec: self.exec }
        }
    }

    /// Identity pass-through, used for the connector nodes synthesized by
    /// branching composition.
    pub(crate) fn passthrough(id: impl Into<String>) -> Self {
        Self::from_fn_with_id(
            |_ctx, input: Vec<Value>| async move {
                Ok(input.into_iter().next().unwrap_or_default())
            },
            id,
        )
    }
}
