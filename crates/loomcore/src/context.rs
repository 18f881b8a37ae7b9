use crate::{NodeFailure, Value};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

/// Mutable context exclusively owned by one executor for the duration of a
/// single run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowContext {
    /// Caller-supplied state, visible to every task.
    pub vars: Value,

    /// Arguments fed to the next task invocation.
    pub input: Vec<Value>,

    /// Output of the most recently completed task.
    pub result: Value,

    /// Failure recorded when a task rejects; inspected after every
    /// transition.
    pub error: Option<NodeFailure>,

    /// Cancelled by the executor when the run times out. Tasks that never
    /// observe it keep running detached, but their results are ignored.
    #[serde(skip, default)]
    pub cancellation: CancellationToken,
}

impl FlowContext {
    pub fn with_vars(vars: Value) -> Self {
        Self {
            vars,
            ..Default::default()
        }
    }
}

/// Saved interpreter position plus context, round-trippable through
/// `Executor::synchronize`. A snapshot with no state starts fresh.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: Option<String>,
    pub context: FlowContext,
}

impl Snapshot {
    pub fn fresh(vars: Value) -> Self {
        Self {
            state: None,
            context: FlowContext::with_vars(vars),
        }
    }
}
