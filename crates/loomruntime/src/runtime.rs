use crate::compile;
use async_trait::async_trait;
use loomcore::{FlowError, FlowLogger, Snapshot, Task, Value, Workflow};
use loommachine::{ExecuteOptions, Executor};
use std::time::Duration;

/// Options for one `run` or `resume` call.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub timeout: Duration,
    pub logger: FlowLogger,
}

impl RunOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            logger: FlowLogger::default(),
        }
    }
}

impl From<RunOptions> for ExecuteOptions {
    fn from(opts: RunOptions) -> Self {
        Self {
            timeout: opts.timeout,
            logger: opts.logger,
        }
    }
}

/// Execution surface for composed graphs.
#[async_trait]
pub trait RunWorkflow {
    /// Compiles the graph and drives it to completion, seeding the start
    /// node's invocation with `input` and exposing `vars` to every task.
    async fn run(
        &self,
        vars: Value,
        input: Vec<Value>,
        opts: RunOptions,
    ) -> Result<Value, FlowError>;

    /// Re-hydrates a previously saved snapshot against a freshly compiled
    /// chart and drives it to completion.
    async fn resume(
        &self,
        snapshot: Snapshot,
        input: Vec<Value>,
        opts: RunOptions,
    ) -> Result<Value, FlowError>;
}

#[async_trait]
impl RunWorkflow for Workflow {
    async fn run(
        &self,
        vars: Value,
        input: Vec<Value>,
        opts: RunOptions,
    ) -> Result<Value, FlowError> {
        self.resume(Snapshot::fresh(vars), input, opts).await
    }

    async fn resume(
        &self,
        snapshot: Snapshot,
        input: Vec<Value>,
        opts: RunOptions,
    ) -> Result<Value, FlowError> {
        // compiled fresh per invocation, never cached across runs
        let chart = compile(self, &opts.logger);
        let executor = Executor::synchronize(chart, snapshot)?;
        executor.execute(input, opts.into()).await
    }
}

#[async_trait]
impl RunWorkflow for Task {
    async fn run(
        &self,
        vars: Value,
        input: Vec<Value>,
        opts: RunOptions,
    ) -> Result<Value, FlowError> {
        self.to_workflow().run(vars, input, opts).await
    }

    async fn resume(
        &self,
        snapshot: Snapshot,
        input: Vec<Value>,
        opts: RunOptions,
    ) -> Result<Value, FlowError> {
        self.to_workflow().resume(snapshot, input, opts).await
    }
}
