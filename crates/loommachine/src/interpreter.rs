use crate::{ChartState, Guard, StateChart};
use loomcore::{FlowContext, FlowError, FlowLogger, NodeFailure, Snapshot, Value};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::sleep;

/// Options for a single `execute` call.
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Wall-clock budget for the whole run. On expiry the context's
    /// cancellation token is cancelled so cooperative tasks can stop; a
    /// task that ignores it keeps running detached and its result is
    /// discarded.
    pub timeout: Duration,
    pub logger: FlowLogger,
}

impl Default for ExecuteOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            logger: FlowLogger::default(),
        }
    }
}

/// A chart hydrated with saved state, ready to be driven to completion.
#[derive(Debug)]
pub struct Executor {
    chart: StateChart,
    state: String,
    ctx: FlowContext,
}

impl Executor {
    /// Restores a chart against a previously saved snapshot. A snapshot
    /// with no state is a fresh start at the chart's initial state with the
    /// snapshot's context as initial context.
    pub fn synchronize(chart: StateChart, saved: Snapshot) -> Result<Self, FlowError> {
        let state = saved.state.unwrap_or_else(|| chart.initial.clone());
        if !chart.states.contains_key(&state) {
            return Err(FlowError::UnknownState(state));
        }
        Ok(Self {
            chart,
            state,
            ctx: saved.context,
        })
    }

    /// Current position and context, suitable for resuming a suspended run
    /// later.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: Some(self.state.clone()),
            context: self.ctx.clone(),
        }
    }

    /// Drives the chart until the terminal state, a recorded task failure,
    /// or the timeout, whichever comes first.
    pub async fn execute(
        mut self,
        input: Vec<Value>,
        opts: ExecuteOptions,
    ) -> Result<Value, FlowError> {
        let timeout_ms = opts.timeout.as_millis() as u64;
        let token = self.ctx.cancellation.clone();
        let logger = opts.logger;

        tokio::select! {
            outcome = self.drive(input, &logger) => outcome,
            _ = sleep(opts.timeout) => {
                logger.warn(
                    "run timed out, cancelling in-flight work",
                    Value::from(timeout_ms as i64),
                );
                token.cancel();
                Err(FlowError::Timeout(timeout_ms))
            }
        }
    }

    async fn drive(&mut self, input: Vec<Value>, logger: &FlowLogger) -> Result<Value, FlowError> {
        let context = serde_json::to_value(&self.ctx)
            .map(Value::from)
            .unwrap_or(Value::Null);
        logger.debug(
            "initial state",
            Value::Object(HashMap::from([
                ("state".to_string(), Value::from(self.state.as_str())),
                ("context".to_string(), context),
            ])),
        );

        // The input-injection event only lands on a state that declares it;
        // anywhere else (e.g. a resumed mid-flow snapshot) it is dropped.
        if self.current().is_some_and(|s| s.accepts_input) {
            self.ctx.input = input;
        } else if !input.is_empty() {
            logger.debug("input event not accepted here, dropped", Value::from(self.state.as_str()));
        }

        loop {
            // A stalled chart has no way forward; only the timeout race can
            // resolve the run, so the driver suspends indefinitely.
            let Some(state) = self.current().cloned() else {
                logger.warn("transition into unknown state, parking", Value::from(self.state.as_str()));
                return futures::future::pending().await;
            };

            if state.terminal {
                logger.debug("reached terminal state", Value::from(self.state.as_str()));
                return Ok(self.ctx.result.clone());
            }

            let Some(invocation) = state.invoke else {
                logger.warn("state has nothing to invoke, parking", Value::from(self.state.as_str()));
                return futures::future::pending().await;
            };

            logger.debug("entering state", Value::from(self.state.as_str()));
            let args = self.ctx.input.clone();
            match invocation.task.call(&self.ctx, &args).await {
                Err(error) => {
                    let failure = NodeFailure::new(self.state.clone(), error);
                    logger.error("task failed", Value::from(failure.message.as_str()));
                    self.ctx.error = Some(failure.clone());
                    return Err(FlowError::Task(failure));
                }
                Ok(output) => {
                    let chosen = state.on_done.iter().find(|t| match &t.guard {
                        Guard::Always => true,
                        Guard::OutputEquals(key) => output.discriminant() == *key,
                    });
                    let Some(transition) = chosen else {
                        logger.warn("no transition matched output, parking", output);
                        return futures::future::pending().await;
                    };

                    logger.debug(
                        "transition",
                        Value::from(format!("{} -> {}", self.state, transition.target)),
                    );
                    self.ctx.result = output.clone();
                    self.ctx.input = vec![output];
                    self.state = transition.target.clone();
                }
            }
        }
    }

    fn current(&self) -> Option<&ChartState> {
        self.chart.states.get(&self.state)
    }
}
