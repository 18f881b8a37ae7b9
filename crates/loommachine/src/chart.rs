use loomcore::TaskExec;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

/// Reserved id of the absorbing terminal state.
pub const TERMINAL_STATE: &str = "_complete";

/// Guard on a done-transition, evaluated against the completed task's
/// output.
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// Matches unconditionally; used for simple edges and default branches.
    Always,
    /// Matches when the stringified output equals the branch key.
    OutputEquals(String),
}

/// One candidate transition taken when a state's task completes. Candidates
/// are tried in order and the first match wins, so a catch-all must come
/// last.
#[derive(Debug, Clone, PartialEq)]
pub struct DoneTransition {
    pub guard: Guard,
    pub target: String,
}

/// Invocation descriptor bound to a flat state.
#[derive(Clone)]
pub struct Invocation {
    pub node_id: String,
    pub task: Arc<dyn TaskExec>,
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("node_id", &self.node_id)
            .finish()
    }
}

/// A single flat state.
#[derive(Debug, Clone, Default)]
pub struct ChartState {
    pub invoke: Option<Invocation>,
    pub on_done: Vec<DoneTransition>,
    /// Only the chart's initial state accepts the external input-injection
    /// event.
    pub accepts_input: bool,
    pub terminal: bool,
}

impl ChartState {
    pub fn invoking(invocation: Invocation, on_done: Vec<DoneTransition>) -> Self {
        Self {
            invoke: Some(invocation),
            on_done,
            ..Default::default()
        }
    }

    /// The absorbing final state: no invocation, no outgoing transitions.
    pub fn final_state() -> Self {
        Self {
            terminal: true,
            ..Default::default()
        }
    }
}

/// Flat state/transition table produced by the compiler and consumed by the
/// executor.
#[derive(Debug, Clone)]
pub struct StateChart {
    pub id: String,
    pub initial: String,
    pub states: HashMap<String, ChartState>,
}

impl StateChart {
    /// Deterministic structural summary: state ids mapped to their
    /// transition rules in evaluation order. Two compilations of the same
    /// workflow describe identically.
    pub fn describe(&self) -> BTreeMap<String, Vec<String>> {
        self.states
            .iter()
            .map(|(id, state)| {
                let mut rules: Vec<String> = state
                    .on_done
                    .iter()
                    .map(|t| match &t.guard {
                        Guard::Always => format!("always -> {}", t.target),
                        Guard::OutputEquals(key) => format!("'{}' -> {}", key, t.target),
                    })
                    .collect();
                if state.accepts_input {
                    rules.insert(0, "accepts input".to_string());
                }
                if state.terminal {
                    rules.push("final".to_string());
                }
                (id.clone(), rules)
            })
            .collect()
    }
}
