use loomcore::{Edge, FlowLogger, NodeKind, Value, Workflow};
use loommachine::{ChartState, DoneTransition, Guard, Invocation, StateChart, TERMINAL_STATE};
use std::collections::{HashMap, HashSet};

/// Flattens a workflow graph into the chart consumed by the executor.
///
/// Nested workflow nodes are descended into rather than materialized; only
/// their leaf tasks become states. Node and edge lookup falls back from the
/// containing scope to the root tables, re-converging or cyclic edges
/// terminate via the visited set, and an id found in neither table is
/// logged and dropped rather than failing the compilation.
///
/// Deterministic for a fixed workflow value; performs no I/O besides
/// logging.
pub fn compile(workflow: &Workflow, logger: &FlowLogger) -> StateChart {
    let initial = resolve_start(workflow);
    let mut states: HashMap<String, ChartState> = HashMap::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut worklist: Vec<(String, &Workflow)> = vec![(workflow.start_node_id.clone(), workflow)];

    while let Some((node_id, scope)) = worklist.pop() {
        if !visited.insert(node_id.clone()) {
            logger.debug("already visited node", Value::from(node_id.as_str()));
            continue;
        }

        let node = scope
            .nodes
            .get(&node_id)
            .or_else(|| workflow.nodes.get(&node_id));
        let Some(node) = node else {
            logger.error(
                "edge points at a node that exists in no table, dropping",
                Value::from(node_id.as_str()),
            );
            continue;
        };

        let task = match node {
            NodeKind::Workflow(nested) => {
                worklist.push((nested.start_node_id.clone(), nested));
                continue;
            }
            NodeKind::Task(task) => task,
        };

        logger.debug("adding state", Value::from(node_id.as_str()));
        let edge = scope
            .edges
            .get(&node_id)
            .or_else(|| workflow.edges.get(&node_id));
        let on_done = match edge {
            None => {
                if node_id != workflow.end_node_id {
                    logger.warn(
                        "node has no outgoing edges and is not the end",
                        Value::from(node_id.as_str()),
                    );
                }
                vec![DoneTransition {
                    guard: Guard::Always,
                    target: TERMINAL_STATE.to_string(),
                }]
            }
            Some(Edge::Simple { target }) => {
                worklist.push((target.clone(), scope));
                vec![DoneTransition {
                    guard: Guard::Always,
                    target: target.clone(),
                }]
            }
            Some(Edge::ControlFlow { branches, default }) => {
                let mut rules = Vec::with_capacity(branches.len() + 1);
                for (key, target) in branches {
                    worklist.push((target.clone(), scope));
                    rules.push(DoneTransition {
                        guard: Guard::OutputEquals(key.clone()),
                        target: target.clone(),
                    });
                }
                // catch-all stays last so it cannot shadow explicit keys
                if let Some(target) = default {
                    worklist.push((target.clone(), scope));
                    rules.push(DoneTransition {
                        guard: Guard::Always,
                        target: target.clone(),
                    });
                }
                rules
            }
        };

        let mut state = ChartState::invoking(
            Invocation {
                node_id: node_id.clone(),
                task: task.exec.clone(),
            },
            on_done,
        );
        state.accepts_input = node_id == initial;
        states.insert(node_id, state);
    }

    states.insert(TERMINAL_STATE.to_string(), ChartState::final_state());

    StateChart {
        id: workflow.id.clone(),
        initial,
        states,
    }
}

/// Resolves the root's start node through nested workflows to the leaf task
/// that becomes the chart's initial state.
fn resolve_start(workflow: &Workflow) -> String {
    let mut scope = workflow;
    let mut id = workflow.start_node_id.as_str();
    let mut seen = HashSet::new();
    while seen.insert(id.to_string()) {
        match scope.nodes.get(id) {
            Some(NodeKind::Workflow(nested)) => {
                id = nested.start_node_id.as_str();
                scope = nested;
            }
            _ => break,
        }
    }
    id.to_string()
}
