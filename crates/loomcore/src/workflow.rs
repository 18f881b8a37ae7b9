use crate::{Edge, Task};
use std::collections::HashMap;

/// Polymorphic graph element: a leaf task or a nested composite.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Task(Task),
    Workflow(Workflow),
}

impl NodeKind {
    pub fn id(&self) -> &str {
        match self {
            NodeKind::Task(task) => &task.id,
            NodeKind::Workflow(workflow) => &workflow.id,
        }
    }
}

/// Composite graph of nodes and edges with one start and one end node.
///
/// Workflows are immutable once constructed; `then` and `when` always
/// produce a new workflow with merged tables and never mutate an operand.
#[derive(Debug, Clone)]
pub struct Workflow {
    pub id: String,
    pub start_node_id: String,
    pub end_node_id: String,
    pub nodes: HashMap<String, NodeKind>,
    pub edges: HashMap<String, Edge>,
}

/// Ordered branch table for `Workflow::when`.
///
/// Arm order matters: explicit keys are tried in insertion order and the
/// `otherwise` continuation, when present, is always tried last.
#[derive(Debug, Clone, Default)]
pub struct Branches {
    arms: Vec<(String, Workflow)>,
    fallback: Option<Workflow>,
}

impl Branches {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a continuation taken when the source output stringifies to `key`.
    pub fn on(mut self, key: impl Into<String>, workflow: impl Into<Workflow>) -> Self {
        self.arms.push((key.into(), workflow.into()));
        self
    }

    /// Sets the catch-all continuation taken when no key matches.
    pub fn otherwise(mut self, workflow: impl Into<Workflow>) -> Self {
        self.fallback = Some(workflow.into());
        self
    }

    fn all(&self) -> impl Iterator<Item = &Workflow> {
        self.arms.iter().map(|(_, wf)| wf).chain(self.fallback.iter())
    }
}

impl Workflow {
    /// Sequential chaining: runs `self`, feeds its result to `next`.
    ///
    /// The new workflow starts at `self`'s start, ends at `next`'s end, and
    /// gains one unconditional edge from `self`'s end to `next`'s start.
    pub fn then(&self, next: impl Into<Workflow>) -> Workflow {
        let next = next.into();

        let mut nodes = self.nodes.clone();
        nodes.extend(next.nodes);

        let mut edges = self.edges.clone();
        edges.extend(next.edges);
        edges.insert(
            self.end_node_id.clone(),
            Edge::simple(next.start_node_id.clone()),
        );

        Workflow {
            id: format!("{} -> {}", self.id, next.id),
            start_node_id: self.start_node_id.clone(),
            end_node_id: next.end_node_id,
            nodes,
            edges,
        }
    }

    /// Discriminated branching on `self`'s output.
    ///
    /// Synthesizes a merge connector where all branches reconverge and a
    /// return connector that passes the source's raw output through when no
    /// key matches and no `otherwise` branch was supplied. The source's
    /// outgoing edge is replaced by a control-flow edge over the branch
    /// table; every branch's end reconnects to the merge node, which becomes
    /// the new end node.
    pub fn when(&self, branches: Branches) -> Workflow {
        let merge_node = Task::passthrough(format!("{}_complete-value", self.id));
        let return_node = Task::passthrough(format!("{}_return", self.id));

        let mut nodes = self.nodes.clone();
        let mut edges = self.edges.clone();
        for workflow in branches.all() {
            nodes.extend(workflow.nodes.clone());
            edges.extend(workflow.edges.clone());
        }
        nodes.insert(merge_node.id.clone(), NodeKind::Task(merge_node.clone()));
        nodes.insert(return_node.id.clone(), NodeKind::Task(return_node.clone()));

        let arms = branches
            .arms
            .iter()
            .map(|(key, workflow)| (key.clone(), workflow.start_node_id.clone()))
            .collect();
        let fallback_target = branches
            .fallback
            .as_ref()
            .map(|workflow| workflow.start_node_id.clone())
            .unwrap_or_else(|| return_node.id.clone());
        edges.insert(
            self.end_node_id.clone(),
            Edge::ControlFlow {
                branches: arms,
                default: Some(fallback_target),
            },
        );

        for workflow in branches.all() {
            edges.insert(
                workflow.end_node_id.clone(),
                Edge::simple(merge_node.id.clone()),
            );
        }

        Workflow {
            id: self.id.clone(),
            start_node_id: self.start_node_id.clone(),
            end_node_id: merge_node.id,
            nodes,
            edges,
        }
    }
}

impl Task {
    /// The one-node graph of this task: it maps its own id to itself with no
    /// outgoing edges.
    pub fn to_workflow(&self) -> Workflow {
        Workflow {
            id: self.id.clone(),
            start_node_id: self.id.clone(),
            end_node_id: self.id.clone(),
            nodes: HashMap::from([(self.id.clone(), NodeKind::Task(self.clone()))]),
            edges: HashMap::new(),
        }
    }

    pub fn then(&self, next: impl Into<Workflow>) -> Workflow {
        self.to_workflow().then(next)
    }

    pub fn when(&self, branches: Branches) -> Workflow {
        self.to_workflow().when(branches)
    }
}

impl From<Task> for Workflow {
    fn from(task: Task) -> Self {
        task.to_workflow()
    }
}

impl From<&Task> for Workflow {
    fn from(task: &Task) -> Self {
        task.to_workflow()
    }
}

impl From<&Workflow> for Workflow {
    fn from(workflow: &Workflow) -> Self {
        workflow.clone()
    }
}
