use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure returned by a task's asynchronous execution.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[error("{message}")]
pub struct TaskError {
    pub message: String,
    pub trace: Option<String>,
}

impl TaskError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: None,
        }
    }

    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            trace: Some(trace.into()),
        }
    }
}

/// Structured failure naming the node that was active when it occurred.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeFailure {
    pub node_id: String,
    pub message: String,
    pub trace: Option<String>,
}

impl NodeFailure {
    pub fn new(node_id: impl Into<String>, error: TaskError) -> Self {
        Self {
            node_id: node_id.into(),
            message: error.message,
            trace: error.trace,
        }
    }
}

/// Single rejection surface of a run.
#[derive(Error, Debug)]
pub enum FlowError {
    #[error("node '{}' failed: {}", .0.node_id, .0.message)]
    Task(NodeFailure),

    #[error("timed out after {0}ms")]
    Timeout(u64),

    #[error("saved state '{0}' is not part of the chart")]
    UnknownState(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
