//! Core graph model for loomflow
//!
//! This crate provides the task/workflow graph, the composition operators
//! that build larger graphs from smaller ones, and the context, error and
//! logging types shared across the workspace. It contains no execution
//! logic; compilation and execution live in `loomruntime` and `loommachine`.

mod context;
mod edge;
mod error;
mod logger;
mod task;
mod value;
mod workflow;

pub use context::{FlowContext, Snapshot};
pub use edge::Edge;
pub use error::{FlowError, NodeFailure, TaskError};
pub use logger::{FlowLogger, LogLevel};
pub use task::{Task, TaskExec};
pub use value::Value;
pub use workflow::{Branches, NodeKind, Workflow};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
