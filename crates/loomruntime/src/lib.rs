//! Workflow compilation and execution
//!
//! This crate flattens a composed workflow graph into the state chart the
//! interpreter consumes, and exposes the `run`/`resume` surface callers use
//! to drive a graph to completion.

mod compiler;
mod runtime;

pub use compiler::compile;
pub use runtime::{RunOptions, RunWorkflow};
