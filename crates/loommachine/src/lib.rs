//! Flat state-chart representation and the interpreter that drives it
//!
//! This crate is the execution collaborator of the workflow graph: it knows
//! nothing about composition or nesting, only about a single-level table of
//! invoking states with guarded transitions, and how to drive that table to
//! its terminal state against a wall-clock budget.

mod chart;
mod interpreter;

pub use chart::{ChartState, DoneTransition, Guard, Invocation, StateChart, TERMINAL_STATE};
pub use interpreter::{ExecuteOptions, Executor};
