// src/dag/mod.rs

//! Lazy execution graph.
//!
//! - [`op`] defines operations, their keys, types and kinds.
//! - [`graph`] holds the per-session DAG container.
//! - [`extract`] computes the minimal ordered batch for a set of targets.
//! - [`plan`] is the wire representation shipped to remote engines.
//! - [`handle`] binds an operation to its session for client code.

pub mod extract;
pub mod graph;
pub mod handle;
pub mod op;
pub mod plan;

pub use extract::Extraction;
pub use graph::Graph;
pub use handle::Handle;
pub use op::{EngineKind, OpKey, OpKind, OpRef, OpType, Operation};
pub use plan::{ExecutionPlan, PlanSegment, WireOp};
