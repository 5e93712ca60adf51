// src/dag/extract.rs

//! Reachability extraction.
//!
//! Given target operations, walk parent links backwards and collect every
//! operation that still has to run, then order the result by insertion
//! sequence. Extraction never touches `evaluated` flags, so repeating it
//! without an intervening successful dispatch yields the same batch.

use std::collections::{HashSet, VecDeque};

use tracing::debug;

use crate::dag::graph::Graph;
use crate::dag::op::{OpKey, OpRef};
use crate::dag::plan::ExecutionPlan;
use crate::errors::{LazydagError, Result};

/// Ordered batch of operations selected for one dispatch.
#[derive(Debug, Clone)]
pub struct Extraction {
    ops: Vec<OpRef>,
}

impl Extraction {
    pub fn ops(&self) -> &[OpRef] {
        &self.ops
    }

    pub fn keys(&self) -> Vec<&OpKey> {
        self.ops.iter().map(|op| op.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ops.iter().any(|op| op.key().as_str() == key)
    }

    pub fn to_execution_plan(&self) -> ExecutionPlan {
        ExecutionPlan::from_ops(self.ops.iter())
    }
}

/// Compute the extraction for `targets` against `graph`.
///
/// - Every target must be registered and unevaluated.
/// - A single leaf target is returned alone, without an ancestor walk.
/// - Otherwise a breadth-first walk over unevaluated parents collects the
///   batch; evaluated parents end the walk along their path.
/// - The batch is sorted by insertion sequence, not discovery order.
pub fn extract<K: AsRef<str>>(graph: &Graph, targets: &[K]) -> Result<Extraction> {
    if targets.is_empty() {
        return Err(LazydagError::EmptyTargets);
    }

    let mut roots: Vec<OpRef> = Vec::with_capacity(targets.len());
    for target in targets {
        let key = target.as_ref();
        let op = graph
            .get(key)
            .ok_or_else(|| LazydagError::UnknownTarget(key.to_string()))?;
        if op.is_evaluated() {
            return Err(LazydagError::AlreadyEvaluated(key.to_string()));
        }
        roots.push(op.clone());
    }

    if roots.len() == 1 && roots[0].is_leaf() {
        debug!(key = %roots[0].key(), "leaf target; skipping ancestor walk");
        return Ok(Extraction { ops: roots });
    }

    let mut keep: HashSet<OpKey> = HashSet::new();
    let mut kept: Vec<OpRef> = Vec::new();
    let mut queue: VecDeque<OpRef> = roots.into_iter().collect();

    while let Some(op) = queue.pop_front() {
        if !keep.insert(op.key().clone()) {
            continue;
        }
        for parent in op.parents() {
            if !parent.is_evaluated() {
                queue.push_back(parent.clone());
            }
        }
        kept.push(op);
    }

    let mut ordered = Vec::with_capacity(kept.len());
    for op in kept {
        let seq = graph
            .sequence_of(op.key().as_str())
            .ok_or_else(|| LazydagError::UnknownTarget(op.key().to_string()))?;
        ordered.push((seq, op));
    }
    ordered.sort_by_key(|(seq, _)| *seq);

    let ops: Vec<OpRef> = ordered.into_iter().map(|(_, op)| op).collect();
    debug!(
        targets = targets.len(),
        batch = ops.len(),
        "extracted subgraph"
    );

    Ok(Extraction { ops })
}
