// src/dag/graph.rs

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::dag::extract::{self, Extraction};
use crate::dag::op::{OpKey, OpRef};
use crate::dag::plan::ExecutionPlan;
use crate::errors::{LazydagError, Result};
use crate::session::SessionId;

const FIRST_SEQUENCE: u64 = 1;

/// The DAG container owned by one session.
///
/// Holds every operation registered during the session's lifetime, keyed by
/// [`OpKey`], together with the insertion sequence number each one received.
/// Because an operation can only name parents that were registered (or
/// already evaluated) before it, sequence order is a valid topological order
/// for everything the graph has ever held.
#[derive(Debug)]
pub struct Graph {
    session_id: SessionId,
    /// Next sequence number to hand out.
    sequence: u64,
    ops: HashMap<OpKey, OpRef>,
    sequence_by_key: HashMap<OpKey, u64>,
    /// Emit a warning (instead of a debug event) when an evaluated key is
    /// redefined.
    log_key_reuse: bool,
}

impl Graph {
    pub fn new(session_id: SessionId) -> Self {
        Self {
            session_id,
            sequence: FIRST_SEQUENCE,
            ops: HashMap::new(),
            sequence_by_key: HashMap::new(),
            log_key_reuse: false,
        }
    }

    pub fn with_key_reuse_logging(mut self, enabled: bool) -> Self {
        self.log_key_reuse = enabled;
        self
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Sequence number the next successful `add` will assign.
    pub fn next_sequence(&self) -> u64 {
        self.sequence
    }

    /// `true` iff an operation is registered under `key`.
    pub fn exists(&self, key: &str) -> bool {
        self.ops.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&OpRef> {
        self.ops.get(key)
    }

    pub fn sequence_of(&self, key: &str) -> Option<u64> {
        self.sequence_by_key.get(key).copied()
    }

    /// Register an operation and return the sequence number it was given.
    ///
    /// Fails with [`LazydagError::DefinitionConflict`] if the key already
    /// names an unevaluated operation. If the stored operation is evaluated,
    /// it is replaced and forgotten. On any error the graph is unchanged.
    pub fn add(&mut self, op: OpRef) -> Result<u64> {
        if op.key().is_empty() {
            return Err(LazydagError::InvalidOperation(
                "operation key must not be empty".to_string(),
            ));
        }

        let previous = match self.ops.get(op.key().as_str()) {
            Some(existing) if !existing.is_evaluated() => {
                return Err(LazydagError::DefinitionConflict {
                    key: op.key().to_string(),
                });
            }
            Some(_) => self.sequence_of(op.key().as_str()),
            None => None,
        };

        self.check_parents(&op)?;

        let seq = self.sequence;
        self.sequence += 1;

        if let Some(old_seq) = previous {
            if self.log_key_reuse {
                warn!(
                    key = %op.key(),
                    old_seq,
                    new_seq = seq,
                    "redefining evaluated operation; previous definition is dropped"
                );
            } else {
                debug!(key = %op.key(), old_seq, new_seq = seq, "redefining evaluated operation");
            }
        } else {
            debug!(
                key = %op.key(),
                op_type = %op.op_type(),
                seq,
                parents = op.parents().len(),
                "operation added"
            );
        }

        self.sequence_by_key.insert(op.key().clone(), seq);
        self.ops.insert(op.key().clone(), op);

        Ok(seq)
    }

    /// Every unevaluated parent must be the operation currently registered
    /// under its key; evaluated parents are historical and may be absent.
    fn check_parents(&self, op: &OpRef) -> Result<()> {
        for parent in op.parents() {
            if parent.is_evaluated() {
                continue;
            }
            match self.ops.get(parent.key().as_str()) {
                Some(registered) if Arc::ptr_eq(registered, parent) => {}
                _ => {
                    return Err(LazydagError::UnknownParent {
                        key: op.key().to_string(),
                        parent: parent.key().to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    /// All registered operations in insertion-sequence order.
    pub fn ops_in_order(&self) -> Vec<&OpRef> {
        let mut ordered: Vec<(u64, &OpRef)> = self
            .ops
            .iter()
            .map(|(key, op)| (self.sequence_of(key.as_str()).unwrap_or(u64::MAX), op))
            .collect();
        ordered.sort_by_key(|(seq, _)| *seq);
        ordered.into_iter().map(|(_, op)| op).collect()
    }

    /// Unfiltered dump of the whole graph in insertion-sequence order.
    pub fn to_execution_plan(&self) -> ExecutionPlan {
        ExecutionPlan::from_ops(self.ops_in_order())
    }

    /// Minimal, dependency-ordered batch of unevaluated operations needed to
    /// produce `targets`. See [`extract::extract`].
    pub fn extract<K: AsRef<str>>(&self, targets: &[K]) -> Result<Extraction> {
        extract::extract(self, targets)
    }

    /// Like [`Graph::extract`], serialized to the wire representation.
    pub fn extract_subgraph_for<K: AsRef<str>>(&self, targets: &[K]) -> Result<ExecutionPlan> {
        Ok(self.extract(targets)?.to_execution_plan())
    }

    /// Drop all operations and reset the sequence counter.
    pub fn clear(&mut self) {
        debug!(session = %self.session_id, ops = self.ops.len(), "clearing graph");
        self.ops.clear();
        self.sequence_by_key.clear();
        self.sequence = FIRST_SEQUENCE;
    }
}
