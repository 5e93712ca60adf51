// src/dag/op.rs

//! Operations: the nodes of the lazy execution graph.
//!
//! An [`Operation`] is immutable once constructed, except for its
//! `evaluated` flag, which flips from `false` to `true` exactly once after
//! the batch containing it was dispatched successfully. Handles and the
//! graph share one `Arc<Operation>`, so there is a single authoritative flag.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dag::plan::WireOp;

/// Shared reference to an operation.
pub type OpRef = Arc<Operation>;

/// Unique identity of an operation within one graph's lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OpKey(String);

impl OpKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for OpKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for OpKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OpKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for OpKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Which remote engine an operation is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineKind {
    Analytical,
    Interactive,
    Learning,
    /// Resource bookkeeping handled by the coordinator itself.
    Coordinator,
}

/// Closed set of operation types understood by the remote engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpType {
    CreateGraph,
    AddLabels,
    AddColumn,
    ProjectGraph,
    CreateApp,
    RunApp,
    ContextToDataframe,
    CreateInteractiveInstance,
    GremlinQuery,
    CreateLearningInstance,
    UnloadGraph,
    UnloadApp,
    UnloadContext,
    CloseInteractiveInstance,
    CloseLearningInstance,
}

impl OpType {
    /// Wire name of this type, identical to its serde representation.
    pub fn as_str(self) -> &'static str {
        match self {
            OpType::CreateGraph => "create_graph",
            OpType::AddLabels => "add_labels",
            OpType::AddColumn => "add_column",
            OpType::ProjectGraph => "project_graph",
            OpType::CreateApp => "create_app",
            OpType::RunApp => "run_app",
            OpType::ContextToDataframe => "context_to_dataframe",
            OpType::CreateInteractiveInstance => "create_interactive_instance",
            OpType::GremlinQuery => "gremlin_query",
            OpType::CreateLearningInstance => "create_learning_instance",
            OpType::UnloadGraph => "unload_graph",
            OpType::UnloadApp => "unload_app",
            OpType::UnloadContext => "unload_context",
            OpType::CloseInteractiveInstance => "close_interactive_instance",
            OpType::CloseLearningInstance => "close_learning_instance",
        }
    }

    /// Kind an operation of this type gets unless overridden.
    ///
    /// Resource teardown and queries against already-resident remote state
    /// act on engine-side state directly and are leaves.
    pub fn default_kind(self) -> OpKind {
        match self {
            OpType::GremlinQuery
            | OpType::UnloadGraph
            | OpType::UnloadApp
            | OpType::UnloadContext
            | OpType::CloseInteractiveInstance
            | OpType::CloseLearningInstance => OpKind::Leaf,
            _ => OpKind::Ordinary,
        }
    }

    pub fn engine(self) -> EngineKind {
        match self {
            OpType::CreateGraph
            | OpType::AddLabels
            | OpType::AddColumn
            | OpType::ProjectGraph
            | OpType::CreateApp
            | OpType::RunApp
            | OpType::ContextToDataframe => EngineKind::Analytical,
            OpType::CreateInteractiveInstance | OpType::GremlinQuery => EngineKind::Interactive,
            OpType::CreateLearningInstance => EngineKind::Learning,
            OpType::UnloadGraph
            | OpType::UnloadApp
            | OpType::UnloadContext
            | OpType::CloseInteractiveInstance
            | OpType::CloseLearningInstance => EngineKind::Coordinator,
        }
    }
}

impl fmt::Display for OpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an operation takes part in dependency-based extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Ordinary,
    /// Self-contained command; extracted alone, without its ancestors.
    Leaf,
}

/// A single unit of work in the dependency graph.
pub struct Operation {
    key: OpKey,
    op_type: OpType,
    kind: OpKind,
    parents: Vec<OpRef>,
    /// Engine-specific configuration; never inspected by the graph.
    payload: Value,
    evaluated: AtomicBool,
}

impl Operation {
    pub fn new(key: impl Into<OpKey>, op_type: OpType, parents: Vec<OpRef>, payload: Value) -> Self {
        Self {
            key: key.into(),
            op_type,
            kind: op_type.default_kind(),
            parents,
            payload,
            evaluated: AtomicBool::new(false),
        }
    }

    /// Override the kind derived from the operation type.
    pub fn with_kind(mut self, kind: OpKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn into_ref(self) -> OpRef {
        Arc::new(self)
    }

    pub fn key(&self) -> &OpKey {
        &self.key
    }

    pub fn op_type(&self) -> OpType {
        self.op_type
    }

    pub fn kind(&self) -> OpKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == OpKind::Leaf
    }

    pub fn parents(&self) -> &[OpRef] {
        &self.parents
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn is_evaluated(&self) -> bool {
        self.evaluated.load(Ordering::Acquire)
    }

    /// Flip the flag to `true`. There is no way back.
    pub(crate) fn mark_evaluated(&self) {
        self.evaluated.store(true, Ordering::Release);
    }

    /// Wire representation: parents are referenced by key only.
    pub fn to_wire(&self) -> WireOp {
        WireOp {
            key: self.key.to_string(),
            op_type: self.op_type,
            kind: self.kind,
            parents: self.parents.iter().map(|p| p.key.to_string()).collect(),
            config: self.payload.clone(),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parents: Vec<&str> = self.parents.iter().map(|p| p.key.as_str()).collect();
        f.debug_struct("Operation")
            .field("key", &self.key)
            .field("op_type", &self.op_type)
            .field("kind", &self.kind)
            .field("parents", &parents)
            .field("evaluated", &self.is_evaluated())
            .finish_non_exhaustive()
    }
}
