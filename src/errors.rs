// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Every error is scoped to the call that produced it: a failed `add`,
//! extraction or dispatch leaves the graph and all `evaluated` flags exactly
//! as they were before the call.

use std::time::Duration;

use thiserror::Error;

use crate::session::SessionId;

#[derive(Error, Debug)]
pub enum LazydagError {
    #[error("Definition conflict: operation '{key}' is already defined and not yet evaluated")]
    DefinitionConflict { key: String },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Operation '{key}' depends on unknown or unevaluated parent '{parent}'")]
    UnknownParent { key: String, parent: String },

    #[error("Nothing to extract: target set is empty")]
    EmptyTargets,

    #[error("Unknown target: {0}")]
    UnknownTarget(String),

    #[error("Target already evaluated: {0}")]
    AlreadyEvaluated(String),

    #[error("Stale handle: '{0}' no longer refers to the registered operation")]
    StaleHandle(String),

    #[error("Handle is not bound to an operation")]
    UnboundHandle,

    #[error("Session mismatch: expected {expected}, found {found}")]
    SessionMismatch { expected: SessionId, found: SessionId },

    #[error("Session {0} is closed")]
    SessionClosed(SessionId),

    #[error("Dispatch failed: {0}")]
    DispatchFailed(anyhow::Error),

    #[error("Dispatch timed out after {0:?}")]
    DispatchTimeout(Duration),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Cycle detected in DAG: {0}")]
    DagCycle(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, LazydagError>;
