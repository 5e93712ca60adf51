// src/session/mod.rs

//! Session: owner of one graph and the only place `evaluated` flags change.
//!
//! One run cycle is strictly:
//! 1. extract the minimal batch for the requested handles,
//! 2. dispatch it through the [`Dispatcher`],
//! 3. on success, mark every operation in the batch evaluated.
//!
//! A failed or timed-out dispatch skips step 3, so repeating the call
//! reproduces the same batch.

pub mod dispatch;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::SessionSection;
use crate::dag::{Extraction, Graph, Handle, OpRef, OpType, Operation};
use crate::errors::{LazydagError, Result};

pub use dispatch::{ChannelDispatcher, DispatchRequest, Dispatcher, DryRunDispatcher};

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a session; handles carry it so cross-session use is caught.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        Self(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "session_{}", self.0)
    }
}

/// Options used by the session, usually taken from the `[session]` config.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Upper bound for one dispatch; `None` waits indefinitely.
    pub dispatch_timeout: Option<Duration>,
    /// Warn when an evaluated key is redefined.
    pub log_key_reuse: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&SessionSection::default())
    }
}

impl From<&SessionSection> for SessionOptions {
    fn from(section: &SessionSection) -> Self {
        Self {
            dispatch_timeout: (section.dispatch_timeout_ms > 0)
                .then(|| Duration::from_millis(section.dispatch_timeout_ms)),
            log_key_reuse: section.log_key_reuse,
        }
    }
}

pub struct Session<D: Dispatcher> {
    id: SessionId,
    graph: Graph,
    dispatcher: D,
    options: SessionOptions,
    /// Counter used to mint keys for [`Session::define`].
    key_counter: u64,
    closed: bool,
}

impl<D: Dispatcher> fmt::Debug for Session<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("graph", &self.graph)
            .field("options", &self.options)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl<D: Dispatcher> Session<D> {
    pub fn new(dispatcher: D, options: SessionOptions) -> Self {
        let id = SessionId::next();
        info!(session = %id, "session opened");
        Self {
            id,
            graph: Graph::new(id).with_key_reuse_logging(options.log_key_reuse),
            dispatcher,
            options,
            key_counter: 0,
            closed: false,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(LazydagError::SessionClosed(self.id));
        }
        Ok(())
    }

    /// Wrap an operation in a handle bound to this session.
    pub fn new_handle(&self, op: OpRef) -> Handle {
        Handle::new(op, self.id)
    }

    /// Register `op` with the graph and return a handle to it.
    pub fn add(&mut self, op: Operation) -> Result<Handle> {
        self.add_ref(op.into_ref())
    }

    pub fn add_ref(&mut self, op: OpRef) -> Result<Handle> {
        self.ensure_open()?;
        self.graph.add(op.clone())?;
        Ok(self.new_handle(op))
    }

    /// Create and register an operation with a freshly minted key.
    pub fn define(&mut self, op_type: OpType, parents: &[&Handle], payload: Value) -> Result<Handle> {
        self.ensure_open()?;

        let mut parent_ops = Vec::with_capacity(parents.len());
        for parent in parents {
            self.check_handle(parent)?;
            parent_ops.push(parent.op()?.clone());
        }

        // Caller-chosen keys share the namespace; never mint one that is taken.
        let key = loop {
            self.key_counter += 1;
            let candidate = format!("{}_{}", op_type, self.key_counter);
            if !self.graph.exists(&candidate) {
                break candidate;
            }
        };
        self.add(Operation::new(key, op_type, parent_ops, payload))
    }

    fn check_handle(&self, handle: &Handle) -> Result<()> {
        if handle.session_id() != self.id {
            return Err(LazydagError::SessionMismatch {
                expected: self.id,
                found: handle.session_id(),
            });
        }
        Ok(())
    }

    /// Extract the batch needed to materialize `targets`.
    ///
    /// Handles must belong to this session and still refer to the operation
    /// registered under their key.
    pub fn extract(&self, targets: &[&Handle]) -> Result<Extraction> {
        self.ensure_open()?;

        let mut keys = Vec::with_capacity(targets.len());
        for handle in targets {
            self.check_handle(handle)?;
            let op = handle.op()?;
            if let Some(registered) = self.graph.get(op.key().as_str()) {
                if !Arc::ptr_eq(registered, op) {
                    return Err(LazydagError::StaleHandle(op.key().to_string()));
                }
            }
            keys.push(op.key().as_str());
        }

        self.graph.extract(&keys)
    }

    /// Run one extract/dispatch/mark cycle and return the engine's result.
    pub async fn run(&mut self, targets: &[&Handle]) -> Result<Value> {
        let extraction = self.extract(targets)?;
        let plan = extraction.to_execution_plan();
        let keys = plan.keys().join(",");

        info!(session = %self.id, ops = plan.len(), %keys, "dispatching batch");

        let dispatch = self.dispatcher.dispatch(plan);
        let outcome = match self.options.dispatch_timeout {
            Some(limit) => match tokio::time::timeout(limit, dispatch).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(session = %self.id, ?limit, "dispatch timed out; batch left unevaluated");
                    return Err(LazydagError::DispatchTimeout(limit));
                }
            },
            None => dispatch.await,
        };

        match outcome {
            Ok(value) => {
                self.mark_evaluated(extraction.ops());
                info!(session = %self.id, ops = extraction.len(), "batch evaluated");
                Ok(value)
            }
            Err(err) => {
                warn!(session = %self.id, error = %err, "dispatch failed; batch left unevaluated");
                Err(LazydagError::DispatchFailed(err))
            }
        }
    }

    /// Flip the `evaluated` flag of every operation given.
    ///
    /// Only call this after the batch containing `ops` was dispatched
    /// successfully.
    pub fn mark_evaluated(&self, ops: &[OpRef]) {
        for op in ops {
            op.mark_evaluated();
        }
        debug!(session = %self.id, ops = ops.len(), "marked evaluated");
    }

    /// Mark the operations behind `handles` evaluated.
    pub fn mark_handles_evaluated(&self, handles: &[&Handle]) -> Result<()> {
        for handle in handles {
            self.check_handle(handle)?;
            handle.set_evaluated()?;
        }
        Ok(())
    }

    /// Tear the session down, dropping every operation it owns.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.graph.clear();
        self.closed = true;
        info!(session = %self.id, "session closed");
    }
}
