// src/session/dispatch.rs

//! Pluggable dispatch backend.
//!
//! The session talks to a `Dispatcher` instead of a concrete transport. This
//! keeps the extract/dispatch/mark cycle testable with a fake dispatcher
//! while the real wire transport lives outside this crate.
//!
//! - [`ChannelDispatcher`] forwards plans over an mpsc channel to whatever
//!   task owns the engine connection and awaits its reply.
//! - [`DryRunDispatcher`] executes nothing and echoes the plan back.

use std::future::Future;
use std::pin::Pin;

use anyhow::anyhow;
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::dag::ExecutionPlan;

/// Future returned by [`Dispatcher::dispatch`].
pub type DispatchFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<Value>> + Send + 'a>>;

/// Ships an execution plan to a remote engine.
///
/// An `Err` means the batch did not (fully) succeed; the session then leaves
/// every `evaluated` flag untouched so the same extraction can be retried.
pub trait Dispatcher: Send {
    fn dispatch(&mut self, plan: ExecutionPlan) -> DispatchFuture<'_>;
}

/// A plan waiting for the engine side to answer.
#[derive(Debug)]
pub struct DispatchRequest {
    pub plan: ExecutionPlan,
    reply: oneshot::Sender<anyhow::Result<Value>>,
}

impl DispatchRequest {
    /// Complete the request. Returns `false` if the session stopped waiting.
    pub fn respond(self, result: anyhow::Result<Value>) -> bool {
        self.reply.send(result).is_ok()
    }
}

/// Dispatcher backed by a tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    tx: mpsc::Sender<DispatchRequest>,
}

impl ChannelDispatcher {
    /// Create the dispatcher together with the receiving end the engine
    /// connection task reads from.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<DispatchRequest>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl Dispatcher for ChannelDispatcher {
    fn dispatch(&mut self, plan: ExecutionPlan) -> DispatchFuture<'_> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            let (reply, response) = oneshot::channel();
            tx.send(DispatchRequest { plan, reply })
                .await
                .map_err(|_| anyhow!("engine endpoint closed before dispatch"))?;
            response
                .await
                .map_err(|_| anyhow!("engine endpoint dropped the request without replying"))?
        })
    }
}

/// Dispatcher that runs nothing and returns the plan it was given as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunDispatcher;

impl Dispatcher for DryRunDispatcher {
    fn dispatch(&mut self, plan: ExecutionPlan) -> DispatchFuture<'_> {
        Box::pin(async move {
            debug!(ops = plan.len(), "dry-run dispatch");
            serde_json::to_value(&plan).map_err(anyhow::Error::from)
        })
    }
}
