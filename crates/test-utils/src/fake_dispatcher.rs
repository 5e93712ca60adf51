use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use lazydag::dag::ExecutionPlan;
use lazydag::session::dispatch::{DispatchFuture, Dispatcher};
use serde_json::json;

/// A fake dispatcher that:
/// - records every plan it receives (as ordered key lists)
/// - fails the next `fail_next` dispatches, then succeeds.
#[derive(Clone, Default)]
pub struct FakeDispatcher {
    dispatched: Arc<Mutex<Vec<Vec<String>>>>,
    fail_next: Arc<AtomicUsize>,
}

impl FakeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shared log of dispatched batches, usable after the dispatcher was
    /// moved into a session.
    pub fn dispatched(&self) -> Arc<Mutex<Vec<Vec<String>>>> {
        Arc::clone(&self.dispatched)
    }

    /// Make the next `n` dispatches fail.
    pub fn fail_next(&self, n: usize) {
        self.fail_next.store(n, Ordering::SeqCst);
    }
}

impl Dispatcher for FakeDispatcher {
    fn dispatch(&mut self, plan: ExecutionPlan) -> DispatchFuture<'_> {
        let dispatched = Arc::clone(&self.dispatched);
        let fail_next = Arc::clone(&self.fail_next);

        Box::pin(async move {
            let keys: Vec<String> = plan.keys().into_iter().map(str::to_string).collect();
            dispatched.lock().unwrap().push(keys.clone());

            let should_fail = fail_next
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if should_fail {
                return Err(anyhow!("engine rejected batch"));
            }

            Ok(json!({ "executed": keys }))
        })
    }
}
