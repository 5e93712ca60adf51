//! Shared helpers for `lazydag` integration tests.

pub mod builders;
pub mod fake_dispatcher;

use std::future::Future;
use std::sync::Once;
use std::time::Duration;

use lazydag::logging::{LOG_ENV_VAR, resolve_filter};
use tracing_subscriber::fmt;

static INIT: Once = Once::new();

/// Upper bound for any single session run in tests.
pub const RUN_DEADLINE: Duration = Duration::from_secs(5);

/// Route `tracing` output into the test harness's captured output.
///
/// Uses the same filter rules as the binary: `LAZYDAG_LOG` (falling back to
/// `RUST_LOG`) as directives, `info` otherwise. Captured logs are only shown
/// for failing tests unless run with `--nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let directives = std::env::var(LOG_ENV_VAR)
            .or_else(|_| std::env::var("RUST_LOG"))
            .ok();

        fmt()
            .with_env_filter(resolve_filter(None, directives.as_deref()))
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Await `f`, failing the test if it outlives [`RUN_DEADLINE`].
///
/// Guards against a dispatcher or engine task that never replies.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(RUN_DEADLINE, f)
        .await
        .expect("session run exceeded test deadline")
}
