#![allow(dead_code)]

use lazydag::dag::{Handle, OpType};
use lazydag::session::{Session, SessionOptions};
use lazydag_test_utils::builders::OpBuilder;
use lazydag_test_utils::fake_dispatcher::FakeDispatcher;

/// Fresh session backed by a `FakeDispatcher`; the returned clone shares
/// its dispatch log.
pub fn fake_session() -> (Session<FakeDispatcher>, FakeDispatcher) {
    let dispatcher = FakeDispatcher::new();
    let session = Session::new(dispatcher.clone(), SessionOptions::default());
    (session, dispatcher)
}

/// Register an ordinary op named `key` depending on `parents`.
pub fn add_op(session: &mut Session<FakeDispatcher>, key: &str, parents: &[&Handle]) -> Handle {
    let mut builder = OpBuilder::new(key);
    for parent in parents {
        builder = builder.parent(parent.op().unwrap());
    }
    session.add(builder.build()).unwrap()
}

/// Register a leaf op (resource teardown) named `key`.
pub fn add_leaf(session: &mut Session<FakeDispatcher>, key: &str, parents: &[&Handle]) -> Handle {
    let mut builder = OpBuilder::new(key).op_type(OpType::UnloadGraph);
    for parent in parents {
        builder = builder.parent(parent.op().unwrap());
    }
    session.add(builder.build()).unwrap()
}

pub fn keys(plan: &lazydag::dag::ExecutionPlan) -> Vec<&str> {
    plan.keys()
}
