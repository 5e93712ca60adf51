// tests/config_loading.rs

use std::io::Write;
use std::time::Duration;

use lazydag::config::{define_ops, load_and_validate, ConfigFile};
use lazydag::dag::{OpKind, OpType};
use lazydag::errors::LazydagError;
use lazydag::session::{DryRunDispatcher, Session, SessionOptions};
use lazydag_test_utils::builders::{ConfigFileBuilder, OpConfigBuilder};
use lazydag_test_utils::{init_tracing, with_timeout};
use serde_json::json;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    let file = write_config(
        r#"
[op.A]
type = "create_graph"
after = ["B"]

[op.B]
type = "add_labels"
after = ["A"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(LazydagError::DagCycle(msg)) => {
            assert!(msg.contains("cycle detected"));
            assert!(msg.contains("A") || msg.contains("B"));
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_unknown_dependency_returns_config_error() {
    let file = write_config(
        r#"
[op.A]
type = "run_app"
after = ["NonExistent"]
"#,
    );

    match load_and_validate(file.path()) {
        Err(LazydagError::ConfigError(msg)) => {
            assert!(msg.contains("unknown dependency"));
            assert!(msg.contains("NonExistent"));
        }
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_self_dependency_returns_config_error() {
    let raw = ConfigFileBuilder::new()
        .with_op("A", OpConfigBuilder::new(OpType::RunApp).after("A").build())
        .raw();

    match ConfigFile::try_from(raw) {
        Err(LazydagError::ConfigError(msg)) => assert!(msg.contains("itself")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn test_unknown_op_type_is_a_toml_error() {
    let file = write_config(
        r#"
[op.A]
type = "teleport"
"#,
    );

    assert!(matches!(
        load_and_validate(file.path()),
        Err(LazydagError::TomlError(_))
    ));
}

#[test]
fn session_section_defaults_and_overrides() {
    let file = write_config(
        r#"
[session]
dispatch_timeout_ms = 0
log_key_reuse = false
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();
    let options = SessionOptions::from(&cfg.session);
    assert_eq!(options.dispatch_timeout, None);
    assert!(!options.log_key_reuse);

    let defaults = SessionOptions::default();
    assert_eq!(defaults.dispatch_timeout, Some(Duration::from_secs(30)));
    assert!(defaults.log_key_reuse);
}

#[tokio::test]
async fn configured_ops_are_defined_parents_first() {
    init_tracing();
    // Keys sort opposite to dependency order to make sure definition follows
    // the DAG, not the table order.
    let file = write_config(
        r#"
[op.z_graph]
type = "create_graph"
config = { directed = true }

[op.m_labels]
type = "add_labels"
after = ["z_graph"]
config = { path = "edges.csv" }

[op.a_ctx]
type = "run_app"
after = ["m_labels"]

[op.unload]
type = "unload_graph"
after = ["z_graph"]
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    let mut session = Session::new(DryRunDispatcher, SessionOptions::from(&cfg.session));
    let handles = define_ops(&cfg, &mut session).unwrap();

    let full = session.graph().to_execution_plan();
    let keys = full.keys();
    let pos = |key: &str| keys.iter().position(|k| *k == key).unwrap();
    assert_eq!(keys.len(), 4);
    assert!(pos("z_graph") < pos("m_labels"));
    assert!(pos("m_labels") < pos("a_ctx"));
    assert!(pos("z_graph") < pos("unload"));

    let graph_op = handles["z_graph"].op().unwrap();
    assert_eq!(graph_op.payload(), &json!({ "directed": true }));
    assert_eq!(handles["unload"].op().unwrap().kind(), OpKind::Leaf);

    let plan = session
        .graph()
        .extract_subgraph_for(&["a_ctx"])
        .unwrap();
    assert_eq!(plan.keys(), vec!["z_graph", "m_labels", "a_ctx"]);

    let echoed = with_timeout(session.run(&[&handles["a_ctx"]])).await.unwrap();
    assert_eq!(echoed, serde_json::to_value(&plan).unwrap());
    assert!(handles["z_graph"].is_evaluated());
}

#[test]
fn kind_override_from_config() {
    let cfg = ConfigFileBuilder::new()
        .with_op("g", OpConfigBuilder::new(OpType::CreateGraph).build())
        .with_op(
            "q",
            OpConfigBuilder::new(OpType::RunApp)
                .after("g")
                .kind(OpKind::Leaf)
                .config("algo", "sssp")
                .build(),
        )
        .build();

    let mut session = Session::new(DryRunDispatcher, SessionOptions::default());
    let handles = define_ops(&cfg, &mut session).unwrap();

    let plan = session.graph().extract_subgraph_for(&["q"]).unwrap();
    assert_eq!(plan.keys(), vec!["q"]);
    assert_eq!(handles["q"].op().unwrap().payload()["algo"], "sssp");
}
