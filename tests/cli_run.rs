// tests/cli_run.rs

use std::io::Write;

use clap::Parser;
use lazydag::cli::CliArgs;
use lazydag::config::DEFAULT_CONFIG_FILE;
use lazydag::errors::LazydagError;
use lazydag_test_utils::{init_tracing, with_timeout};
use tempfile::NamedTempFile;

const CONFIG: &str = r#"
[op.g]
type = "create_graph"

[op.ctx]
type = "run_app"
after = ["g"]
"#;

fn write_config() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", CONFIG).unwrap();
    file
}

fn args(file: &NamedTempFile, extra: &[&str]) -> CliArgs {
    let path = file.path().to_str().unwrap();
    let mut argv = vec!["lazydag", "--config", path];
    argv.extend_from_slice(extra);
    CliArgs::try_parse_from(argv).unwrap()
}

#[test]
fn config_defaults_to_file_in_working_directory() {
    let parsed = CliArgs::try_parse_from(["lazydag", "--target", "ctx"]).unwrap();
    assert_eq!(parsed.config, DEFAULT_CONFIG_FILE);
    assert_eq!(parsed.targets, vec!["ctx"]);
}

#[tokio::test]
async fn target_run_prints_plan() {
    init_tracing();
    let file = write_config();

    let result = with_timeout(lazydag::run(args(&file, &["--target", "ctx"]))).await;

    assert!(result.is_ok(), "run failed: {result:?}");
}

#[tokio::test]
async fn unknown_evaluated_key_names_the_flag() {
    init_tracing();
    let file = write_config();

    let err = with_timeout(lazydag::run(args(
        &file,
        &["--evaluated", "nope", "--target", "ctx"],
    )))
    .await
    .unwrap_err();

    match err.downcast_ref::<LazydagError>() {
        Some(LazydagError::ConfigError(msg)) => {
            assert!(msg.contains("--evaluated"), "{msg}");
            assert!(msg.contains("nope"), "{msg}");
        }
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_target_key_names_the_flag() {
    let file = write_config();

    let err = with_timeout(lazydag::run(args(&file, &["--target", "missing"])))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LazydagError>(),
        Some(LazydagError::ConfigError(msg)) if msg.contains("--target")
    ));
}
