// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod errors;
pub mod logging;
pub mod session;

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::{define_ops, load_and_validate};
use crate::dag::{ExecutionPlan, Handle};
use crate::errors::LazydagError;
use crate::session::{DryRunDispatcher, Session, SessionOptions};

/// High-level entry point used by `main.rs`.
///
/// Loads the config, registers its operations with a fresh session, marks
/// the `--evaluated` keys, then prints either the full graph or the batch a
/// dispatch for `--target` keys would ship.
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)?;

    let mut session = Session::new(DryRunDispatcher, SessionOptions::from(&cfg.session));
    let handles = define_ops(&cfg, &mut session)?;
    info!(ops = handles.len(), session = %session.id(), "graph loaded");

    let evaluated = lookup(&handles, &args.evaluated, "--evaluated")?;
    session.mark_handles_evaluated(&evaluated)?;

    let plan = if args.full {
        session.graph().to_execution_plan()
    } else {
        let targets = lookup(&handles, &args.targets, "--target")?;
        let value = session.run(&targets).await?;
        serde_json::from_value::<ExecutionPlan>(value)?
    };

    if args.segments {
        print_segments(&plan);
    } else {
        println!("{}", plan.to_json_pretty()?);
    }

    session.close();
    debug!("plan printed");
    Ok(())
}

/// Resolve keys given on the command line; `flag` names the option in errors.
fn lookup<'a>(
    handles: &'a BTreeMap<String, Handle>,
    keys: &[String],
    flag: &str,
) -> Result<Vec<&'a Handle>> {
    keys.iter()
        .map(|key| {
            handles.get(key).ok_or_else(|| {
                LazydagError::ConfigError(format!("{flag} names undefined operation '{key}'"))
                    .into()
            })
        })
        .collect()
}

fn print_segments(plan: &ExecutionPlan) {
    for segment in plan.segments() {
        let keys: Vec<&str> = segment.ops.iter().map(|op| op.key.as_str()).collect();
        println!("{:?}: {}", segment.engine, keys.join(" "));
    }
}
