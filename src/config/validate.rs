// src/config/validate.rs

use std::collections::BTreeMap;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::model::{ConfigFile, OpConfig, RawConfigFile};
use crate::errors::{LazydagError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = LazydagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.session, raw.op))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_keys(cfg)?;
    validate_op_dependencies(cfg)?;
    definition_order(&cfg.op)?;
    Ok(())
}

fn validate_keys(cfg: &RawConfigFile) -> Result<()> {
    if cfg.op.keys().any(|key| key.trim().is_empty()) {
        return Err(LazydagError::ConfigError(
            "operation keys must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_op_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (key, op) in cfg.op.iter() {
        for parent in op.after.iter() {
            if parent == key {
                return Err(LazydagError::ConfigError(format!(
                    "op '{}' cannot depend on itself in `after`",
                    key
                )));
            }
            if !cfg.op.contains_key(parent) {
                return Err(LazydagError::ConfigError(format!(
                    "op '{}' has unknown dependency '{}' in `after`",
                    key, parent
                )));
            }
        }
    }
    Ok(())
}

/// Order in which the configured operations can be registered: every
/// operation comes after all of its parents. Fails on cycles.
pub(crate) fn definition_order(ops: &BTreeMap<String, OpConfig>) -> Result<Vec<String>> {
    // Edge direction: parent -> op.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for key in ops.keys() {
        graph.add_node(key.as_str());
    }

    for (key, op) in ops.iter() {
        for parent in op.after.iter() {
            graph.add_edge(parent.as_str(), key.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(order) => Ok(order.into_iter().map(str::to_string).collect()),
        Err(cycle) => Err(LazydagError::DagCycle(format!(
            "cycle detected in op graph involving '{}'",
            cycle.node_id()
        ))),
    }
}
