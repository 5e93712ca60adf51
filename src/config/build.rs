// src/config/build.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::config::validate::definition_order;
use crate::dag::{Handle, Operation};
use crate::errors::{LazydagError, Result};
use crate::session::{Dispatcher, Session};

/// Register every configured operation with `session`, parents first.
///
/// Returns the handles keyed by operation key.
pub fn define_ops<D: Dispatcher>(
    cfg: &ConfigFile,
    session: &mut Session<D>,
) -> Result<BTreeMap<String, Handle>> {
    let order = definition_order(&cfg.op)?;

    let mut handles: BTreeMap<String, Handle> = BTreeMap::new();

    for key in order {
        let Some(op_cfg) = cfg.op.get(&key) else {
            continue;
        };

        let mut parents = Vec::with_capacity(op_cfg.after.len());
        for parent in op_cfg.after.iter() {
            let handle = handles.get(parent).ok_or_else(|| {
                LazydagError::ConfigError(format!("op '{}' defined before its parent '{}'", key, parent))
            })?;
            parents.push(handle.op()?.clone());
        }

        let payload = serde_json::to_value(&op_cfg.config)?;
        let op = Operation::new(key.as_str(), op_cfg.op_type, parents, payload)
            .with_kind(op_cfg.effective_kind());

        debug!(key = %key, op_type = %op_cfg.op_type, "defining configured op");
        let handle = session.add(op)?;
        handles.insert(key, handle);
    }

    Ok(handles)
}
