// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::dag::{OpKind, OpType};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [session]
/// dispatch_timeout_ms = 30000
/// log_key_reuse = true
///
/// [op.g]
/// type = "create_graph"
/// config = { directed = true }
///
/// [op.ctx]
/// type = "run_app"
/// after = ["g"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub session: SessionSection,

    /// Operation definitions keyed by operation key.
    #[serde(default)]
    pub op: BTreeMap<String, OpConfig>,
}

/// Validated configuration. Only constructible through
/// `ConfigFile::try_from(RawConfigFile)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub session: SessionSection,
    pub op: BTreeMap<String, OpConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(session: SessionSection, op: BTreeMap<String, OpConfig>) -> Self {
        Self { session, op }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionSection {
    /// Upper bound for a single dispatch in milliseconds; `0` disables it.
    #[serde(default = "default_dispatch_timeout_ms")]
    pub dispatch_timeout_ms: u64,

    /// Warn when an already evaluated key is redefined.
    #[serde(default = "default_log_key_reuse")]
    pub log_key_reuse: bool,
}

fn default_dispatch_timeout_ms() -> u64 {
    30_000
}

fn default_log_key_reuse() -> bool {
    true
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            dispatch_timeout_ms: default_dispatch_timeout_ms(),
            log_key_reuse: default_log_key_reuse(),
        }
    }
}

/// `[op.<key>]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct OpConfig {
    #[serde(rename = "type")]
    pub op_type: OpType,

    /// Parent keys: this operation depends on every operation listed here.
    #[serde(default)]
    pub after: Vec<String>,

    /// Overrides the kind derived from `type`.
    #[serde(default)]
    pub kind: Option<OpKind>,

    /// Opaque engine configuration, passed through untouched.
    #[serde(default)]
    pub config: toml::Table,
}

impl OpConfig {
    pub fn new(op_type: OpType) -> Self {
        Self {
            op_type,
            after: Vec::new(),
            kind: None,
            config: toml::Table::new(),
        }
    }

    pub fn effective_kind(&self) -> OpKind {
        self.kind.unwrap_or_else(|| self.op_type.default_kind())
    }
}
