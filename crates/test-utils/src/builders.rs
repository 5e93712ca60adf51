#![allow(dead_code)]

use lazydag::config::{ConfigFile, OpConfig, RawConfigFile, SessionSection};
use lazydag::dag::{OpKind, OpRef, OpType, Operation};
use serde_json::{json, Value};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_op(mut self, key: &str, op: OpConfig) -> Self {
        self.config.op.insert(key.to_string(), op);
        self
    }

    pub fn with_session(mut self, session: SessionSection) -> Self {
        self.config.session = session;
        self
    }

    pub fn with_dispatch_timeout_ms(mut self, ms: u64) -> Self {
        self.config.session.dispatch_timeout_ms = ms;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `OpConfig`.
pub struct OpConfigBuilder {
    op: OpConfig,
}

impl OpConfigBuilder {
    pub fn new(op_type: OpType) -> Self {
        Self {
            op: OpConfig::new(op_type),
        }
    }

    pub fn after(mut self, parent: &str) -> Self {
        self.op.after.push(parent.to_string());
        self
    }

    pub fn kind(mut self, kind: OpKind) -> Self {
        self.op.kind = Some(kind);
        self
    }

    pub fn config(mut self, key: &str, value: impl Into<toml::Value>) -> Self {
        self.op.config.insert(key.to_string(), value.into());
        self
    }

    pub fn build(self) -> OpConfig {
        self.op
    }
}

/// Builder for standalone `Operation`s.
pub struct OpBuilder {
    key: String,
    op_type: OpType,
    parents: Vec<OpRef>,
    payload: Value,
    kind: Option<OpKind>,
}

impl OpBuilder {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            op_type: OpType::RunApp,
            parents: Vec::new(),
            payload: json!({}),
            kind: None,
        }
    }

    pub fn op_type(mut self, op_type: OpType) -> Self {
        self.op_type = op_type;
        self
    }

    pub fn parent(mut self, parent: &OpRef) -> Self {
        self.parents.push(parent.clone());
        self
    }

    pub fn leaf(mut self) -> Self {
        self.kind = Some(OpKind::Leaf);
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    pub fn build(self) -> Operation {
        let op = Operation::new(self.key, self.op_type, self.parents, self.payload);
        match self.kind {
            Some(kind) => op.with_kind(kind),
            None => op,
        }
    }

    pub fn into_ref(self) -> OpRef {
        self.build().into_ref()
    }
}
