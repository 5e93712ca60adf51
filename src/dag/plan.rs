// src/dag/plan.rs

//! Wire-level execution plan.
//!
//! A plan is an ordered list of serialized operations. Order is part of the
//! contract: a receiving engine may process the list strictly front to back.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dag::op::{EngineKind, OpKind, OpRef, OpType};
use crate::errors::Result;

/// One serialized operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireOp {
    pub key: String,
    pub op_type: OpType,
    pub kind: OpKind,
    /// Keys of all parents, evaluated or not.
    pub parents: Vec<String>,
    #[serde(default)]
    pub config: Value,
}

impl WireOp {
    pub fn engine(&self) -> EngineKind {
        self.op_type.engine()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPlan {
    ops: Vec<WireOp>,
}

/// A maximal run of consecutive plan entries routed to the same engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanSegment<'a> {
    pub engine: EngineKind,
    pub ops: &'a [WireOp],
}

impl ExecutionPlan {
    pub fn from_ops<'a>(ops: impl IntoIterator<Item = &'a OpRef>) -> Self {
        Self {
            ops: ops.into_iter().map(|op| op.to_wire()).collect(),
        }
    }

    pub fn ops(&self) -> &[WireOp] {
        &self.ops
    }

    pub fn keys(&self) -> Vec<&str> {
        self.ops.iter().map(|op| op.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Split the plan into per-engine segments without reordering anything.
    ///
    /// A transport that talks to several engines sends the segments one after
    /// another; concatenating them gives back the original plan.
    pub fn segments(&self) -> Vec<PlanSegment<'_>> {
        let mut segments = Vec::new();
        let mut start = 0;

        for i in 1..=self.ops.len() {
            let boundary = i == self.ops.len() || self.ops[i].engine() != self.ops[start].engine();
            if boundary {
                segments.push(PlanSegment {
                    engine: self.ops[start].engine(),
                    ops: &self.ops[start..i],
                });
                start = i;
            }
        }

        segments
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dag::op::Operation;
    use serde_json::json;

    fn op(key: &str, op_type: OpType, parents: Vec<OpRef>) -> OpRef {
        Operation::new(key, op_type, parents, json!({})).into_ref()
    }

    #[test]
    fn wire_op_uses_snake_case_type_and_parent_keys() {
        let g = op("g", OpType::CreateGraph, vec![]);
        let app = op("app", OpType::RunApp, vec![g.clone()]);

        let plan = ExecutionPlan::from_ops([&g, &app]);
        let value = serde_json::to_value(&plan).unwrap();

        assert_eq!(value["ops"][1]["op_type"], "run_app");
        assert_eq!(value["ops"][1]["kind"], "ordinary");
        assert_eq!(value["ops"][1]["parents"], json!(["g"]));
    }

    #[test]
    fn segments_split_on_engine_changes_only() {
        let g = op("g", OpType::CreateGraph, vec![]);
        let p = op("p", OpType::ProjectGraph, vec![g.clone()]);
        let gi = op("gi", OpType::CreateInteractiveInstance, vec![g.clone()]);
        let q = op("q", OpType::GremlinQuery, vec![gi.clone()]);
        let ctx = op("ctx", OpType::RunApp, vec![p.clone()]);

        let plan = ExecutionPlan::from_ops([&g, &p, &gi, &q, &ctx]);
        let segments = plan.segments();

        let shape: Vec<(EngineKind, usize)> =
            segments.iter().map(|s| (s.engine, s.ops.len())).collect();
        assert_eq!(
            shape,
            vec![
                (EngineKind::Analytical, 2),
                (EngineKind::Interactive, 2),
                (EngineKind::Analytical, 1),
            ]
        );
    }

    #[test]
    fn empty_plan_has_no_segments() {
        assert!(ExecutionPlan::default().segments().is_empty());
    }

    #[test]
    fn json_round_trip_preserves_order() {
        let a = op("a", OpType::CreateGraph, vec![]);
        let b = op("b", OpType::AddLabels, vec![a.clone()]);
        let plan = ExecutionPlan::from_ops([&a, &b]);

        let decoded = ExecutionPlan::from_json(&plan.to_json().unwrap()).unwrap();
        assert_eq!(decoded.keys(), vec!["a", "b"]);
        assert_eq!(decoded, plan);
    }
}
