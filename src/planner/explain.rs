//! Explain output
//!
//! Renders a plan tree deterministically, one node per line, children
//! indented under their parent, with per-kind node counts.

use std::collections::BTreeMap;
use std::fmt;

use serde_json::{json, Value};

use crate::query::{Plan, PlanKind};

use super::errors::PlannerError;

#[derive(Debug, Clone)]
pub struct ExplainPlan {
    /// Whether planning succeeded
    pub accepted: bool,
    /// (depth, label) in pre-order
    pub nodes: Vec<(usize, String)>,
    /// Output fields of the root
    pub fields: Vec<String>,
    /// Node count per kind
    pub counts: BTreeMap<PlanKind, usize>,
    /// Rejection error code (if rejected)
    pub rejection_code: Option<String>,
    /// Rejection reason (if rejected)
    pub rejection_reason: Option<String>,
}

impl ExplainPlan {
    pub fn from_plan(plan: &dyn Plan) -> Self {
        let mut explain = Self {
            accepted: true,
            nodes: Vec::new(),
            fields: plan.schema().fields().map(String::from).collect(),
            counts: BTreeMap::new(),
            rejection_code: None,
            rejection_reason: None,
        };
        explain.visit(plan, 0);
        explain
    }

    pub fn from_error(err: &PlannerError) -> Self {
        Self {
            accepted: false,
            nodes: Vec::new(),
            fields: Vec::new(),
            counts: BTreeMap::new(),
            rejection_code: Some(err.code().code().to_string()),
            rejection_reason: Some(err.message().to_string()),
        }
    }

    fn visit(&mut self, plan: &dyn Plan, depth: usize) {
        self.nodes.push((depth, plan.describe()));
        *self.counts.entry(plan.kind()).or_insert(0) += 1;
        for child in plan.children() {
            self.visit(child, depth + 1);
        }
    }

    /// Number of nodes of `kind`
    pub fn count(&self, kind: PlanKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> Value {
        let counts: BTreeMap<&str, usize> =
            self.counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        json!({
            "accepted": self.accepted,
            "fields": self.fields,
            "counts": counts,
            "plan": self.to_string(),
            "rejection_code": self.rejection_code,
            "rejection_reason": self.rejection_reason,
        })
    }
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;

        if self.accepted {
            writeln!(f, "Status: ACCEPTED")?;
            for (depth, label) in &self.nodes {
                writeln!(f, "{}{}", "  ".repeat(*depth), label)?;
            }
        } else {
            writeln!(f, "Status: REJECTED")?;
            if let Some(code) = &self.rejection_code {
                writeln!(f, "Error Code: {}", code)?;
            }
            if let Some(reason) = &self.rejection_reason {
                writeln!(f, "Reason: {}", reason)?;
            }
        }

        Ok(())
    }
}
