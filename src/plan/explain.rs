//! Explain output for plan trees
//!
//! Produces deterministic, human-readable output: one line per node,
//! indented by depth, children in order.

use std::fmt;

use serde::Serialize;

use super::node::Plan;

/// One rendered plan node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainNode {
    /// Distance from the root
    pub depth: usize,
    /// Operator name
    pub operator: String,
    /// Operator annotations, in a fixed order
    pub details: Vec<String>,
}

/// Explain plan output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExplainPlan {
    /// Nodes in pre-order
    pub nodes: Vec<ExplainNode>,
}

impl ExplainPlan {
    pub fn from_plan(plan: &Plan) -> Self {
        let mut nodes = Vec::new();
        collect(plan, 0, &mut nodes);
        Self { nodes }
    }

    /// Serializes the explain output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

fn collect(plan: &Plan, depth: usize, nodes: &mut Vec<ExplainNode>) {
    nodes.push(ExplainNode {
        depth,
        operator: plan.name().to_string(),
        details: details(plan),
    });
    for child in plan.children() {
        collect(child, depth + 1, nodes);
    }
}

fn details(plan: &Plan) -> Vec<String> {
    let mut details = Vec::new();
    match plan {
        Plan::Filter(filter) => {
            let conditions: Vec<String> = filter.conditions.iter().map(|c| c.to_string()).collect();
            details.push(format!("conditions: [{}]", conditions.join(", ")));
        }
        Plan::IndexScan(scan) => {
            details.push(format!("index: {}", scan.index.name));
            let ranges: Vec<String> = scan.ranges.iter().map(|r| r.to_string()).collect();
            details.push(format!("ranges: [{}]", ranges.join(", ")));
            if scan.desc {
                details.push("desc".to_string());
            }
            if let Some(limit) = scan.limit {
                details.push(format!("limit: {}", limit));
            }
            if let Some(cost) = scan.cost {
                details.push(format!("cost: {:.2}", cost));
            }
        }
        Plan::Sort(sort) => {
            let keys: Vec<String> = sort
                .by_items
                .iter()
                .map(|item| format!("{} {}", item.expr, if item.desc { "DESC" } else { "ASC" }))
                .collect();
            details.push(format!("by: [{}]", keys.join(", ")));
            if sort.bypass {
                details.push("bypass".to_string());
            }
        }
        Plan::Limit(limit) => {
            details.push(format!("count: {}", limit.count));
            if limit.offset > 0 {
                details.push(format!("offset: {}", limit.offset));
            }
        }
        Plan::Other(_) => {}
    }
    details
}

impl fmt::Display for ExplainPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== EXPLAIN PLAN ===")?;
        for node in &self.nodes {
            write!(f, "{}{}", "  ".repeat(node.depth), node.operator)?;
            if !node.details.is_empty() {
                write!(f, " ({})", node.details.join("; "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
