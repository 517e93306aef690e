//! Cost hook
//!
//! Attaches an estimated cost to index scans. Never changes plan
//! structure, ranges or sort flags; every other node passes through.

use super::node::Plan;
use super::visitor::Visitor;

/// Row count assumed for a table without statistics
pub const DEFAULT_ROW_COUNT: f64 = 10000.0;
/// Cost of reading one row in a full scan
pub const ROW_COST: f64 = 1.0;
/// Cost of fetching one row through an index
pub const INDEX_COST: f64 = 2.0;
/// Per-comparison cost of sorting
pub const SORT_COST: f64 = 2.0;

/// Cost of sorting `rows` rows: `rows × log2(rows) × SORT_COST`
pub fn sort_cost(rows: f64) -> f64 {
    if rows <= 1.0 {
        return 0.0;
    }
    rows * rows.log2() * SORT_COST
}

/// Cost of a full table scan over `rows` rows
pub fn scan_cost(rows: f64) -> f64 {
    rows * ROW_COST
}

/// Visitor attaching `IndexScan.cost`
#[derive(Debug, Default)]
pub struct CostEstimator {
    total: f64,
}

impl CostEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of the costs attached so far
    pub fn total(&self) -> f64 {
        self.total
    }
}

impl Visitor for CostEstimator {
    fn enter(&mut self, plan: Plan) -> (Plan, bool) {
        (plan, false)
    }

    fn leave(&mut self, plan: Plan) -> (Plan, bool) {
        match plan {
            Plan::IndexScan(mut scan) => {
                let rows = if scan.ranges.is_empty() {
                    0.0
                } else {
                    scan.limit
                        .map(|limit| (limit as f64).min(DEFAULT_ROW_COUNT))
                        .unwrap_or(DEFAULT_ROW_COUNT)
                };
                let cost = rows * INDEX_COST;
                scan.cost = Some(cost);
                self.total += cost;
                (Plan::IndexScan(scan), true)
            }
            other => (other, true),
        }
    }
}

/// Runs the cost hook over `plan`. Returns the summed index scan cost.
pub fn estimate_cost(plan: &mut Plan) -> f64 {
    let root = std::mem::replace(plan, Plan::other("Placeholder", Vec::new()));
    let mut estimator = CostEstimator::new();
    let (root, _) = root.accept(&mut estimator);
    *plan = root;
    estimator.total()
}
