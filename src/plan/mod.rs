//! Logical plan surface
//!
//! - Plan nodes and their traversal protocol
//! - Composite index ranges
//! - Cost hook
//! - Explain output

pub mod cost;
mod explain;
mod node;
mod range;
mod visitor;

pub use cost::{estimate_cost, CostEstimator};
pub use explain::{ExplainNode, ExplainPlan};
pub use node::{ByItem, Filter, IndexScan, Limit, Other, Plan, Sort};
pub use range::{ColumnRange, IndexRange};
pub use visitor::Visitor;
