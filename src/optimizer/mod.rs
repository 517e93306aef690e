//! Plan refinement
//!
//! `refine` runs once per compiled plan, after logical planning and
//! before cost-based selection. It never fails: predicates it cannot
//! use stay in their filter.

mod checker;
mod context;
mod range;
mod refiner;

pub use checker::ConditionChecker;
pub use context::OptimizerContext;
pub use range::{RangeBuilder, RangePoint};
pub use refiner::Refiner;

use std::mem;

use crate::observability::{Event, Severity};
use crate::plan::Plan;

/// Rewrites `plan` in place: index ranges, sort bypass and limit hints.
pub fn refine(ctx: &OptimizerContext, plan: &mut Plan) {
    ctx.log_event(Severity::Trace, Event::RefineBegin, &[("root", plan.name())]);

    let root = mem::replace(plan, Plan::other("Placeholder", Vec::new()));
    let mut refiner = Refiner::new(ctx);
    let (root, _) = root.accept(&mut refiner);
    *plan = root;

    ctx.metrics().increment_refinements();
    let scans = plan.index_scans().len().to_string();
    ctx.log_event(Severity::Trace, Event::RefineComplete, &[("index_scans", scans.as_str())]);
}
