//! Refine pass
//!
//! One depth-first traversal that:
//! - folds filter predicates into the ranges of the filter's index scan
//! - marks sorts already satisfied by index order as bypassed
//! - pushes limit bounds down to index scans as row hints
//!
//! Predicates reach an index scan below their filter through Sort nodes
//! only. A Sort just reorders rows; a filter does not commute with a
//! Limit or any other operator, so scans below those are left untouched.

use std::mem;

use crate::ast::Expr;
use crate::model::IndexInfo;
use crate::observability::{Event, Severity};
use crate::plan::{ByItem, IndexRange, IndexScan, Plan, Sort, Visitor};

use super::checker::ConditionChecker;
use super::context::OptimizerContext;
use super::range::{interval_count, RangeBuilder, RangePoint};

/// Traversal state of one refine pass
pub struct Refiner<'a> {
    ctx: &'a OptimizerContext,
    builder: RangeBuilder,
    /// One frame per entered Filter, Limit or Other node. `Some` holds
    /// the conditions of a Filter while its subtree is visited; `None`
    /// blocks pushdown. Sort pushes no frame.
    frames: Vec<Option<Vec<Expr>>>,
}

impl<'a> Refiner<'a> {
    pub fn new(ctx: &'a OptimizerContext) -> Self {
        Self {
            ctx,
            builder: RangeBuilder::new(),
            frames: Vec::new(),
        }
    }

    /// Builds ranges for `scan` from the conditions of its filter, one
    /// index column at a time. Consumed predicates leave the filter.
    fn build_index_range(&mut self, scan: &mut IndexScan) {
        if !self.ctx.config().range_pushdown {
            return;
        }
        let Some(Some(conditions)) = self.frames.last_mut() else {
            return;
        };
        // Ranges are only ever built once per scan
        if !matches!(scan.ranges.as_slice(), [range] if range.is_full()) {
            return;
        }

        let max_ranges = self.ctx.config().max_index_ranges;
        let mut ranges: Option<Vec<IndexRange>> = None;

        for offset in 0..scan.index.column_count() {
            let checker = ConditionChecker::new(&scan.index, offset);
            let pushable: Vec<bool> = conditions.iter().map(|c| checker.check(c)).collect();
            if !pushable.contains(&true) {
                break;
            }

            let mut points: Option<Vec<RangePoint>> = None;
            for (condition, _) in conditions.iter().zip(&pushable).filter(|(_, p)| **p) {
                let built = self.builder.build(condition);
                points = Some(match points {
                    Some(acc) => self.builder.intersection(&acc, &built),
                    None => built,
                });
            }
            let points = points.unwrap_or_default();

            let next = match &ranges {
                Some(existing) => self.builder.append_index_ranges(existing, &points),
                None => self.builder.build_index_ranges(&points),
            };
            if next.len() > max_ranges {
                let column = column_name(&scan.index, offset);
                let intervals = interval_count(&points).to_string();
                self.ctx.log_event(
                    Severity::Info,
                    Event::IndexRangeStopped,
                    &[
                        ("index", scan.index.name.o.as_str()),
                        ("column", column.as_str()),
                        ("intervals", intervals.as_str()),
                    ],
                );
                break;
            }

            let mut keep = pushable.iter().map(|p| !p);
            conditions.retain(|_| keep.next().unwrap_or(true));
            let pushed = pushable.iter().filter(|p| **p).count();
            self.ctx.metrics().add_predicates_pushed(pushed as u64);

            let contradiction = next.is_empty();
            ranges = Some(next);
            if contradiction {
                break;
            }
        }

        if let Some(ranges) = ranges {
            scan.ranges = ranges;
            self.ctx.metrics().increment_ranges_built();
            if self.ctx.logger().enabled(Severity::Trace) {
                let count = scan.ranges.len().to_string();
                let rendered = scan
                    .ranges
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                self.ctx.log_event(
                    Severity::Trace,
                    Event::IndexRangeBuilt,
                    &[
                        ("index", scan.index.name.o.as_str()),
                        ("ranges", count.as_str()),
                        ("detail", rendered.as_str()),
                    ],
                );
            }
        }
    }

    fn sort_bypass(&self, sort: &mut Sort) {
        if !self.ctx.config().sort_bypass || sort.bypass {
            return;
        }

        let mut pinned = false;
        let Some(scan) = ordered_index_scan(&mut sort.input, &mut pinned) else {
            return;
        };
        let Some(desc) = bypass_direction(&sort.by_items, &scan.index) else {
            return;
        };
        // Flipping direction would change which rows an enclosed limit or
        // bypassed sort sees
        if desc != scan.desc && (pinned || scan.desc) {
            return;
        }

        scan.desc = desc;
        sort.bypass = true;
        self.ctx.metrics().increment_sorts_bypassed();
        self.ctx.log_event(
            Severity::Info,
            Event::SortBypassed,
            &[
                ("index", scan.index.name.o.as_str()),
                ("direction", if desc { "desc" } else { "asc" }),
            ],
        );
    }

    fn propagate_limit(&self, input: &mut Plan, bound: u64) {
        if !self.ctx.config().limit_propagation {
            return;
        }

        let scans = set_scan_limits(input, bound);
        if scans > 0 {
            self.ctx.metrics().add_limits_propagated(scans as u64);
            let bound = bound.to_string();
            let scans = scans.to_string();
            self.ctx.log_event(
                Severity::Info,
                Event::LimitPropagated,
                &[("limit", bound.as_str()), ("scans", scans.as_str())],
            );
        }
    }
}

impl Visitor for Refiner<'_> {
    fn enter(&mut self, plan: Plan) -> (Plan, bool) {
        let plan = match plan {
            Plan::Filter(mut filter) => {
                self.frames.push(Some(mem::take(&mut filter.conditions)));
                Plan::Filter(filter)
            }
            Plan::IndexScan(mut scan) => {
                self.build_index_range(&mut scan);
                Plan::IndexScan(scan)
            }
            sort @ Plan::Sort(_) => sort,
            other => {
                self.frames.push(None);
                other
            }
        };
        (plan, false)
    }

    fn leave(&mut self, plan: Plan) -> (Plan, bool) {
        let plan = match plan {
            Plan::IndexScan(mut scan) => {
                self.build_index_range(&mut scan);
                Plan::IndexScan(scan)
            }
            Plan::Filter(mut filter) => {
                if let Some(Some(conditions)) = self.frames.pop() {
                    self.ctx
                        .metrics()
                        .add_predicates_retained(conditions.len() as u64);
                    filter.conditions = conditions;
                }
                Plan::Filter(filter)
            }
            Plan::Sort(mut sort) => {
                self.sort_bypass(&mut sort);
                Plan::Sort(sort)
            }
            Plan::Limit(mut limit) => {
                self.frames.pop();
                let bound = limit.row_bound();
                self.propagate_limit(&mut limit.input, bound);
                Plan::Limit(limit)
            }
            other => {
                self.frames.pop();
                other
            }
        };
        (plan, true)
    }
}

/// Follows the sort input down to the index scan whose order it would
/// observe. `pinned` is set when a limit or an already bypassed sort sits
/// in between.
fn ordered_index_scan<'p>(plan: &'p mut Plan, pinned: &mut bool) -> Option<&'p mut IndexScan> {
    match plan {
        Plan::IndexScan(scan) => Some(scan),
        Plan::Filter(filter) => ordered_index_scan(&mut filter.input, pinned),
        Plan::Limit(limit) => {
            *pinned = true;
            ordered_index_scan(&mut limit.input, pinned)
        }
        Plan::Sort(sort) if sort.bypass => {
            *pinned = true;
            ordered_index_scan(&mut sort.input, pinned)
        }
        _ => None,
    }
}

/// Returns the scan direction satisfying `by_items`, or `None` if the
/// keys are not a uniform-direction prefix of the index columns.
fn bypass_direction(by_items: &[ByItem], index: &IndexInfo) -> Option<bool> {
    let first = by_items.first()?;
    if by_items.len() > index.column_count() {
        return None;
    }

    for (offset, item) in by_items.iter().enumerate() {
        if item.desc != first.desc {
            return None;
        }
        let column = item.expr.as_column()?;
        let index_column = index.column(offset)?;
        if !column.table.matches(&index.table) || !index_column.name.matches(&column.column) {
            return None;
        }
    }
    Some(first.desc)
}

/// Sets the row hint on every index scan under `plan` that is not
/// governed by a nearer limit. Returns the number of scans updated.
fn set_scan_limits(plan: &mut Plan, bound: u64) -> usize {
    match plan {
        Plan::IndexScan(scan) => {
            scan.limit = Some(bound);
            1
        }
        Plan::Limit(_) => 0,
        Plan::Filter(filter) => set_scan_limits(&mut filter.input, bound),
        Plan::Sort(sort) => set_scan_limits(&mut sort.input, bound),
        Plan::Other(other) => other
            .children
            .iter_mut()
            .map(|child| set_scan_limits(child, bound))
            .sum(),
    }
}

fn column_name(index: &IndexInfo, offset: usize) -> String {
    index
        .column(offset)
        .map(|c| c.name.to_string())
        .unwrap_or_default()
}
