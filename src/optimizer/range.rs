//! Range building and interval algebra
//!
//! A column's eligible value set is a sorted sequence of `RangePoint`s
//! taken two at a time: `[start, end]`. Sequences produced here are always
//! sorted, non-overlapping, and coalesced where intervals touch.
//!
//! # Point order
//!
//! Ascending by value. At equal value the position rank decides:
//!
//! 1. exclusive end   `v)` sits just below `v`
//! 2. inclusive start `[v`
//! 3. inclusive end   `v]`
//! 4. exclusive start `(v` sits just above `v`
//!
//! With this order union and intersection are a single linear merge of
//! the two inputs followed by a depth sweep.

use std::cmp::Ordering;

use serde_json::Value;

use crate::ast::{BinaryOp, Datum, Expr, UnaryOp};
use crate::plan::{ColumnRange, IndexRange};

/// One endpoint of an interval on a single column
#[derive(Debug, Clone, PartialEq)]
pub struct RangePoint {
    pub value: Datum,
    /// Endpoint value itself is excluded
    pub excl: bool,
    /// Start (true) or end (false) of the interval
    pub start: bool,
}

impl RangePoint {
    pub fn start(value: Datum, excl: bool) -> Self {
        Self {
            value,
            excl,
            start: true,
        }
    }

    pub fn end(value: Datum, excl: bool) -> Self {
        Self {
            value,
            excl,
            start: false,
        }
    }

    fn rank(&self) -> u8 {
        match (self.start, self.excl) {
            (false, true) => 0,
            (true, false) => 1,
            (false, false) => 2,
            (true, true) => 3,
        }
    }

    /// Position of the point on the extended value line
    pub fn cmp_point(&self, other: &RangePoint) -> Ordering {
        self.value
            .cmp_datum(&other.value)
            .then_with(|| self.rank().cmp(&other.rank()))
    }
}

/// Builds range points from pushable conditions and combines them.
///
/// Stateless; one builder per optimizer invocation.
#[derive(Debug, Default, Clone, Copy)]
pub struct RangeBuilder;

impl RangeBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Builds the interval set of a condition already known to be
    /// pushable for the current column.
    pub fn build(&self, expr: &Expr) -> Vec<RangePoint> {
        match expr {
            Expr::Paren(inner) => self.build(inner),
            Expr::Unary {
                op: UnaryOp::Not,
                operand,
            } => self.complement(&self.build(operand)),
            Expr::Binary {
                op: BinaryOp::Or,
                left,
                right,
            } => self.union(&self.build(left), &self.build(right)),
            Expr::Binary { op, left, right } if op.is_comparison() => {
                self.build_comparison(*op, left, right)
            }
            Expr::InList {
                list, negated, ..
            } => {
                let points = self.build_in_list(list);
                if *negated {
                    self.complement(&points)
                } else {
                    points
                }
            }
            _ => full_range(),
        }
    }

    fn build_comparison(&self, op: BinaryOp, left: &Expr, right: &Expr) -> Vec<RangePoint> {
        // Normalize to `column op value`
        let (op, value) = if let Some(value) = right.static_value() {
            (op, value)
        } else if let Some(value) = left.static_value() {
            (op.flipped(), value)
        } else {
            return full_range();
        };
        let v = || Datum::Value(value.clone());

        match op {
            BinaryOp::Eq => vec![RangePoint::start(v(), false), RangePoint::end(v(), false)],
            BinaryOp::Ne => vec![
                RangePoint::start(Datum::Min, false),
                RangePoint::end(v(), true),
                RangePoint::start(v(), true),
                RangePoint::end(Datum::Max, false),
            ],
            BinaryOp::Lt => vec![RangePoint::start(Datum::Min, false), RangePoint::end(v(), true)],
            BinaryOp::Le => vec![RangePoint::start(Datum::Min, false), RangePoint::end(v(), false)],
            BinaryOp::Gt => vec![RangePoint::start(v(), true), RangePoint::end(Datum::Max, false)],
            BinaryOp::Ge => vec![RangePoint::start(v(), false), RangePoint::end(Datum::Max, false)],
            _ => full_range(),
        }
    }

    fn build_in_list(&self, list: &[Expr]) -> Vec<RangePoint> {
        let mut values: Vec<&Value> = list.iter().filter_map(Expr::static_value).collect();
        values.sort_by(|a, b| crate::ast::compare_values(a, b));
        values.dedup_by(|a, b| crate::ast::compare_values(a, b) == Ordering::Equal);

        let mut points = Vec::with_capacity(values.len() * 2);
        for value in values {
            points.push(RangePoint::start(Datum::Value(value.clone()), false));
            points.push(RangePoint::end(Datum::Value(value.clone()), false));
        }
        points
    }

    /// Pointwise AND of two interval sets. May be empty.
    pub fn intersection(&self, a: &[RangePoint], b: &[RangePoint]) -> Vec<RangePoint> {
        self.merge(a, b, 2)
    }

    /// Pointwise OR of two interval sets.
    pub fn union(&self, a: &[RangePoint], b: &[RangePoint]) -> Vec<RangePoint> {
        self.merge(a, b, 1)
    }

    /// Complement within the column domain `[Min, Max]`.
    pub fn complement(&self, points: &[RangePoint]) -> Vec<RangePoint> {
        let mut complemented = Vec::with_capacity(points.len() + 2);
        let mut lower = RangePoint::start(Datum::Min, false);

        for pair in points.chunks(2) {
            let [start, end] = pair else {
                break;
            };
            let upper = RangePoint::end(start.value.clone(), !start.excl);
            if lower.cmp_point(&upper) == Ordering::Less {
                complemented.push(lower);
                complemented.push(upper);
            }
            lower = RangePoint::start(end.value.clone(), !end.excl);
        }

        let upper = RangePoint::end(Datum::Max, false);
        if lower.cmp_point(&upper) == Ordering::Less {
            complemented.push(lower);
            complemented.push(upper);
        }
        complemented
    }

    // Linear merge of two sorted inputs. A point is emitted where the
    // overlap depth crosses `required`.
    fn merge(&self, a: &[RangePoint], b: &[RangePoint], required: usize) -> Vec<RangePoint> {
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        let mut depth = 0usize;

        while i < a.len() || j < b.len() {
            let take_a = j >= b.len() || (i < a.len() && a[i].cmp_point(&b[j]) != Ordering::Greater);
            let point = if take_a {
                i += 1;
                &a[i - 1]
            } else {
                j += 1;
                &b[j - 1]
            };

            if point.start {
                depth += 1;
                if depth == required {
                    merged.push(point.clone());
                }
            } else {
                if depth == required {
                    merged.push(point.clone());
                }
                depth = depth.saturating_sub(1);
            }
        }

        coalesce(merged)
    }

    /// One single-column composite range per interval.
    pub fn build_index_ranges(&self, points: &[RangePoint]) -> Vec<IndexRange> {
        intervals(points).map(IndexRange::single).collect()
    }

    /// Extends every existing range with every interval of the next column.
    pub fn append_index_ranges(&self, origin: &[IndexRange], points: &[RangePoint]) -> Vec<IndexRange> {
        let columns: Vec<ColumnRange> = intervals(points).collect();
        let mut ranges = Vec::with_capacity(origin.len() * columns.len());
        for range in origin {
            for column in &columns {
                ranges.push(range.extended(column.clone()));
            }
        }
        ranges
    }
}

/// Interval count of a point sequence
pub fn interval_count(points: &[RangePoint]) -> usize {
    points.len() / 2
}

fn intervals(points: &[RangePoint]) -> impl Iterator<Item = ColumnRange> + '_ {
    points.chunks_exact(2).map(|pair| ColumnRange {
        low: pair[0].value.clone(),
        low_exclude: pair[0].excl,
        high: pair[1].value.clone(),
        high_exclude: pair[1].excl,
    })
}

fn full_range() -> Vec<RangePoint> {
    vec![
        RangePoint::start(Datum::Min, false),
        RangePoint::end(Datum::Max, false),
    ]
}

// Joins intervals that touch: `a, v)` followed by `[v, b` (or `v]`
// followed by `(v`) cover `v` exactly once between them.
fn coalesce(points: Vec<RangePoint>) -> Vec<RangePoint> {
    let mut out: Vec<RangePoint> = Vec::with_capacity(points.len());
    for point in points {
        if point.start {
            if let Some(last) = out.last() {
                let touches = !last.start
                    && last.value.cmp_datum(&point.value) == Ordering::Equal
                    && last.excl != point.excl;
                if touches {
                    out.pop();
                    continue;
                }
            }
        }
        out.push(point);
    }
    out
}
