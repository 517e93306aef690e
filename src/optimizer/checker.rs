//! Index access condition classification
//!
//! Decides whether a single predicate can be turned into a range on one
//! index column. Anything not recognized stays in the filter.

use serde_json::Value;

use crate::ast::{BinaryOp, Expr, UnaryOp};
use crate::model::IndexInfo;

/// Checks whether a condition can be pushed to one index column.
pub struct ConditionChecker<'a> {
    index: &'a IndexInfo,
    /// The offset of the indexed column to be checked.
    column_offset: usize,
}

impl<'a> ConditionChecker<'a> {
    pub fn new(index: &'a IndexInfo, column_offset: usize) -> Self {
        Self {
            index,
            column_offset,
        }
    }

    /// Returns true if `condition` can be expressed as a range on the column.
    pub fn check(&self, condition: &Expr) -> bool {
        match condition {
            Expr::Binary { op, left, right } => self.check_binary_operation(*op, left, right),
            Expr::Paren(inner) => self.check(inner),
            Expr::Unary { op, operand } => *op == UnaryOp::Not && self.check(operand),
            Expr::InList { expr, list, .. } => {
                !list.is_empty()
                    && self.check_column_expr(expr)
                    && list.iter().all(|item| item.static_value().is_some_and(is_range_bound))
            }
            _ => false,
        }
    }

    fn check_binary_operation(&self, op: BinaryOp, left: &Expr, right: &Expr) -> bool {
        match op {
            // Conservative: both branches must constrain this same column
            BinaryOp::Or => self.check(left) && self.check(right),
            op if op.is_comparison() => {
                if let Some(value) = left.static_value() {
                    is_range_bound(value) && self.check_column_expr(right)
                } else if let Some(value) = right.static_value() {
                    is_range_bound(value) && self.check_column_expr(left)
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    fn check_column_expr(&self, expr: &Expr) -> bool {
        let Some(column) = expr.as_column() else {
            return false;
        };
        if !column.table.matches(&self.index.table) {
            return false;
        }
        match self.index.column(self.column_offset) {
            Some(index_column) => index_column.name.matches(&column.column),
            None => false,
        }
    }
}

/// Null compares unknown against everything, so it can never bound a range.
/// Objects have no column order, so neither can any value holding one.
fn is_range_bound(value: &Value) -> bool {
    !value.is_null() && !holds_object(value)
}

fn holds_object(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(holds_object),
        _ => false,
    }
}
