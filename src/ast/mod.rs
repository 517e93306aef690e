//! Expression surface consumed by the optimizer
//!
//! Predicates are opaque typed nodes; the optimizer only needs operator
//! kinds, resolved column identity and static-value detection.

mod datum;
mod expr;

pub use datum::{compare_values, Datum};
pub use expr::{BinaryOp, ColumnRef, Expr, UnaryOp};
