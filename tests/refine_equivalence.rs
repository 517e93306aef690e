//! Refine Equivalence Tests
//!
//! Refining must never change query results:
//! - Soundness: every row the original filter accepts is inside a built range
//! - Completeness: ranges plus residual conditions accept exactly the
//!   rows the original conjunction accepts
//!
//! Rows are an exhaustive grid over small domains, nulls included.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use aerodb_optimizer::ast::{compare_values, BinaryOp, Expr, UnaryOp};
use aerodb_optimizer::model::IndexInfo;
use aerodb_optimizer::plan::{IndexScan, Plan};
use aerodb_optimizer::{refine, OptimizerContext};
use serde_json::{json, Value};

// =============================================================================
// Helper Functions
// =============================================================================

type Row = HashMap<&'static str, Value>;

fn index_abc() -> Arc<IndexInfo> {
    Arc::new(IndexInfo::new("idx_abc", "t", ["a", "b", "c"]))
}

fn col(name: &str) -> Expr {
    Expr::column("t", name)
}

fn v(value: i64) -> Expr {
    Expr::value(json!(value))
}

fn domain() -> Vec<Value> {
    let mut values = vec![Value::Null, json!({"x": 1}), json!({"y": 2})];
    values.extend((-1..=9).map(|i| json!(i)));
    values
}

fn rows() -> Vec<Row> {
    let mut rows = Vec::new();
    for a in domain() {
        for b in domain() {
            for c in [Value::Null, json!(0), json!(5)] {
                let d = match &a {
                    Value::Number(n) if n.as_i64().unwrap_or(0) % 2 == 0 => json!("even"),
                    _ => json!("odd"),
                };
                rows.push(HashMap::from([("a", a.clone()), ("b", b.clone()), ("c", c), ("d", d)]));
            }
        }
    }
    rows
}

fn value_of(expr: &Expr, row: &Row) -> Value {
    match expr {
        Expr::Column(c) => row.get(c.column.l.as_str()).cloned().unwrap_or(Value::Null),
        Expr::Value(value) => value.clone(),
        Expr::Paren(inner) => value_of(inner, row),
        other => panic!("not a scalar: {}", other),
    }
}

/// Column order, except that two objects are only known equal or not
fn compare(left: &Expr, right: &Expr, row: &Row) -> Option<Comparison> {
    let (l, r) = (value_of(left, row), value_of(right, row));
    if l.is_null() || r.is_null() {
        return None;
    }
    if l.is_object() && r.is_object() {
        return Some(Comparison::Objects(l == r));
    }
    Some(Comparison::Ordered(compare_values(&l, &r)))
}

enum Comparison {
    Ordered(Ordering),
    Objects(bool),
}

fn values_equal(l: &Value, r: &Value) -> bool {
    if l.is_object() || r.is_object() {
        l == r
    } else {
        compare_values(l, r) == Ordering::Equal
    }
}

/// Three-valued SQL truth of a predicate
fn truth(expr: &Expr, row: &Row) -> Option<bool> {
    match expr {
        Expr::Paren(inner) => truth(inner, row),
        Expr::Unary {
            op: UnaryOp::Not,
            operand,
        } => truth(operand, row).map(|t| !t),
        Expr::Binary {
            op: BinaryOp::And,
            left,
            right,
        } => match (truth(left, row), truth(right, row)) {
            (Some(false), _) | (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        },
        Expr::Binary {
            op: BinaryOp::Or,
            left,
            right,
        } => match (truth(left, row), truth(right, row)) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        },
        Expr::Binary { op, left, right } => {
            let ord = match compare(left, right, row)? {
                Comparison::Ordered(ord) => ord,
                Comparison::Objects(equal) => {
                    return match op {
                        BinaryOp::Eq => Some(equal),
                        BinaryOp::Ne => Some(!equal),
                        _ => None,
                    };
                }
            };
            Some(match op {
                BinaryOp::Eq => ord == Ordering::Equal,
                BinaryOp::Ne => ord != Ordering::Equal,
                BinaryOp::Lt => ord == Ordering::Less,
                BinaryOp::Le => ord != Ordering::Greater,
                BinaryOp::Gt => ord == Ordering::Greater,
                BinaryOp::Ge => ord != Ordering::Less,
                other => panic!("unsupported operator {:?}", other),
            })
        }
        Expr::InList {
            expr,
            list,
            negated,
        } => {
            let target = value_of(expr, row);
            if target.is_null() {
                return None;
            }
            let mut saw_null = false;
            let mut found = false;
            for item in list {
                let item = value_of(item, row);
                if item.is_null() {
                    saw_null = true;
                } else if values_equal(&target, &item) {
                    found = true;
                }
            }
            let result = if found {
                Some(true)
            } else if saw_null {
                None
            } else {
                Some(false)
            };
            result.map(|r| r != *negated)
        }
        other => panic!("unsupported predicate {}", other),
    }
}

fn accepts_all(conditions: &[Expr], row: &Row) -> bool {
    conditions.iter().all(|c| truth(c, row) == Some(true))
}

fn in_ranges(scan: &IndexScan, row: &Row) -> bool {
    let key: Vec<Value> = scan
        .index
        .columns
        .iter()
        .map(|c| row.get(c.name.l.as_str()).cloned().unwrap_or(Value::Null))
        .collect();
    scan.ranges.iter().any(|range| range.contains(&key))
}

/// Refines `Filter(conditions) -> IndexScan` and checks both plans select
/// the same rows. Returns the refined plan.
fn assert_equivalent(conditions: Vec<Expr>) -> Plan {
    let ctx = OptimizerContext::default();
    let mut plan = Plan::filter(conditions.clone(), Plan::index_scan(index_abc()));
    refine(&ctx, &mut plan);

    let filter = plan.as_filter().unwrap();
    let scan = plan.index_scans()[0];
    for row in rows() {
        let original = accepts_all(&conditions, &row);
        let ranged = in_ranges(scan, &row);
        let refined = ranged && accepts_all(&filter.conditions, &row);

        if original {
            assert!(ranged, "range lost row {:?} for {:?}", row, conditions);
        }
        assert_eq!(
            original, refined,
            "row {:?} differs for {:?}; ranges {:?}, residual {:?}",
            row, conditions, scan.ranges, filter.conditions
        );
    }

    // Residual conditions are a subsequence of the original ones
    let mut original = conditions.iter();
    for kept in &filter.conditions {
        assert!(original.any(|c| c == kept), "residual {} reordered or invented", kept);
    }
    plan
}

// =============================================================================
// Single Column
// =============================================================================

#[test]
fn test_comparisons_on_leading_column() {
    for op in [
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Lt,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Ge,
    ] {
        assert_equivalent(vec![Expr::binary(op, col("a"), v(4))]);
        assert_equivalent(vec![Expr::binary(op, v(4), col("a"))]);
    }
}

#[test]
fn test_intersection_of_bounds() {
    let plan = assert_equivalent(vec![Expr::ge(col("a"), v(1)), Expr::le(col("a"), v(7))]);
    assert!(plan.as_filter().unwrap().conditions.is_empty());

    assert_equivalent(vec![Expr::gt(col("a"), v(3)), Expr::ne(col("a"), v(5))]);
}

#[test]
fn test_contradiction() {
    let plan = assert_equivalent(vec![Expr::lt(col("a"), v(2)), Expr::gt(col("a"), v(6))]);
    assert!(plan.index_scans()[0].ranges.is_empty());

    let plan = assert_equivalent(vec![Expr::lt(col("a"), v(3)), Expr::ge(col("a"), v(3))]);
    assert!(plan.index_scans()[0].ranges.is_empty());
}

#[test]
fn test_in_and_not_in() {
    let plan = assert_equivalent(vec![Expr::in_list(col("a"), vec![v(3), v(1), v(2)])]);
    let ranges: Vec<String> = plan.index_scans()[0]
        .ranges
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(ranges, vec!["[1,1]", "[2,2]", "[3,3]"]);

    assert_equivalent(vec![Expr::not_in_list(col("a"), vec![v(0), v(9), v(4)])]);
    assert_equivalent(vec![
        Expr::in_list(col("a"), vec![v(1), v(5), v(8)]),
        Expr::ge(col("a"), v(5)),
    ]);
}

#[test]
fn test_not_and_or() {
    assert_equivalent(vec![Expr::not(Expr::lt(col("a"), v(4)))]);
    assert_equivalent(vec![Expr::not(Expr::paren(Expr::or(
        Expr::eq(col("a"), v(1)),
        Expr::gt(col("a"), v(6)),
    )))]);
    assert_equivalent(vec![Expr::or(
        Expr::lt(col("a"), v(2)),
        Expr::paren(Expr::in_list(col("a"), vec![v(5), v(6)])),
    )]);
    assert_equivalent(vec![Expr::not(Expr::not_in_list(col("a"), vec![v(2), v(3)]))]);
}

#[test]
fn test_null_literals_stay_in_filter() {
    let null = Expr::value(Value::Null);
    let plan = assert_equivalent(vec![Expr::not(Expr::eq(col("a"), null.clone()))]);
    assert!(plan.index_scans()[0].ranges[0].is_full());

    assert_equivalent(vec![Expr::not_in_list(col("a"), vec![v(1), null])]);
}

#[test]
fn test_object_literals_stay_in_filter() {
    let object = Expr::value(json!({"x": 1}));
    let plan = assert_equivalent(vec![Expr::eq(col("a"), object.clone())]);
    assert!(plan.index_scans()[0].ranges[0].is_full());
    assert_eq!(plan.as_filter().unwrap().conditions.len(), 1);

    let plan = assert_equivalent(vec![
        Expr::in_list(col("a"), vec![object.clone(), Expr::value(json!({"y": 2}))]),
        Expr::ge(col("a"), v(3)),
    ]);
    assert_eq!(plan.as_filter().unwrap().conditions.len(), 1);

    assert_equivalent(vec![Expr::ne(col("a"), object), Expr::lt(col("b"), v(2))]);
}

#[test]
fn test_ranges_against_object_rows() {
    // Objects sort above every number, so open upper ranges hold them
    assert_equivalent(vec![Expr::gt(col("a"), v(6))]);
    assert_equivalent(vec![Expr::not_in_list(col("a"), vec![v(1), v(2)])]);
    assert_equivalent(vec![Expr::eq(col("a"), v(4)), Expr::ne(col("b"), v(0))]);
}

// =============================================================================
// Composite Ranges
// =============================================================================

#[test]
fn test_composite_prefix() {
    let plan = assert_equivalent(vec![
        Expr::in_list(col("a"), vec![v(1), v(2)]),
        Expr::gt(col("b"), v(3)),
        Expr::le(col("b"), v(7)),
        Expr::eq(col("c"), v(5)),
    ]);
    let scan = plan.index_scans()[0];
    assert_eq!(scan.ranges.len(), 2);
    assert!(scan.ranges.iter().all(|r| r.constrained_columns() == 3));
    assert!(plan.as_filter().unwrap().conditions.is_empty());
}

#[test]
fn test_or_on_second_column_expands() {
    let plan = assert_equivalent(vec![
        Expr::eq(col("a"), v(4)),
        Expr::or(Expr::lt(col("b"), v(1)), Expr::gt(col("b"), v(8))),
    ]);
    assert_eq!(plan.index_scans()[0].ranges.len(), 2);
}

#[test]
fn test_contradiction_on_later_column() {
    let plan = assert_equivalent(vec![
        Expr::eq(col("a"), v(4)),
        Expr::eq(col("b"), v(1)),
        Expr::eq(col("b"), v(2)),
    ]);
    assert!(plan.index_scans()[0].ranges.is_empty());
}

#[test]
fn test_mixed_pushable_and_residual() {
    let residual_or = Expr::or(Expr::eq(col("a"), v(1)), Expr::eq(col("b"), v(1)));
    let residual_cmp = Expr::lt(col("b"), col("c"));
    let plan = assert_equivalent(vec![
        residual_or.clone(),
        Expr::ge(col("a"), v(1)),
        residual_cmp.clone(),
        Expr::eq(Expr::column("t", "d"), Expr::value(json!("even"))),
    ]);
    let residual = &plan.as_filter().unwrap().conditions;
    assert_eq!(residual[0], residual_or);
    assert_eq!(residual[1], residual_cmp);
    assert_eq!(residual.len(), 3);
}

// =============================================================================
// Prefix Invariant
// =============================================================================

#[test]
fn test_gap_in_prefix_not_constrained() {
    let on_c = Expr::eq(col("c"), v(5));
    let plan = assert_equivalent(vec![Expr::eq(col("a"), v(1)), on_c.clone()]);

    let scan = plan.index_scans()[0];
    assert!(scan.ranges.iter().all(|r| r.constrained_columns() == 1));
    assert_eq!(plan.as_filter().unwrap().conditions, vec![on_c]);
}

#[test]
fn test_no_leading_predicate_leaves_full_scan() {
    let plan = assert_equivalent(vec![Expr::eq(col("b"), v(1)), Expr::gt(col("c"), v(0))]);
    assert!(plan.index_scans()[0].ranges[0].is_full());
    assert_eq!(plan.as_filter().unwrap().conditions.len(), 2);
}
