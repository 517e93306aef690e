//! Value ordering for range endpoints
//!
//! Range endpoints live on an extended value line:
//! `Min < every non-null value < Max`.
//!
//! Ordering rules for concrete values:
//! - null < bool < number < string < array < object
//! - For same types, natural ordering

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde_json::{Number, Value};

/// A range endpoint value, extended with the domain sentinels.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Datum {
    /// Smallest non-null value of the column domain
    Min,
    /// A concrete column value
    Value(Value),
    /// Largest value of the column domain
    Max,
}

impl Datum {
    /// Total order over the extended value line.
    pub fn cmp_datum(&self, other: &Datum) -> Ordering {
        match (self, other) {
            (Datum::Min, Datum::Min) | (Datum::Max, Datum::Max) => Ordering::Equal,
            (Datum::Min, _) | (_, Datum::Max) => Ordering::Less,
            (_, Datum::Min) | (Datum::Max, _) => Ordering::Greater,
            (Datum::Value(a), Datum::Value(b)) => compare_values(a, b),
        }
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Min => write!(f, "-inf"),
            Datum::Max => write!(f, "+inf"),
            Datum::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Compares two JSON values in column order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let type_order = |v: &Value| -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::String(_) => 3,
            Value::Array(_) => 4,
            Value::Object(_) => 5,
        }
    };

    let a_type = type_order(a);
    let b_type = type_order(b);
    if a_type != b_type {
        return a_type.cmp(&b_type);
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xv, yv) in x.iter().zip(y.iter()) {
                let ord = compare_values(xv, yv);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            x.len().cmp(&y.len())
        }
        // Objects have no meaningful column order
        _ => Ordering::Equal,
    }
}

/// Exact numeric value of a JSON number
enum Num {
    Int(i128),
    Float(f64),
}

fn num(n: &Number) -> Num {
    if let Some(i) = n.as_i64() {
        Num::Int(i128::from(i))
    } else if let Some(u) = n.as_u64() {
        Num::Int(i128::from(u))
    } else {
        Num::Float(n.as_f64().unwrap_or(0.0))
    }
}

/// Exact order over integers and floats; never rounds an integer.
fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    match (num(x), num(y)) {
        (Num::Int(a), Num::Int(b)) => a.cmp(&b),
        (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (Num::Int(a), Num::Float(b)) => compare_int_float(a, b),
        (Num::Float(a), Num::Int(b)) => compare_int_float(b, a).reverse(),
    }
}

// JSON numbers are finite, so `f` is never NaN
fn compare_int_float(i: i128, f: f64) -> Ordering {
    // 2^127 bounds every integer a JSON number can hold
    const LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i128)) {
        Ordering::Equal if f > whole => Ordering::Less,
        Ordering::Equal if f < whole => Ordering::Greater,
        ord => ord,
    }
}
