//! Composite index ranges
//!
//! An `IndexRange` is a conjunction of one interval per leading index
//! column. Only a contiguous prefix starting at column 0 is ever
//! constrained; columns past the prefix are unconstrained.

use std::cmp::Ordering;
use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::ast::{compare_values, Datum};

/// Interval on a single index column
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnRange {
    pub low: Datum,
    pub low_exclude: bool,
    pub high: Datum,
    pub high_exclude: bool,
}

impl ColumnRange {
    /// The whole non-null domain of the column
    pub fn full() -> Self {
        Self {
            low: Datum::Min,
            low_exclude: false,
            high: Datum::Max,
            high_exclude: false,
        }
    }

    /// Degenerate interval holding exactly one value
    pub fn point(value: Value) -> Self {
        Self {
            low: Datum::Value(value.clone()),
            low_exclude: false,
            high: Datum::Value(value),
            high_exclude: false,
        }
    }

    /// Returns true if the interval holds exactly one value
    pub fn is_point(&self) -> bool {
        match (&self.low, &self.high) {
            (Datum::Value(l), Datum::Value(h)) => {
                !self.low_exclude && !self.high_exclude && compare_values(l, h) == Ordering::Equal
            }
            _ => false,
        }
    }

    /// Checks whether a column value falls inside the interval.
    ///
    /// Null is outside every interval.
    pub fn contains(&self, value: &Value) -> bool {
        if value.is_null() {
            return false;
        }
        let v = Datum::Value(value.clone());

        let above_low = match v.cmp_datum(&self.low) {
            Ordering::Greater => true,
            Ordering::Equal => !self.low_exclude,
            Ordering::Less => false,
        };
        let below_high = match v.cmp_datum(&self.high) {
            Ordering::Less => true,
            Ordering::Equal => !self.high_exclude,
            Ordering::Greater => false,
        };
        above_low && below_high
    }
}

impl fmt::Display for ColumnRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{},{}{}",
            if self.low_exclude { '(' } else { '[' },
            self.low,
            self.high,
            if self.high_exclude { ')' } else { ']' }
        )
    }
}

/// Multi-column index range over a leading column prefix
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct IndexRange {
    /// One interval per constrained column, column 0 first
    pub columns: Vec<ColumnRange>,
}

impl IndexRange {
    /// Unconstrained range (full index scan)
    pub fn full() -> Self {
        Self::default()
    }

    /// Range constraining only the leading column
    pub fn single(column: ColumnRange) -> Self {
        Self {
            columns: vec![column],
        }
    }

    /// Returns a copy extended with an interval on the next column
    pub fn extended(&self, column: ColumnRange) -> Self {
        let mut columns = self.columns.clone();
        columns.push(column);
        Self { columns }
    }

    /// Number of leading columns constrained
    pub fn constrained_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_full(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns true if every constrained column is a single value
    pub fn is_point(&self) -> bool {
        !self.columns.is_empty() && self.columns.iter().all(ColumnRange::is_point)
    }

    /// Checks whether an index key (values in index column order) falls
    /// inside the range.
    pub fn contains(&self, key: &[Value]) -> bool {
        self.columns.iter().enumerate().all(|(i, column)| {
            key.get(i)
                .map(|value| column.contains(value))
                .unwrap_or(false)
        })
    }
}

impl fmt::Display for IndexRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.columns.is_empty() {
            return write!(f, "{}", ColumnRange::full());
        }
        for (i, column) in self.columns.iter().enumerate() {
            if i > 0 {
                write!(f, " x ")?;
            }
            write!(f, "{}", column)?;
        }
        Ok(())
    }
}
