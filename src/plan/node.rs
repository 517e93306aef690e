//! Logical plan nodes
//!
//! Nodes are built upstream and only annotated by the optimizer:
//! ranges, sort bypass, limit hints and cost.

use std::sync::Arc;

use crate::ast::Expr;
use crate::model::IndexInfo;

use super::range::IndexRange;

/// Filter: conditions are ANDed
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub conditions: Vec<Expr>,
    pub input: Box<Plan>,
}

/// Index scan leaf
#[derive(Debug, Clone, PartialEq)]
pub struct IndexScan {
    /// Index being scanned
    pub index: Arc<IndexInfo>,
    /// Key ranges to scan. Empty means no row can match.
    pub ranges: Vec<IndexRange>,
    /// Scan in descending key order
    pub desc: bool,
    /// Row-count hint propagated from an enclosing limit
    pub limit: Option<u64>,
    /// Estimated cost, attached by the cost hook
    pub cost: Option<f64>,
}

impl IndexScan {
    /// Creates a full scan over the index
    pub fn new(index: Arc<IndexInfo>) -> Self {
        Self {
            index,
            ranges: vec![IndexRange::full()],
            desc: false,
            limit: None,
            cost: None,
        }
    }
}

/// One ORDER BY key
#[derive(Debug, Clone, PartialEq)]
pub struct ByItem {
    pub expr: Expr,
    pub desc: bool,
}

impl ByItem {
    pub fn asc(expr: Expr) -> Self {
        Self { expr, desc: false }
    }

    pub fn desc(expr: Expr) -> Self {
        Self { expr, desc: true }
    }
}

/// Sort
#[derive(Debug, Clone, PartialEq)]
pub struct Sort {
    pub by_items: Vec<ByItem>,
    /// Input already arrives in order; the physical sort can be skipped
    pub bypass: bool,
    pub input: Box<Plan>,
}

/// Limit
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    pub count: u64,
    pub offset: u64,
    pub input: Box<Plan>,
}

impl Limit {
    /// Rows the input must produce for this limit to be satisfied
    pub fn row_bound(&self) -> u64 {
        self.count.saturating_add(self.offset)
    }
}

/// Any other operator; passed through untouched
#[derive(Debug, Clone, PartialEq)]
pub struct Other {
    pub name: String,
    pub children: Vec<Plan>,
}

/// Logical plan tree
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    Filter(Filter),
    IndexScan(IndexScan),
    Sort(Sort),
    Limit(Limit),
    Other(Other),
}

impl Plan {
    pub fn filter(conditions: Vec<Expr>, input: Plan) -> Self {
        Plan::Filter(Filter {
            conditions,
            input: Box::new(input),
        })
    }

    pub fn index_scan(index: Arc<IndexInfo>) -> Self {
        Plan::IndexScan(IndexScan::new(index))
    }

    pub fn sort(by_items: Vec<ByItem>, input: Plan) -> Self {
        Plan::Sort(Sort {
            by_items,
            bypass: false,
            input: Box::new(input),
        })
    }

    pub fn limit(count: u64, input: Plan) -> Self {
        Plan::Limit(Limit {
            count,
            offset: 0,
            input: Box::new(input),
        })
    }

    pub fn other(name: impl Into<String>, children: Vec<Plan>) -> Self {
        Plan::Other(Other {
            name: name.into(),
            children,
        })
    }

    /// Operator name for explain output
    pub fn name(&self) -> &str {
        match self {
            Plan::Filter(_) => "Filter",
            Plan::IndexScan(_) => "IndexScan",
            Plan::Sort(_) => "Sort",
            Plan::Limit(_) => "Limit",
            Plan::Other(o) => &o.name,
        }
    }

    pub fn as_filter(&self) -> Option<&Filter> {
        match self {
            Plan::Filter(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_index_scan(&self) -> Option<&IndexScan> {
        match self {
            Plan::IndexScan(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sort(&self) -> Option<&Sort> {
        match self {
            Plan::Sort(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_limit(&self) -> Option<&Limit> {
        match self {
            Plan::Limit(l) => Some(l),
            _ => None,
        }
    }

    /// Direct children, left to right
    pub fn children(&self) -> Vec<&Plan> {
        match self {
            Plan::Filter(f) => vec![f.input.as_ref()],
            Plan::Sort(s) => vec![s.input.as_ref()],
            Plan::Limit(l) => vec![l.input.as_ref()],
            Plan::IndexScan(_) => Vec::new(),
            Plan::Other(o) => o.children.iter().collect(),
        }
    }

    /// Collects every index scan in the tree, depth first
    pub fn index_scans(&self) -> Vec<&IndexScan> {
        let mut scans = Vec::new();
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if let Plan::IndexScan(scan) = node {
                scans.push(scan);
            }
            stack.extend(node.children().into_iter().rev());
        }
        scans
    }
}
