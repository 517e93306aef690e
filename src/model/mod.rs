//! Schema and index metadata
//!
//! Read-only inputs to the optimizer. Identifiers compare
//! case-insensitively through their lowercase form.

use std::fmt;

/// Case-insensitive identifier: original spelling plus lowercase form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CIStr {
    /// Original spelling
    pub o: String,
    /// Lowercase form used for comparison
    pub l: String,
}

impl CIStr {
    pub fn new(s: impl Into<String>) -> Self {
        let o = s.into();
        let l = o.to_lowercase();
        Self { o, l }
    }

    /// Case-insensitive equality
    pub fn matches(&self, other: &CIStr) -> bool {
        self.l == other.l
    }
}

impl From<&str> for CIStr {
    fn from(s: &str) -> Self {
        CIStr::new(s)
    }
}

impl From<String> for CIStr {
    fn from(s: String) -> Self {
        CIStr::new(s)
    }
}

impl fmt::Display for CIStr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.o)
    }
}

/// One column of an index, in key order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexColumn {
    /// Column name
    pub name: CIStr,
    /// Position within the index key
    pub offset: usize,
}

/// Index descriptor
///
/// Column order defines which prefixes may be range-constrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexInfo {
    /// Index name
    pub name: CIStr,
    /// Owning table
    pub table: CIStr,
    /// Indexed columns, leading column first
    pub columns: Vec<IndexColumn>,
}

impl IndexInfo {
    /// Creates index metadata over the given columns
    pub fn new(
        name: impl Into<CIStr>,
        table: impl Into<CIStr>,
        columns: impl IntoIterator<Item = impl Into<CIStr>>,
    ) -> Self {
        Self {
            name: name.into(),
            table: table.into(),
            columns: columns
                .into_iter()
                .enumerate()
                .map(|(offset, name)| IndexColumn {
                    name: name.into(),
                    offset,
                })
                .collect(),
        }
    }

    /// Returns the column at the given key position
    pub fn column(&self, offset: usize) -> Option<&IndexColumn> {
        self.columns.get(offset)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}
