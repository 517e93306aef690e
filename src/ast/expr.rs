//! Predicate expression structures
//!
//! Defines the typed expression surface consumed by the optimizer.
//! Column references arrive already resolved to their table.

use std::fmt;

use serde_json::Value;

use crate::model::CIStr;

/// Binary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// Logical AND
    And,
    /// Logical OR
    Or,
    /// Equality: a = b
    Eq,
    /// Inequality: a <> b
    Ne,
    /// Greater than or equal: a >= b
    Ge,
    /// Greater than: a > b
    Gt,
    /// Less than or equal: a <= b
    Le,
    /// Less than: a < b
    Lt,
    /// Arithmetic addition
    Plus,
    /// Arithmetic subtraction
    Minus,
}

impl BinaryOp {
    /// Returns true for the six comparison operators
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Ge | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Lt
        )
    }

    /// Returns the operator with its operands swapped: `a < b` == `b > a`.
    pub fn flipped(&self) -> BinaryOp {
        match self {
            BinaryOp::Ge => BinaryOp::Le,
            BinaryOp::Gt => BinaryOp::Lt,
            BinaryOp::Le => BinaryOp::Ge,
            BinaryOp::Lt => BinaryOp::Gt,
            other => *other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Ge => ">=",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Lt => "<",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
        }
    }
}

/// Unary operator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// Logical NOT
    Not,
    /// Arithmetic negation
    Minus,
}

/// A column reference resolved to its owning table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef {
    /// Owning table name
    pub table: CIStr,
    /// Column name
    pub column: CIStr,
}

impl ColumnRef {
    pub fn new(table: impl Into<CIStr>, column: impl Into<CIStr>) -> Self {
        Self {
            table: table.into(),
            column: column.into(),
        }
    }
}

/// Predicate / scalar expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Column reference
    Column(ColumnRef),
    /// Literal value
    Value(Value),
    /// Binary operation: left op right
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary operation
    Unary { op: UnaryOp, operand: Box<Expr> },
    /// Parenthesized expression
    Paren(Box<Expr>),
    /// `expr [NOT] IN (list)`
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `expr [NOT] IN (SELECT ...)`; the subquery itself is opaque here
    InSubquery {
        expr: Box<Expr>,
        subquery: String,
        negated: bool,
    },
    /// `expr [NOT] LIKE pattern`
    Like {
        expr: Box<Expr>,
        pattern: Box<Expr>,
        negated: bool,
    },
    /// Function call
    Function { name: String, args: Vec<Expr> },
}

impl Expr {
    /// Column reference expression
    pub fn column(table: &str, column: &str) -> Self {
        Expr::Column(ColumnRef::new(table, column))
    }

    /// Literal value expression
    pub fn value(value: Value) -> Self {
        Expr::Value(value)
    }

    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn eq(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Eq, left, right)
    }

    pub fn ne(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Ne, left, right)
    }

    pub fn gt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Gt, left, right)
    }

    pub fn ge(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Ge, left, right)
    }

    pub fn lt(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Lt, left, right)
    }

    pub fn le(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Le, left, right)
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::Or, left, right)
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::binary(BinaryOp::And, left, right)
    }

    pub fn not(operand: Expr) -> Self {
        Expr::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }

    pub fn paren(inner: Expr) -> Self {
        Expr::Paren(Box::new(inner))
    }

    pub fn in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Expr::InList {
            expr: Box::new(expr),
            list,
            negated: false,
        }
    }

    pub fn not_in_list(expr: Expr, list: Vec<Expr>) -> Self {
        Expr::InList {
            expr: Box::new(expr),
            list,
            negated: true,
        }
    }

    /// Returns the compile-time value of this expression, if it has one.
    ///
    /// Literals and parenthesized literals are static.
    pub fn static_value(&self) -> Option<&Value> {
        match self {
            Expr::Value(v) => Some(v),
            Expr::Paren(inner) => inner.static_value(),
            _ => None,
        }
    }

    /// Returns true if the expression is a compile-time value
    pub fn is_static(&self) -> bool {
        self.static_value().is_some()
    }

    /// Returns the column reference if this is a plain column
    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(c) => Some(c),
            _ => None,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(c) => write!(f, "{}.{}", c.table, c.column),
            Expr::Value(v) => write!(f, "{}", v),
            Expr::Binary { op, left, right } => write!(f, "{} {} {}", left, op.as_str(), right),
            Expr::Unary { op: UnaryOp::Not, operand } => write!(f, "NOT {}", operand),
            Expr::Unary {
                op: UnaryOp::Minus,
                operand,
            } => write!(f, "-{}", operand),
            Expr::Paren(inner) => write!(f, "({})", inner),
            Expr::InList {
                expr,
                list,
                negated,
            } => {
                write!(f, "{} {}IN (", expr, if *negated { "NOT " } else { "" })?;
                for (i, item) in list.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, ")")
            }
            Expr::InSubquery {
                expr,
                subquery,
                negated,
            } => write!(
                f,
                "{} {}IN ({})",
                expr,
                if *negated { "NOT " } else { "" },
                subquery
            ),
            Expr::Like {
                expr,
                pattern,
                negated,
            } => write!(
                f,
                "{} {}LIKE {}",
                expr,
                if *negated { "NOT " } else { "" },
                pattern
            ),
            Expr::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
