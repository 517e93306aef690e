//! aerodb-optimizer - index-range refinement core of the aerodb planner
//!
//! Rewrites logical plans so that:
//! - filter predicates usable as index lookups become index-scan ranges
//! - sorts already satisfied by index order are bypassed
//! - limit bounds reach index scans as row hints
//!
//! Every rewrite preserves query results.

pub mod ast;
pub mod config;
pub mod model;
pub mod observability;
pub mod optimizer;
pub mod plan;

pub use optimizer::{refine, OptimizerContext};
