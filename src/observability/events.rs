//! Observable optimizer events
//!
//! Events are explicit and typed.

use std::fmt;

/// Observable events of the optimizer passes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    /// Configuration loaded from file
    ConfigLoaded,

    // Refine pass
    /// Refine pass started
    RefineBegin,
    /// Refine pass finished
    RefineComplete,
    /// Index ranges rebuilt for a scan
    IndexRangeBuilt,
    /// Range composition stopped before the named column
    IndexRangeStopped,
    /// Sort step elided
    SortBypassed,
    /// Limit hint pushed to index scans
    LimitPropagated,

    // Cost hook
    /// Cost attached to an index scan
    CostEstimated,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "OPTIMIZER_CONFIG_LOADED",
            Event::RefineBegin => "REFINE_BEGIN",
            Event::RefineComplete => "REFINE_COMPLETE",
            Event::IndexRangeBuilt => "INDEX_RANGE_BUILT",
            Event::IndexRangeStopped => "INDEX_RANGE_STOPPED",
            Event::SortBypassed => "SORT_BYPASSED",
            Event::LimitPropagated => "LIMIT_PROPAGATED",
            Event::CostEstimated => "COST_ESTIMATED",
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
