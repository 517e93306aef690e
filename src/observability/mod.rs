//! Observability for the optimizer passes
//!
//! - Structured logging (JSON)
//! - Counters
//! - Typed events
//!
//! Observability is read-only: it never influences a rewrite decision.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};
