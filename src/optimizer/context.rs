//! Per-compilation optimizer context
//!
//! Holds configuration, the logger and a handle to shared counters.
//! One context may serve many plans; it carries no per-plan state.

use std::path::Path;
use std::sync::Arc;

use crate::config::{ConfigResult, OptimizerConfig};
use crate::observability::{Event, Logger, MetricsRegistry, Severity};
use crate::plan::{self, Plan};

/// Context passed to every optimizer pass
#[derive(Debug, Clone)]
pub struct OptimizerContext {
    config: OptimizerConfig,
    logger: Logger,
    metrics: Arc<MetricsRegistry>,
}

impl OptimizerContext {
    /// Creates a context with its own metrics registry
    pub fn new(config: OptimizerConfig) -> Self {
        Self::with_metrics(config, Arc::new(MetricsRegistry::new()))
    }

    /// Creates a context reporting into a shared metrics registry
    pub fn with_metrics(config: OptimizerConfig, metrics: Arc<MetricsRegistry>) -> Self {
        let logger = Logger::new(config.severity());
        Self {
            config,
            logger,
            metrics,
        }
    }

    /// Loads configuration from a JSON file and builds a context over it
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let ctx = Self::new(OptimizerConfig::load(path)?);
        let path = path.display().to_string();
        ctx.log_event(Severity::Info, Event::ConfigLoaded, &[("path", path.as_str())]);
        Ok(ctx)
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn metrics(&self) -> &MetricsRegistry {
        &self.metrics
    }

    /// Log a typed event with fields
    pub fn log_event(&self, severity: Severity, event: Event, fields: &[(&str, &str)]) {
        self.logger.log(severity, event.as_str(), fields);
    }

    /// Runs the cost hook over `root` and logs the total
    pub fn estimate_cost(&self, root: &mut Plan) -> f64 {
        let total = plan::estimate_cost(root);
        let rendered = format!("{:.2}", total);
        self.log_event(Severity::Trace, Event::CostEstimated, &[("total", rendered.as_str())]);
        total
    }
}

impl Default for OptimizerContext {
    fn default() -> Self {
        Self::new(OptimizerConfig::default())
    }
}
