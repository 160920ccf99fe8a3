//! Metrics port
//!
//! Routing code reports timings and counts through [`MetricsSink`]; the sink
//! is fire-and-forget and never fails.

use std::fmt;

/// Unit attached to a metric value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Milliseconds,
    Count,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Milliseconds => "ms",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for MetricUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Metric names
pub mod names {
    pub const V3_SUBGRAPH_POOLS_LOAD: &str = "V3SubgraphPoolsLoad";
    pub const V3_POOLS_FILTER_LOAD: &str = "V3PoolsFilterLoad";
    pub const V3_POOLS_LOAD: &str = "V3PoolsLoad";
    pub const V2_SUBGRAPH_POOLS_LOAD: &str = "V2SubgraphPoolsLoad";
    pub const V2_SUBGRAPH_LOOPS_FIRST: &str = "V2SubgraphLoopsInFirstIteration";
    pub const V2_SUBGRAPH_LOOPS_SECOND: &str = "V2SubgraphLoopsInSecondIteration";
    pub const V2_POOLS_FILTER_LOAD: &str = "V2PoolsFilterLoad";
    pub const V2_POOLS_LOAD: &str = "V2PoolsLoad";
    pub const MIXED_POOLS_FILTER_LOAD: &str = "MixedPoolsFilterLoad";
    pub const MIXED_POOLS_LOAD: &str = "MixedPoolsLoad";
    pub const GET_ROUTES_LOAD: &str = "GetRoutesLoad";
    pub const QUOTES_LOAD: &str = "QuotesLoad";
    pub const QUOTES_FETCHED: &str = "QuotesFetched";
    pub const GET_QUOTES_LOAD: &str = "GetQuotesLoad";
    pub const SIMULATION_FAILED: &str = "SimulationFailed";

    /// Protocol-prefixed name, e.g. `V2QuotesFetched`
    pub fn prefixed(protocol: &str, name: &str) -> String {
        format!("{}{}", protocol, name)
    }
}

/// Side-effect port for counters and timers
pub trait MetricsSink: Send + Sync {
    fn put_metric(&self, name: &str, value: u64, unit: MetricUnit);
}

/// Discards every metric
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn put_metric(&self, _name: &str, _value: u64, _unit: MetricUnit) {}
}

/// Emits each metric as a debug event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingMetrics;

impl MetricsSink for TracingMetrics {
    fn put_metric(&self, name: &str, value: u64, unit: MetricUnit) {
        tracing::debug!(metric = name, value, unit = unit.as_str(), "metric");
    }
}
