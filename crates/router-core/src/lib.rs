//! router-core: Shared types, amounts, errors, and configuration
//!
//! This crate provides the foundational types used across the router
//! workspace: chains, tokens and currencies, exact fractional amounts,
//! the error taxonomy, routing configuration, per-chain token tables,
//! and the metrics and logging ports.

pub mod amount;
pub mod config;
pub mod errors;
pub mod logging;
pub mod metrics;
pub mod tokens;
pub mod types;

pub use amount::*;
pub use config::*;
pub use errors::*;
pub use metrics::{MetricUnit, MetricsSink, NoopMetrics, TracingMetrics};
pub use types::*;
