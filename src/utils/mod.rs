//! Utility modules for common functionality.
//!
//! - `expression`: rule expression parsing and evaluation
//! - `logging`: tracing subscriber setup
//! - `metrics`: Prometheus registry and pipeline counters

mod expression;

pub mod logging;
pub mod metrics;

pub use expression::{evaluate_expression, matches_any, split_expression};
