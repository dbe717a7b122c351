//! Report filtering functionality.
//!
//! Implements the per-subscription matching pipeline:
//! - Error-visibility and failed-transaction flags
//! - Per-chain height watermark stale suppression
//! - Recursive rule matching over nested message trees

mod error;
mod service;

pub use error::FilterError;
pub use service::{FilterService, SubscriptionMatch};
