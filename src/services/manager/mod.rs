//! Multi-node fan-in and deduplication.
//!
//! The manager owns the whole protocol client fleet and produces the
//! single report stream consumed by the filterer.

mod dedup;
mod error;
mod service;

pub use dedup::{DedupCache, DEFAULT_DEDUP_WINDOW};
pub use error::ManagerError;
pub use service::{forward_reports, NodeManager};
