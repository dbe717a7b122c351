//! Core services implementing the monitoring pipeline.
//!
//! Data flows client → manager → filter → notification:
//!
//! - `client`: one reconnecting protocol client per node endpoint
//! - `manager`: fan-in and deduplication across redundant nodes
//! - `filter`: per-subscription rule matching and stale suppression
//! - `notification`: delivery of matched events

pub mod client;
pub mod filter;
pub mod manager;
pub mod notification;
