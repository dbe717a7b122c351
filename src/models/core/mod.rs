//! Core domain models for the chain monitoring system.
//!
//! This module contains the fundamental configuration structures:
//! - Chains: Monitored networks and their node endpoints
//! - Subscriptions: Rule sets plus delivery targets bound to a chain

mod chain;
mod subscription;

pub use chain::{Chain, DEFAULT_QUERY};
pub use subscription::{NotifyConfig, Subscription};
