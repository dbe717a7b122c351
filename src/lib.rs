//! A multi-node chain monitoring service.
//!
//! Maintains persistent streaming connections to every configured node,
//! decodes incoming transaction events into a typed model, deduplicates
//! events observed redundantly across nodes of the same chain, filters
//! them against per-subscription rules (including recursive filtering
//! of nested messages and per-chain height watermarks), and delivers
//! the survivors to webhook targets.
//!
//! # Architecture
//! - `models`: chains, subscriptions, events, messages, parser registry
//! - `repositories`: configuration loading behind trait seams
//! - `services`: the client → manager → filter → notification pipeline
//! - `bootstrap`: service wiring and the report-processing step
//! - `utils`: logging, rule expressions, metrics

pub mod bootstrap;
pub mod models;
pub mod repositories;
pub mod services;
pub mod utils;
