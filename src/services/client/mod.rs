//! Protocol client for streaming node connections.
//!
//! One client instance per (chain, node endpoint) pair:
//! - Resilient reconnecting WebSocket state machine
//! - Per-query stream subscriptions
//! - Frame decoding into the typed event model

mod decoder;
mod error;
mod node;

pub use decoder::{decode_frame, DecodeError};
pub use error::ClientError;
pub use node::{ConnectionState, NodeClient, RECONNECT_DELAY};
