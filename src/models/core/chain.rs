use serde::{Deserialize, Serialize};

use crate::models::Subscription;

/// Default stream filter subscribed on every node connection.
pub const DEFAULT_QUERY: &str = "tm.event='Tx'";

/// A monitored blockchain network and its node endpoints.
///
/// Chains are loaded once at startup and shared read-only by every
/// component for the lifetime of the process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Chain {
	/// Unique chain identifier (lowercase slug)
	pub name: String,
	/// WebSocket endpoint URLs of the nodes to connect to
	pub nodes: Vec<String>,
	/// Stream filter expressions subscribed per node connection
	#[serde(default = "default_queries")]
	pub queries: Vec<String>,
	/// Subscriptions evaluated against this chain's events
	pub subscriptions: Vec<Subscription>,
}

fn default_queries() -> Vec<String> {
	vec![DEFAULT_QUERY.to_string()]
}
