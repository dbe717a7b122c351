use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A named rule set plus delivery target bound to a chain.
///
/// Multiple subscriptions may reference the same chain with different
/// rules and targets; the filterer evaluates each one independently.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Subscription {
	pub name: String,
	/// Rule expressions over message attributes, OR semantics across the list.
	/// An empty list matches every message.
	#[serde(default)]
	pub expressions: Vec<String>,
	/// Delivery target for matched events
	pub notify: NotifyConfig,
	/// Include transactions whose result code indicates failure
	#[serde(default)]
	pub log_failed_transactions: bool,
	/// Include node connection errors and transaction decode errors
	#[serde(default)]
	pub log_errors: bool,
	/// Include messages the registry could not interpret
	#[serde(default)]
	pub log_unknown_messages: bool,
	/// Apply rule expressions to messages nested inside containers.
	/// When unset, nested messages skip rule evaluation and are only
	/// subject to recursive filtering of their own children.
	#[serde(default)]
	pub filter_internal_messages: bool,
}

/// Webhook delivery target configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
	pub url: String,
	/// HTTP method for the webhook request (defaults to POST)
	pub method: Option<String>,
	/// Extra headers for the webhook request
	pub headers: Option<HashMap<String, String>>,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_flags_default_to_false() {
		let sub: Subscription = serde_json::from_str(
			r#"{"name": "transfers", "notify": {"url": "https://hooks.test/abc"}}"#,
		)
		.unwrap();
		assert!(!sub.log_failed_transactions);
		assert!(!sub.log_errors);
		assert!(!sub.log_unknown_messages);
		assert!(!sub.filter_internal_messages);
		assert!(sub.expressions.is_empty());
	}
}
