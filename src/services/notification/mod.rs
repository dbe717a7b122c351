//! Delivery of matched events to subscription targets.
//!
//! The core hands each surviving (subscription, event) pair to a
//! delivery backend exactly once; failed sends are logged and counted
//! but never retried here, and a failure for one subscription never
//! blocks delivery to the others.

mod error;
mod webhook;

pub use error::NotificationError;
pub use webhook::{WebhookMessage, WebhookNotifier};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
	models::{Event, Message},
	services::filter::SubscriptionMatch,
	utils::metrics,
};

/// Delivery backend for formatted messages
#[async_trait]
pub trait Notifier: Send + Sync {
	async fn notify(&self, message: &WebhookMessage) -> Result<(), NotificationError>;
}

/// Dispatches matched events to each subscription's delivery target
pub struct NotificationService {
	client: reqwest::Client,
}

impl NotificationService {
	pub fn new() -> Self {
		Self {
			client: reqwest::Client::new(),
		}
	}

	/// Performs one independent delivery attempt for a match
	pub async fn execute(&self, subscription_match: &SubscriptionMatch, chain: &str) {
		let message = build_message(chain, &subscription_match.event);
		let subscription = &subscription_match.subscription;

		let notifier =
			match WebhookNotifier::from_config(&subscription.notify, self.client.clone()) {
				Ok(notifier) => notifier,
				Err(e) => {
					warn!(
						subscription = subscription.name.as_str(),
						error = %e,
						"Skipping delivery on bad target config"
					);
					metrics::DELIVERY_FAILURES
						.with_label_values(&[chain, subscription.name.as_str()])
						.inc();
					return;
				}
			};

		match notifier.notify(&message).await {
			Ok(()) => {
				debug!(
					subscription = subscription.name.as_str(),
					"Delivered notification"
				);
			}
			Err(e) => {
				warn!(
					subscription = subscription.name.as_str(),
					error = %e,
					"Delivery failed"
				);
				metrics::DELIVERY_FAILURES
					.with_label_values(&[chain, subscription.name.as_str()])
					.inc();
			}
		}
	}
}

impl Default for NotificationService {
	fn default() -> Self {
		Self::new()
	}
}

/// Renders an event into a delivery payload
pub fn build_message(chain: &str, event: &Event) -> WebhookMessage {
	match event {
		Event::Transaction(tx) => {
			let mut body = format!("hash: {}\nheight: {}", tx.hash, tx.height);
			if !tx.memo.is_empty() {
				body.push_str(&format!("\nmemo: {}", tx.memo));
			}
			if tx.is_failed() {
				body.push_str(&format!("\nresult code: {}", tx.code));
			}
			for message in &tx.messages {
				body.push_str(&format!("\n- {}", describe_message(message)));
			}
			WebhookMessage::new(format!("[{}] transaction", chain), body)
		}
		Event::TransactionError(err) => {
			WebhookMessage::new(format!("[{}] transaction error", chain), err.error.clone())
		}
		Event::NodeConnectionError(err) => WebhookMessage::new(
			format!("[{}] node connection error", chain),
			format!("node: {}\nerror: {}", err.node, err.error),
		),
	}
}

fn describe_message(message: &Message) -> String {
	match message {
		Message::Transfer(msg) => format!(
			"transfer: {}{} from {} to {}",
			msg.amount, msg.denom, msg.from_address, msg.to_address
		),
		Message::WithdrawReward(msg) => format!(
			"withdraw reward: delegator {} validator {}",
			msg.delegator_address, msg.validator_address
		),
		Message::Exec(msg) => {
			let nested: Vec<String> = msg.messages.iter().map(describe_message).collect();
			format!("exec by {}: [{}]", msg.grantee, nested.join("; "))
		}
		Message::Unsupported(msg) => format!("unsupported message: {}", msg.type_tag),
		Message::ParseError(msg) => {
			format!("undecodable message {}: {}", msg.type_tag, msg.reason)
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{content_hash, TransactionEvent, TransferMessage};

	#[test]
	fn test_build_transaction_message() {
		let event = Event::Transaction(TransactionEvent {
			hash: content_hash(b"tx"),
			height: "42".to_string(),
			memo: "invoice 7".to_string(),
			messages: vec![Message::Transfer(TransferMessage {
				from_address: "cosmos1sender".to_string(),
				to_address: "cosmos1recipient".to_string(),
				amount: "1000".to_string(),
				denom: "uatom".to_string(),
			})],
			code: 0,
		});

		let message = build_message("testchain", &event);
		assert_eq!(message.title, "[testchain] transaction");
		assert!(message.body.contains("height: 42"));
		assert!(message.body.contains("memo: invoice 7"));
		assert!(message.body.contains("transfer: 1000uatom"));
	}

	#[test]
	fn test_build_nested_exec_message() {
		let event = Event::Transaction(TransactionEvent {
			hash: content_hash(b"tx"),
			height: "1".to_string(),
			memo: String::new(),
			messages: vec![Message::Exec(crate::models::ExecMessage {
				grantee: "cosmos1grantee".to_string(),
				messages: vec![Message::Transfer(TransferMessage {
					from_address: "cosmos1sender".to_string(),
					to_address: "cosmos1recipient".to_string(),
					amount: "5".to_string(),
					denom: "uatom".to_string(),
				})],
			})],
			code: 0,
		});

		let message = build_message("testchain", &event);
		assert!(message.body.contains("exec by cosmos1grantee"));
		assert!(message.body.contains("transfer: 5uatom"));
	}
}
