//! Application-level messages carried inside a transaction.
//!
//! Messages form a closed hierarchy: concrete operations (transfers, reward
//! withdrawals), one container variant that nests other messages, and two
//! catch-all variants for types the registry could not interpret. Dispatch is
//! by matching on the variant so the compiler enforces exhaustiveness when new
//! message types are added.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single application-level operation decoded from a transaction.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Message {
	/// A value transfer between two accounts
	Transfer(TransferMessage),
	/// A staking reward withdrawal
	WithdrawReward(WithdrawRewardMessage),
	/// One account executing messages on behalf of another. The only
	/// variant with children; recursion terminates at every other variant.
	Exec(ExecMessage),
	/// A recognized envelope whose type tag has no registered parser
	Unsupported(UnsupportedMessage),
	/// A registered parser failed to decode the payload
	ParseError(MessageParseError),
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransferMessage {
	pub from_address: String,
	pub to_address: String,
	pub amount: String,
	pub denom: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WithdrawRewardMessage {
	pub delegator_address: String,
	pub validator_address: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ExecMessage {
	pub grantee: String,
	pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UnsupportedMessage {
	pub type_tag: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MessageParseError {
	pub type_tag: String,
	pub reason: String,
}

impl Message {
	/// The declared wire type tag of this message
	pub fn type_tag(&self) -> &str {
		match self {
			Message::Transfer(_) => "/cosmos.bank.v1beta1.MsgSend",
			Message::WithdrawReward(_) => "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward",
			Message::Exec(_) => "/cosmos.authz.v1beta1.MsgExec",
			Message::Unsupported(msg) => &msg.type_tag,
			Message::ParseError(msg) => &msg.type_tag,
		}
	}

	/// Flattened key/value attribute set used for rule matching
	pub fn attributes(&self) -> HashMap<String, String> {
		let mut attrs = HashMap::new();
		attrs.insert("type".to_string(), self.type_tag().to_string());
		match self {
			Message::Transfer(msg) => {
				attrs.insert("action".to_string(), "transfer".to_string());
				attrs.insert("sender".to_string(), msg.from_address.clone());
				attrs.insert("recipient".to_string(), msg.to_address.clone());
				attrs.insert("amount".to_string(), msg.amount.clone());
				attrs.insert("denom".to_string(), msg.denom.clone());
			}
			Message::WithdrawReward(msg) => {
				attrs.insert("action".to_string(), "withdraw_reward".to_string());
				attrs.insert("delegator".to_string(), msg.delegator_address.clone());
				attrs.insert("validator".to_string(), msg.validator_address.clone());
			}
			Message::Exec(msg) => {
				attrs.insert("action".to_string(), "exec".to_string());
				attrs.insert("grantee".to_string(), msg.grantee.clone());
			}
			Message::Unsupported(_) => {
				attrs.insert("action".to_string(), "unsupported".to_string());
			}
			Message::ParseError(msg) => {
				attrs.insert("action".to_string(), "parse_error".to_string());
				attrs.insert("error".to_string(), msg.reason.clone());
			}
		}
		attrs
	}

	/// Nested messages, present only for the container variant
	pub fn children(&self) -> Option<&[Message]> {
		match self {
			Message::Exec(msg) => Some(&msg.messages),
			_ => None,
		}
	}

	/// Returns a copy of this container with its children replaced.
	/// Non-container variants are returned unchanged.
	pub fn with_children(&self, children: Vec<Message>) -> Message {
		match self {
			Message::Exec(msg) => Message::Exec(ExecMessage {
				grantee: msg.grantee.clone(),
				messages: children,
			}),
			other => other.clone(),
		}
	}

	/// True for the variants the registry could not interpret, both of
	/// which are governed by the subscription's unknown-message flag.
	pub fn is_unknown(&self) -> bool {
		matches!(self, Message::Unsupported(_) | Message::ParseError(_))
	}
}
