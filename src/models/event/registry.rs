//! Pluggable parser registry for transaction messages.
//!
//! Wire messages carry a declared type tag (`@type`); the registry maps
//! each tag to a parser producing a typed [`Message`]. An unregistered
//! tag yields `Unsupported`; a registered parser that fails yields
//! `ParseError` for that single message only, never failing the
//! surrounding transaction.

use std::collections::HashMap;

use serde_json::Value;

use crate::models::event::message::{
	ExecMessage, Message, MessageParseError, TransferMessage, UnsupportedMessage,
	WithdrawRewardMessage,
};

/// Parser for one message type. Receives the registry so container
/// parsers can dispatch their nested payloads recursively.
pub type MessageParser = fn(&MessageRegistry, &Value) -> Result<Message, String>;

pub struct MessageRegistry {
	parsers: HashMap<String, MessageParser>,
}

impl MessageRegistry {
	/// Creates an empty registry with no parsers
	pub fn new() -> Self {
		Self {
			parsers: HashMap::new(),
		}
	}

	/// Registers a parser for a type tag, replacing any previous one
	pub fn register(&mut self, type_tag: impl Into<String>, parser: MessageParser) {
		self.parsers.insert(type_tag.into(), parser);
	}

	/// Decodes one message by dispatching on its declared type tag
	pub fn parse(&self, type_tag: &str, value: &Value) -> Message {
		match self.parsers.get(type_tag) {
			None => Message::Unsupported(UnsupportedMessage {
				type_tag: type_tag.to_string(),
			}),
			Some(parser) => match parser(self, value) {
				Ok(message) => message,
				Err(reason) => Message::ParseError(MessageParseError {
					type_tag: type_tag.to_string(),
					reason,
				}),
			},
		}
	}

	/// Decodes a wire message object, reading the `@type` tag from the
	/// payload itself. Objects without a tag become `Unsupported`.
	pub fn parse_value(&self, value: &Value) -> Message {
		match value.get("@type").and_then(Value::as_str) {
			Some(tag) => self.parse(tag, value),
			None => Message::Unsupported(UnsupportedMessage {
				type_tag: "<missing type tag>".to_string(),
			}),
		}
	}
}

impl Default for MessageRegistry {
	/// Registry with the built-in message parsers registered
	fn default() -> Self {
		let mut registry = Self::new();
		registry.register("/cosmos.bank.v1beta1.MsgSend", parse_transfer);
		registry.register(
			"/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward",
			parse_withdraw_reward,
		);
		registry.register("/cosmos.authz.v1beta1.MsgExec", parse_exec);
		registry
	}
}

fn required_str(value: &Value, field: &str) -> Result<String, String> {
	value
		.get(field)
		.and_then(Value::as_str)
		.map(str::to_string)
		.ok_or_else(|| format!("missing or non-string field: {}", field))
}

fn parse_transfer(_registry: &MessageRegistry, value: &Value) -> Result<Message, String> {
	// Amount is a list of coins; only the first entry is reported
	let coin = value
		.get("amount")
		.and_then(Value::as_array)
		.and_then(|coins| coins.first())
		.ok_or_else(|| "missing or empty amount".to_string())?;

	Ok(Message::Transfer(TransferMessage {
		from_address: required_str(value, "from_address")?,
		to_address: required_str(value, "to_address")?,
		amount: required_str(coin, "amount")?,
		denom: required_str(coin, "denom")?,
	}))
}

fn parse_withdraw_reward(_registry: &MessageRegistry, value: &Value) -> Result<Message, String> {
	Ok(Message::WithdrawReward(WithdrawRewardMessage {
		delegator_address: required_str(value, "delegator_address")?,
		validator_address: required_str(value, "validator_address")?,
	}))
}

fn parse_exec(registry: &MessageRegistry, value: &Value) -> Result<Message, String> {
	let nested = value
		.get("msgs")
		.and_then(Value::as_array)
		.ok_or_else(|| "missing msgs array".to_string())?;

	Ok(Message::Exec(ExecMessage {
		grantee: required_str(value, "grantee")?,
		messages: nested.iter().map(|msg| registry.parse_value(msg)).collect(),
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_parse_transfer() {
		let registry = MessageRegistry::default();
		let value = json!({
			"@type": "/cosmos.bank.v1beta1.MsgSend",
			"from_address": "cosmos1sender",
			"to_address": "cosmos1recipient",
			"amount": [{"amount": "1000", "denom": "uatom"}]
		});
		match registry.parse_value(&value) {
			Message::Transfer(msg) => {
				assert_eq!(msg.from_address, "cosmos1sender");
				assert_eq!(msg.amount, "1000");
				assert_eq!(msg.denom, "uatom");
			}
			other => panic!("expected transfer, got {:?}", other),
		}
	}

	#[test]
	fn test_unregistered_tag_is_unsupported() {
		let registry = MessageRegistry::default();
		let value = json!({"@type": "/cosmos.gov.v1beta1.MsgVote"});
		match registry.parse_value(&value) {
			Message::Unsupported(msg) => assert_eq!(msg.type_tag, "/cosmos.gov.v1beta1.MsgVote"),
			other => panic!("expected unsupported, got {:?}", other),
		}
	}

	#[test]
	fn test_parser_failure_is_localized() {
		let registry = MessageRegistry::default();
		let value = json!({
			"@type": "/cosmos.bank.v1beta1.MsgSend",
			"from_address": "cosmos1sender"
		});
		match registry.parse_value(&value) {
			Message::ParseError(msg) => {
				assert_eq!(msg.type_tag, "/cosmos.bank.v1beta1.MsgSend");
				assert!(msg.reason.contains("amount"));
			}
			other => panic!("expected parse error, got {:?}", other),
		}
	}

	#[test]
	fn test_exec_recurses_through_registry() {
		let registry = MessageRegistry::default();
		let value = json!({
			"@type": "/cosmos.authz.v1beta1.MsgExec",
			"grantee": "cosmos1grantee",
			"msgs": [
				{
					"@type": "/cosmos.bank.v1beta1.MsgSend",
					"from_address": "cosmos1sender",
					"to_address": "cosmos1recipient",
					"amount": [{"amount": "5", "denom": "uatom"}]
				},
				{"@type": "/cosmos.gov.v1beta1.MsgVote"}
			]
		});
		match registry.parse_value(&value) {
			Message::Exec(msg) => {
				assert_eq!(msg.messages.len(), 2);
				assert!(matches!(msg.messages[0], Message::Transfer(_)));
				assert!(matches!(msg.messages[1], Message::Unsupported(_)));
			}
			other => panic!("expected exec, got {:?}", other),
		}
	}

	#[test]
	fn test_custom_parser_registration() {
		let mut registry = MessageRegistry::new();
		registry.register("/custom.Msg", |_, _| {
			Ok(Message::Unsupported(UnsupportedMessage {
				type_tag: "custom".to_string(),
			}))
		});
		let parsed = registry.parse("/custom.Msg", &json!({}));
		assert_eq!(parsed.type_tag(), "custom");
	}
}
