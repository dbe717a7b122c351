//! Wire frame decoding.
//!
//! Inbound frames are JSON-RPC envelopes; transaction events carry a
//! `TxResult` payload whose `tx` field is the base64 raw transaction.
//! The content hash over those raw bytes is the event's stable identity
//! across every node reporting the same transaction.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;
use thiserror::Error;

use crate::models::{
	content_hash, Event, MessageRegistry, TransactionErrorEvent, TransactionEvent,
};

/// Errors produced while decoding an inbound frame.
///
/// Callers convert these into `TransactionError` events; a malformed
/// frame is never retried and never tears down the connection.
#[derive(Debug, Error)]
pub enum DecodeError {
	#[error("malformed frame: {0}")]
	MalformedFrame(String),
	#[error("malformed transaction payload: {0}")]
	MalformedPayload(String),
}

/// Decodes one inbound frame into an optional event.
///
/// Returns `Ok(None)` for frames carrying no transaction payload
/// (subscription acks, non-transaction events), which are silently
/// dropped upstream.
pub fn decode_frame(raw: &str, registry: &MessageRegistry) -> Result<Option<Event>, DecodeError> {
	let frame: Value =
		serde_json::from_str(raw).map_err(|e| DecodeError::MalformedFrame(e.to_string()))?;

	// A protocol-level error is observable data, not a decode failure
	if let Some(error) = frame.get("error") {
		let message = error
			.get("message")
			.and_then(Value::as_str)
			.unwrap_or("unknown protocol error");
		let data = error.get("data").and_then(Value::as_str).unwrap_or("");
		return Ok(Some(Event::TransactionError(TransactionErrorEvent::new(
			format!("{}: {}", message, data),
		))));
	}

	let tx_result = match frame.pointer("/result/data/value/TxResult") {
		Some(value) => value,
		None => return Ok(None),
	};

	decode_tx_result(tx_result, registry).map(Some)
}

fn decode_tx_result(tx_result: &Value, registry: &MessageRegistry) -> Result<Event, DecodeError> {
	let height = tx_result
		.get("height")
		.and_then(Value::as_str)
		.ok_or_else(|| DecodeError::MalformedPayload("missing height".to_string()))?
		.to_string();

	let tx_base64 = tx_result
		.get("tx")
		.and_then(Value::as_str)
		.ok_or_else(|| DecodeError::MalformedPayload("missing tx bytes".to_string()))?;

	let tx_bytes = BASE64
		.decode(tx_base64)
		.map_err(|e| DecodeError::MalformedPayload(format!("invalid tx encoding: {}", e)))?;

	// Hash the raw bytes before envelope decoding; the identity must not
	// depend on how much of the payload we understand
	let hash = content_hash(&tx_bytes);

	let body: Value = serde_json::from_slice(&tx_bytes)
		.map_err(|e| DecodeError::MalformedPayload(format!("invalid tx body: {}", e)))?;

	let memo = body
		.pointer("/body/memo")
		.and_then(Value::as_str)
		.unwrap_or_default()
		.to_string();

	let messages = body
		.pointer("/body/messages")
		.and_then(Value::as_array)
		.map(|msgs| msgs.iter().map(|msg| registry.parse_value(msg)).collect())
		.unwrap_or_default();

	// An out-of-range code saturates instead of truncating: truncation
	// could map a failure code onto 0 and pass it off as a success
	let code = tx_result
		.pointer("/result/code")
		.and_then(Value::as_u64)
		.map(|code| u32::try_from(code).unwrap_or(u32::MAX))
		.unwrap_or(0);

	Ok(Event::Transaction(TransactionEvent {
		hash,
		height,
		memo,
		messages,
		code,
	}))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::Message;
	use serde_json::json;

	fn tx_frame(height: &str, body: Value, code: u32) -> String {
		let tx = BASE64.encode(body.to_string());
		json!({
			"jsonrpc": "2.0",
			"id": 0,
			"result": {
				"query": "tm.event='Tx'",
				"data": {
					"type": "tendermint/event/Tx",
					"value": {
						"TxResult": {
							"height": height,
							"tx": tx,
							"result": {"code": code, "log": ""}
						}
					}
				}
			}
		})
		.to_string()
	}

	fn transfer_body(memo: &str) -> Value {
		json!({
			"body": {
				"memo": memo,
				"messages": [{
					"@type": "/cosmos.bank.v1beta1.MsgSend",
					"from_address": "cosmos1sender",
					"to_address": "cosmos1recipient",
					"amount": [{"amount": "1000", "denom": "uatom"}]
				}]
			}
		})
	}

	#[test]
	fn test_decode_transaction_frame() {
		let registry = MessageRegistry::default();
		let raw = tx_frame("4521", transfer_body("rent"), 0);

		let event = decode_frame(&raw, &registry).unwrap().unwrap();
		match event {
			Event::Transaction(tx) => {
				assert_eq!(tx.height, "4521");
				assert_eq!(tx.memo, "rent");
				assert_eq!(tx.code, 0);
				assert_eq!(tx.messages.len(), 1);
				assert!(matches!(tx.messages[0], Message::Transfer(_)));
			}
			other => panic!("expected transaction, got {:?}", other),
		}
	}

	#[test]
	fn test_decode_hash_is_stable_across_nodes() {
		let registry = MessageRegistry::default();
		let raw = tx_frame("10", transfer_body(""), 0);
		let a = decode_frame(&raw, &registry).unwrap().unwrap();
		let b = decode_frame(&raw, &registry).unwrap().unwrap();
		assert_eq!(a.hash(), b.hash());
	}

	#[test]
	fn test_decode_failed_transaction_code() {
		let registry = MessageRegistry::default();
		let raw = tx_frame("77", transfer_body(""), 5);
		match decode_frame(&raw, &registry).unwrap().unwrap() {
			Event::Transaction(tx) => assert_eq!(tx.code, 5),
			other => panic!("expected transaction, got {:?}", other),
		}
	}

	#[test]
	fn test_decode_out_of_range_code_saturates() {
		let registry = MessageRegistry::default();
		let tx = BASE64.encode(transfer_body("").to_string());
		// 2^32 would truncate to 0 and masquerade as a success
		let raw = json!({
			"jsonrpc": "2.0",
			"result": {
				"data": {
					"value": {
						"TxResult": {
							"height": "9",
							"tx": tx,
							"result": {"code": 4294967296u64, "log": ""}
						}
					}
				}
			}
		})
		.to_string();

		match decode_frame(&raw, &registry).unwrap().unwrap() {
			Event::Transaction(tx) => {
				assert_eq!(tx.code, u32::MAX);
				assert!(tx.is_failed());
			}
			other => panic!("expected transaction, got {:?}", other),
		}
	}

	#[test]
	fn test_decode_protocol_error_frame() {
		let registry = MessageRegistry::default();
		let raw = json!({
			"jsonrpc": "2.0",
			"id": 0,
			"error": {"code": -32603, "message": "Internal error", "data": "subscription failed"}
		})
		.to_string();

		match decode_frame(&raw, &registry).unwrap().unwrap() {
			Event::TransactionError(err) => {
				assert!(err.error.contains("Internal error"));
				assert!(err.error.contains("subscription failed"));
			}
			other => panic!("expected transaction error, got {:?}", other),
		}
	}

	#[test]
	fn test_decode_subscribe_ack_is_dropped() {
		let registry = MessageRegistry::default();
		let raw = json!({"jsonrpc": "2.0", "id": 0, "result": {}}).to_string();
		assert!(decode_frame(&raw, &registry).unwrap().is_none());
	}

	#[test]
	fn test_decode_non_transaction_event_is_dropped() {
		let registry = MessageRegistry::default();
		let raw = json!({
			"jsonrpc": "2.0",
			"id": 0,
			"result": {
				"query": "tm.event='NewBlock'",
				"data": {"type": "tendermint/event/NewBlock", "value": {}}
			}
		})
		.to_string();
		assert!(decode_frame(&raw, &registry).unwrap().is_none());
	}

	#[test]
	fn test_decode_unparseable_frame_is_error() {
		let registry = MessageRegistry::default();
		assert!(matches!(
			decode_frame("not json", &registry),
			Err(DecodeError::MalformedFrame(_))
		));
	}

	#[test]
	fn test_decode_invalid_tx_bytes_is_payload_error() {
		let registry = MessageRegistry::default();
		let raw = json!({
			"jsonrpc": "2.0",
			"result": {
				"data": {
					"value": {
						"TxResult": {"height": "1", "tx": "!!!not-base64!!!", "result": {"code": 0}}
					}
				}
			}
		})
		.to_string();
		assert!(matches!(
			decode_frame(&raw, &registry),
			Err(DecodeError::MalformedPayload(_))
		));
	}

	#[test]
	fn test_decode_message_failure_does_not_fail_transaction() {
		let registry = MessageRegistry::default();
		let body = json!({
			"body": {
				"memo": "",
				"messages": [
					{
						"@type": "/cosmos.bank.v1beta1.MsgSend",
						"from_address": "cosmos1sender"
					},
					{
						"@type": "/cosmos.bank.v1beta1.MsgSend",
						"from_address": "cosmos1sender",
						"to_address": "cosmos1recipient",
						"amount": [{"amount": "1", "denom": "uatom"}]
					}
				]
			}
		});
		let raw = tx_frame("3", body, 0);
		match decode_frame(&raw, &registry).unwrap().unwrap() {
			Event::Transaction(tx) => {
				assert_eq!(tx.messages.len(), 2);
				assert!(matches!(tx.messages[0], Message::ParseError(_)));
				assert!(matches!(tx.messages[1], Message::Transfer(_)));
			}
			other => panic!("expected transaction, got {:?}", other),
		}
	}
}
