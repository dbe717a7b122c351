//! Reportable events and their provenance envelope.
//!
//! Every observable outcome of a node connection, healthy or not, flows
//! through the pipeline as an [`Event`] so that operational problems are
//! visible through the same filtering and delivery path as transactions.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::Message;

/// Routing tag for an event variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum EventKind {
	Transaction,
	TransactionError,
	NodeConnectionError,
}

impl std::fmt::Display for EventKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			EventKind::Transaction => write!(f, "transaction"),
			EventKind::TransactionError => write!(f, "transaction_error"),
			EventKind::NodeConnectionError => write!(f, "node_connection_error"),
		}
	}
}

/// A decoded on-chain transaction.
///
/// The height is kept as the wire string; the filterer parses it when
/// applying watermark checks.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionEvent {
	/// Content hash over the raw transaction bytes (upper hex sha256)
	pub hash: String,
	pub height: String,
	pub memo: String,
	pub messages: Vec<Message>,
	/// Result code, zero on success
	pub code: u32,
}

/// A decode or node-reported error, not tied to a height
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TransactionErrorEvent {
	pub hash: String,
	pub error: String,
}

/// A connectivity failure for a specific node
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct NodeConnectionErrorEvent {
	pub hash: String,
	pub node: String,
	pub error: String,
}

impl TransactionEvent {
	pub fn is_failed(&self) -> bool {
		self.code != 0
	}
}

impl TransactionErrorEvent {
	pub fn new(error: impl Into<String>) -> Self {
		let error = error.into();
		Self {
			hash: content_hash(error.as_bytes()),
			error,
		}
	}
}

impl NodeConnectionErrorEvent {
	pub fn new(node: impl Into<String>, error: impl Into<String>) -> Self {
		let node = node.into();
		let error = error.into();
		Self {
			hash: content_hash(format!("{}:{}", node, error).as_bytes()),
			node,
			error,
		}
	}
}

/// Anything a protocol client can report downstream
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub enum Event {
	Transaction(TransactionEvent),
	TransactionError(TransactionErrorEvent),
	NodeConnectionError(NodeConnectionErrorEvent),
}

impl Event {
	/// Stable content hash used as the dedup identity
	pub fn hash(&self) -> &str {
		match self {
			Event::Transaction(tx) => &tx.hash,
			Event::TransactionError(err) => &err.hash,
			Event::NodeConnectionError(err) => &err.hash,
		}
	}

	pub fn kind(&self) -> EventKind {
		match self {
			Event::Transaction(_) => EventKind::Transaction,
			Event::TransactionError(_) => EventKind::TransactionError,
			Event::NodeConnectionError(_) => EventKind::NodeConnectionError,
		}
	}
}

/// Envelope pairing an event with its chain/node provenance.
///
/// Equality for dedup purposes is defined by the event's content hash
/// only; chain and node are provenance, not identity.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Report {
	pub chain: String,
	pub node: String,
	pub event: Event,
}

/// Upper hex sha256, matching the node's own transaction hash rendering
pub fn content_hash(bytes: &[u8]) -> String {
	hex::encode_upper(Sha256::digest(bytes))
}
