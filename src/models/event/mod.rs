//! Typed representations of everything the pipeline transports:
//! reports, events, transaction messages, and the parser registry
//! that decodes wire messages into the typed hierarchy.

mod message;
mod registry;
mod report;

pub use message::{
	ExecMessage, Message, MessageParseError, TransferMessage, UnsupportedMessage,
	WithdrawRewardMessage,
};
pub use registry::{MessageParser, MessageRegistry};
pub use report::{
	content_hash, Event, EventKind, NodeConnectionErrorEvent, Report, TransactionErrorEvent,
	TransactionEvent,
};
