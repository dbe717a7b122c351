//! Domain models and data structures for chain monitoring.
//!
//! This module contains all the core data structures used throughout the
//! application:
//!
//! - `config`: Configuration loading and validation
//! - `core`: Chain and subscription configuration models
//! - `event`: Reports, events, messages, and the message parser registry

mod config;
mod core;
mod event;

pub use config::{ConfigError, ConfigLoader};
pub use core::{Chain, NotifyConfig, Subscription, DEFAULT_QUERY};
pub use event::{
	content_hash, Event, EventKind, ExecMessage, Message, MessageParseError, MessageParser,
	MessageRegistry, NodeConnectionErrorEvent, Report, TransactionErrorEvent, TransactionEvent,
	TransferMessage, UnsupportedMessage, WithdrawRewardMessage,
};
