//! Per-subscription report filtering.
//!
//! Given a report and the subscriptions configured for its chain, the
//! filterer decides which (subscription, event) pairs are delivered:
//! error-visibility flags for error events, failed-transaction and
//! stale-height suppression for transactions, then recursive rule
//! matching over the message tree.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::{
	models::{Event, Message, Report, Subscription, TransactionEvent},
	services::filter::error::FilterError,
	utils::{matches_any, metrics},
};

/// A delivery decision: one subscription paired with the (possibly
/// trimmed) event it should receive.
#[derive(Debug, Clone)]
pub struct SubscriptionMatch {
	pub subscription: Subscription,
	pub event: Event,
}

/// Evaluates reports against subscription rule sets.
///
/// Height watermarks are mutated only by the single sequential consumer
/// loop, so they need no lock; do not evaluate reports for the same
/// chain concurrently without adding synchronization.
pub struct FilterService {
	/// Last-seen transaction height per chain, monotonically
	/// non-decreasing once set
	watermarks: HashMap<String, u64>,
}

impl FilterService {
	pub fn new() -> Self {
		Self {
			watermarks: HashMap::new(),
		}
	}

	/// Current watermark for a chain, zero when unset
	pub fn watermark(&self, chain: &str) -> u64 {
		self.watermarks.get(chain).copied().unwrap_or(0)
	}

	/// Decides which subscriptions receive this report.
	///
	/// An unparsable transaction height is returned as an error; the
	/// caller decides whether to treat it as fatal (the orchestrator
	/// does, since continuing would corrupt the watermark invariant).
	pub fn filter_report(
		&mut self,
		report: &Report,
		subscriptions: &[Subscription],
	) -> Result<Vec<SubscriptionMatch>, FilterError> {
		match &report.event {
			Event::Transaction(tx) => self.filter_transaction(report, tx, subscriptions),
			Event::TransactionError(_) | Event::NodeConnectionError(_) => {
				Ok(self.filter_error_event(report, subscriptions))
			}
		}
	}

	/// Error events are included per subscription iff its error flag is
	/// set, independent of every other rule.
	fn filter_error_event(
		&self,
		report: &Report,
		subscriptions: &[Subscription],
	) -> Vec<SubscriptionMatch> {
		let mut matches = Vec::new();
		for subscription in subscriptions {
			if subscription.log_errors {
				matches.push(SubscriptionMatch {
					subscription: subscription.clone(),
					event: report.event.clone(),
				});
				record_matched(report);
			} else {
				record_filtered(report);
			}
		}
		matches
	}

	fn filter_transaction(
		&mut self,
		report: &Report,
		tx: &TransactionEvent,
		subscriptions: &[Subscription],
	) -> Result<Vec<SubscriptionMatch>, FilterError> {
		let height: u64 = tx.height.parse().map_err(|e| {
			FilterError::height_parse_error(format!(
				"chain {} tx {}: invalid height {:?}: {}",
				report.chain, tx.hash, tx.height, e
			))
		})?;

		// The watermark is per chain and shared by every subscription on
		// it; first observed wins since delivery order is not globally
		// sorted by height across nodes.
		let watermark = self.watermarks.entry(report.chain.clone()).or_insert(0);
		if *watermark != 0 && *watermark > height {
			trace!(
				chain = report.chain.as_str(),
				height,
				watermark = *watermark,
				"Dropping stale height"
			);
			for _ in subscriptions {
				record_filtered(report);
			}
			return Ok(Vec::new());
		}
		if height > *watermark {
			*watermark = height;
		}

		let mut matches = Vec::new();
		for subscription in subscriptions {
			if tx.is_failed() && !subscription.log_failed_transactions {
				debug!(
					subscription = subscription.name.as_str(),
					hash = tx.hash.as_str(),
					"Dropping failed transaction"
				);
				record_filtered(report);
				continue;
			}

			let surviving: Vec<Message> = tx
				.messages
				.iter()
				.filter_map(|message| filter_message(message, subscription, false))
				.collect();

			// A transaction with no surviving messages carries nothing
			// reportable for this subscription
			if surviving.is_empty() {
				record_filtered(report);
				continue;
			}

			let mut delivered = tx.clone();
			delivered.messages = surviving;
			matches.push(SubscriptionMatch {
				subscription: subscription.clone(),
				event: Event::Transaction(delivered),
			});
			record_matched(report);
		}

		Ok(matches)
	}
}

impl Default for FilterService {
	fn default() -> Self {
		Self::new()
	}
}

/// Recursively filters one message for one subscription.
///
/// Rules always apply to top-level messages; nested messages are rule-
/// checked only when the subscription opts in via
/// `filter_internal_messages` — a container's outer action may be the
/// event of interest even when its payload would not individually match
/// a narrow filter. A container whose children all get dropped is
/// dropped itself.
fn filter_message(
	message: &Message,
	subscription: &Subscription,
	internal: bool,
) -> Option<Message> {
	if message.is_unknown() {
		return subscription.log_unknown_messages.then(|| message.clone());
	}

	let apply_rules = !internal || subscription.filter_internal_messages;
	if apply_rules && !matches_any(&message.attributes(), &subscription.expressions) {
		return None;
	}

	match message.children() {
		None => Some(message.clone()),
		Some(children) => {
			let surviving: Vec<Message> = children
				.iter()
				.filter_map(|child| filter_message(child, subscription, true))
				.collect();
			if surviving.is_empty() {
				None
			} else {
				Some(message.with_children(surviving))
			}
		}
	}
}

fn record_matched(report: &Report) {
	metrics::REPORTS_MATCHED
		.with_label_values(&[report.chain.as_str(), &report.event.kind().to_string()])
		.inc();
}

fn record_filtered(report: &Report) {
	metrics::REPORTS_FILTERED
		.with_label_values(&[report.chain.as_str(), &report.event.kind().to_string()])
		.inc();
}
