//! Metrics for the application.
//!
//! - Holds the global Prometheus registry.
//! - Defines pipeline counters, labelled by chain and event kind.
//!
//! Counters are observability only and never affect control flow.

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, Opts, Registry, TextEncoder};

lazy_static! {
	// Global Prometheus registry.
	pub static ref REGISTRY: Registry = Registry::new();

	// Reports that matched at least one subscription rule set.
	pub static ref REPORTS_MATCHED: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("reports_matched_total", "Reports matched per chain and event kind"),
			&["chain", "kind"],
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Reports dropped by subscription filtering.
	pub static ref REPORTS_FILTERED: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("reports_filtered_total", "Reports filtered per chain and event kind"),
			&["chain", "kind"],
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Reports dropped as duplicates across redundant node connections.
	pub static ref REPORTS_DEDUPLICATED: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("reports_deduplicated_total", "Duplicate reports dropped per chain"),
			&["chain"],
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};

	// Delivery attempts that failed, per subscription target.
	pub static ref DELIVERY_FAILURES: CounterVec = {
		let counter = CounterVec::new(
			Opts::new("delivery_failures_total", "Failed delivery attempts per subscription"),
			&["chain", "subscription"],
		)
		.unwrap();
		REGISTRY.register(Box::new(counter.clone())).unwrap();
		counter
	};
}

/// Gathers all registered metrics in the Prometheus text format
pub fn gather_metrics() -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
	let encoder = TextEncoder::new();
	let mut buffer = Vec::new();
	encoder.encode(&REGISTRY.gather(), &mut buffer)?;
	Ok(String::from_utf8(buffer)?)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_counters_register_and_gather() {
		REPORTS_MATCHED
			.with_label_values(&["testchain", "transaction"])
			.inc();
		REPORTS_FILTERED
			.with_label_values(&["testchain", "transaction"])
			.inc();
		REPORTS_DEDUPLICATED.with_label_values(&["testchain"]).inc();

		let output = gather_metrics().unwrap();
		assert!(output.contains("reports_matched_total"));
		assert!(output.contains("reports_filtered_total"));
		assert!(output.contains("reports_deduplicated_total"));
	}
}
