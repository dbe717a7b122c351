//! Bootstrap module for initializing services and running the pipeline.
//!
//! Wires the configuration repositories into the runtime services and
//! provides the report-processing step used by the main loop.
//!
//! # Services
//! - `NodeManager`: owns the protocol client fleet and the dedup fan-in
//! - `FilterService`: per-subscription matching and watermark tracking
//! - `NotificationService`: delivery of matched events

use std::{collections::HashMap, error::Error, path::Path, sync::Arc};

use tracing::{debug, info};

use crate::{
	models::{Chain, MessageRegistry, Report},
	repositories::{ChainRepository, ChainService},
	services::{
		filter::{FilterError, FilterService},
		manager::NodeManager,
		notification::NotificationService,
	},
};

/// Type alias for handling service results
pub type Result<T> = std::result::Result<T, Box<dyn Error + Send + Sync>>;

/// Everything the main loop needs, built from configuration
pub struct Services {
	pub chains: HashMap<String, Chain>,
	pub manager: NodeManager,
	pub filter: FilterService,
	pub notifier: NotificationService,
}

/// Initializes all required services from the chain configuration
/// directory (`config/chains` by default).
pub fn initialize_services(
	config_path: Option<&Path>,
	dedup_window: usize,
) -> Result<Services> {
	let chain_service = ChainService::<ChainRepository>::new(config_path)?;
	let chains = chain_service.get_all();

	let registry = Arc::new(MessageRegistry::default());
	let manager = NodeManager::new(&chains, registry, dedup_window);

	info!(
		chains = chains.len(),
		clients = manager.client_count(),
		dedup_window,
		"Services initialized"
	);

	Ok(Services {
		chains,
		manager,
		filter: FilterService::new(),
		notifier: NotificationService::new(),
	})
}

/// Processes one report end to end: filter it against the originating
/// chain's subscriptions and dispatch every match independently.
///
/// A height parse failure is returned to the caller, which treats it as
/// fatal; every other outcome is handled here.
pub async fn process_report(
	report: &Report,
	chains: &HashMap<String, Chain>,
	filter: &mut FilterService,
	notifier: &NotificationService,
) -> std::result::Result<usize, FilterError> {
	let subscriptions = match chains.get(&report.chain) {
		Some(chain) => &chain.subscriptions,
		None => {
			debug!(chain = report.chain.as_str(), "Report for unknown chain");
			return Ok(0);
		}
	};

	let matches = filter.filter_report(report, subscriptions)?;
	let delivered = matches.len();

	for subscription_match in &matches {
		// Deliveries are independent; a failed send is logged inside the
		// notifier and never blocks the remaining subscriptions
		notifier.execute(subscription_match, &report.chain).await;
	}

	Ok(delivered)
}
