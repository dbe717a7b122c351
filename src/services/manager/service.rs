//! Fan-in of every protocol client into one deduplicated report stream.
//!
//! Redundant node connections per chain exist for availability, so the
//! same on-chain transaction arrives once per connected node. Dedup by
//! content hash is therefore mandatory, not an optimization: without it
//! every event would be delivered once per node.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tracing::{info, trace, warn};

use crate::{
	models::{Chain, MessageRegistry, Report},
	services::{
		client::NodeClient,
		manager::{dedup::DedupCache, error::ManagerError},
	},
	utils::metrics,
};

/// Capacity of the shared fan-in output channel
const OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// Owns one protocol client per (chain, node endpoint) pair and merges
/// their reports into a single deduplicated output stream.
pub struct NodeManager {
	clients: Vec<NodeClient>,
	dedup: Arc<Mutex<DedupCache>>,
}

impl NodeManager {
	/// Builds the client fleet for every configured chain
	pub fn new(
		chains: &HashMap<String, Chain>,
		registry: Arc<MessageRegistry>,
		dedup_window: usize,
	) -> Self {
		let mut clients = Vec::new();
		for chain in chains.values() {
			for node in &chain.nodes {
				clients.push(NodeClient::new(
					chain.name.clone(),
					node.clone(),
					chain.queries.clone(),
					registry.clone(),
				));
			}
		}

		Self {
			clients,
			dedup: Arc::new(Mutex::new(DedupCache::new(dedup_window))),
		}
	}

	pub fn client_count(&self) -> usize {
		self.clients.len()
	}

	/// Starts every client concurrently plus one forwarding task per
	/// client, and returns the single deduplicated output stream.
	pub fn listen(&mut self) -> Result<mpsc::Receiver<Report>, ManagerError> {
		let (output_tx, output_rx) = mpsc::channel(OUTPUT_CHANNEL_CAPACITY);

		for client in &mut self.clients {
			let client_rx = client.start().map_err(|e| {
				ManagerError::start_error(format!("failed to start client for {}: {}", client.node(), e))
			})?;

			tokio::spawn(forward_reports(
				client_rx,
				output_tx.clone(),
				self.dedup.clone(),
			));
		}

		info!(clients = self.clients.len(), "Node manager listening");
		Ok(output_rx)
	}

	/// Stops every client; individual stop failures are logged so one
	/// stuck node never blocks shutdown of the others.
	pub async fn stop(&mut self) {
		for client in &mut self.clients {
			if let Err(e) = client.stop().await {
				warn!(node = client.node(), error = %e, "Failed to stop client");
			}
		}
		info!("Node manager stopped");
	}
}

/// Forwards one client's reports to the shared output, dropping
/// duplicates.
///
/// The lock is held across the whole test-forward-insert sequence:
/// releasing it between the membership test and the insert would let
/// two concurrent duplicates both pass the test before either records
/// its hash.
pub async fn forward_reports(
	mut client_rx: mpsc::Receiver<Report>,
	output: mpsc::Sender<Report>,
	dedup: Arc<Mutex<DedupCache>>,
) {
	while let Some(report) = client_rx.recv().await {
		let hash = report.event.hash().to_string();

		let mut cache = dedup.lock().await;
		if cache.contains(&hash) {
			trace!(
				chain = report.chain.as_str(),
				node = report.node.as_str(),
				hash = hash.as_str(),
				"Dropping duplicate report"
			);
			metrics::REPORTS_DEDUPLICATED
				.with_label_values(&[report.chain.as_str()])
				.inc();
			continue;
		}

		let chain = report.chain.clone();
		if output.send(report).await.is_err() {
			// Consumer is gone; shutting down
			return;
		}
		cache.insert(hash);
		drop(cache);

		trace!(chain = chain.as_str(), "Forwarded report");
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::models::{Event, TransactionErrorEvent};

	fn report(error: &str) -> Report {
		Report {
			chain: "testchain".to_string(),
			node: "ws://localhost:26657/websocket".to_string(),
			event: Event::TransactionError(TransactionErrorEvent::new(error)),
		}
	}

	#[tokio::test]
	async fn test_forward_drops_duplicates() {
		let (client_tx, client_rx) = mpsc::channel(16);
		let (output_tx, mut output_rx) = mpsc::channel(16);
		let dedup = Arc::new(Mutex::new(DedupCache::new(10)));

		let forwarder = tokio::spawn(forward_reports(client_rx, output_tx, dedup));

		client_tx.send(report("same")).await.unwrap();
		client_tx.send(report("same")).await.unwrap();
		client_tx.send(report("other")).await.unwrap();
		drop(client_tx);
		forwarder.await.unwrap();

		let first = output_rx.recv().await.unwrap();
		let second = output_rx.recv().await.unwrap();
		assert!(output_rx.recv().await.is_none());
		assert_ne!(first.event.hash(), second.event.hash());
	}

	#[tokio::test]
	async fn test_manager_builds_one_client_per_node() {
		let mut chains = HashMap::new();
		chains.insert(
			"testchain".to_string(),
			Chain {
				name: "testchain".to_string(),
				nodes: vec![
					"ws://127.0.0.1:1/websocket".to_string(),
					"ws://127.0.0.1:2/websocket".to_string(),
				],
				queries: vec!["tm.event='Tx'".to_string()],
				subscriptions: vec![],
			},
		);

		let manager = NodeManager::new(&chains, Arc::new(MessageRegistry::default()), 100);
		assert_eq!(manager.client_count(), 2);
	}

	#[tokio::test]
	async fn test_manager_listen_and_stop() {
		let mut chains = HashMap::new();
		chains.insert(
			"testchain".to_string(),
			Chain {
				name: "testchain".to_string(),
				nodes: vec!["ws://127.0.0.1:1/websocket".to_string()],
				queries: vec!["tm.event='Tx'".to_string()],
				subscriptions: vec![],
			},
		);

		let mut manager = NodeManager::new(&chains, Arc::new(MessageRegistry::default()), 100);
		let mut rx = manager.listen().unwrap();

		// The unreachable node surfaces as a connection error report
		let report = tokio::time::timeout(std::time::Duration::from_secs(5), rx.recv())
			.await
			.expect("expected a report before timeout")
			.expect("channel closed");
		assert!(matches!(report.event, Event::NodeConnectionError(_)));

		manager.stop().await;
	}

	#[tokio::test]
	async fn test_stop_completes_with_undrained_receiver() {
		let mut chains = HashMap::new();
		chains.insert(
			"testchain".to_string(),
			Chain {
				name: "testchain".to_string(),
				nodes: vec!["ws://127.0.0.1:1/websocket".to_string()],
				queries: vec!["tm.event='Tx'".to_string()],
				subscriptions: vec![],
			},
		);

		let mut manager = NodeManager::new(&chains, Arc::new(MessageRegistry::default()), 100);
		let rx = manager.listen().unwrap();

		// The consumer never drains the stream; stop must still finish
		// because dropping the receiver fails any pending forwards
		drop(rx);
		tokio::time::timeout(std::time::Duration::from_secs(5), manager.stop())
			.await
			.expect("stop did not complete with an undrained receiver");
	}
}
