//! Reconnecting protocol client for one node endpoint.
//!
//! Each client owns one streaming connection, subscribes to the chain's
//! configured stream queries, decodes inbound frames into typed events,
//! and emits them as reports. Connection loss triggers an automatic
//! reconnect of the full connect/subscribe sequence; transport and
//! decode failures surface as events so downstream consumers observe
//! connectivity health as data.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::{
	connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};
use tracing::{debug, info, trace, warn};

use crate::{
	models::{Event, MessageRegistry, NodeConnectionErrorEvent, Report, TransactionErrorEvent},
	services::client::{decoder::decode_frame, error::ClientError},
};

/// Delay between reconnect attempts
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Capacity of the per-client report channel
const REPORT_CHANNEL_CAPACITY: usize = 64;

/// Lifecycle states of a node client connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
	Disconnected,
	Connecting,
	Subscribed,
	Listening,
	Error,
	Stopped,
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// One protocol client per (chain, node endpoint) pair.
///
/// TLS is decided by the endpoint URL scheme: `wss://` endpoints are
/// upgraded by the transport during the connect handshake.
pub struct NodeClient {
	chain: String,
	node: String,
	queries: Vec<String>,
	registry: Arc<MessageRegistry>,
	state: Arc<Mutex<ConnectionState>>,
	initial_error: Arc<Mutex<Option<String>>>,
	shutdown: Option<watch::Sender<bool>>,
	handle: Option<JoinHandle<()>>,
}

impl NodeClient {
	pub fn new(
		chain: impl Into<String>,
		node: impl Into<String>,
		queries: Vec<String>,
		registry: Arc<MessageRegistry>,
	) -> Self {
		Self {
			chain: chain.into(),
			node: node.into(),
			queries,
			registry,
			state: Arc::new(Mutex::new(ConnectionState::Disconnected)),
			initial_error: Arc::new(Mutex::new(None)),
			shutdown: None,
			handle: None,
		}
	}

	pub fn chain(&self) -> &str {
		&self.chain
	}

	pub fn node(&self) -> &str {
		&self.node
	}

	/// Current lifecycle state
	pub fn state(&self) -> ConnectionState {
		*self.state.lock().unwrap_or_else(|e| e.into_inner())
	}

	/// Outcome of the initial connection attempt only; later reconnects
	/// do not update this health field.
	pub fn initial_error(&self) -> Option<String> {
		self.initial_error
			.lock()
			.unwrap_or_else(|e| e.into_inner())
			.clone()
	}

	/// Starts the connection loop and returns the client's report stream
	pub fn start(&mut self) -> Result<mpsc::Receiver<Report>, ClientError> {
		if self.handle.is_some() {
			return Err(ClientError::lifecycle_error(format!(
				"client for {} already started",
				self.node
			)));
		}

		let (report_tx, report_rx) = mpsc::channel(REPORT_CHANNEL_CAPACITY);
		let (shutdown_tx, shutdown_rx) = watch::channel(false);

		let worker = ClientWorker {
			chain: self.chain.clone(),
			node: self.node.clone(),
			queries: self.queries.clone(),
			registry: self.registry.clone(),
			state: self.state.clone(),
			initial_error: self.initial_error.clone(),
			reports: report_tx,
		};

		self.shutdown = Some(shutdown_tx);
		self.handle = Some(tokio::spawn(worker.run(shutdown_rx)));

		Ok(report_rx)
	}

	/// Signals the connection loop to stop and waits for it to finish.
	/// Errors while closing the connection are logged, never propagated.
	pub async fn stop(&mut self) -> Result<(), ClientError> {
		let shutdown = self
			.shutdown
			.take()
			.ok_or_else(|| ClientError::lifecycle_error("client was never started"))?;

		let _ = shutdown.send(true);

		if let Some(handle) = self.handle.take() {
			if let Err(e) = handle.await {
				warn!(node = self.node.as_str(), error = %e, "Client task ended abnormally");
			}
		}

		self.set_state(ConnectionState::Stopped);
		Ok(())
	}

	fn set_state(&self, next: ConnectionState) {
		*self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
	}
}

/// Everything the spawned connection loop needs, detached from the
/// client handle so `stop` can run concurrently with the loop.
struct ClientWorker {
	chain: String,
	node: String,
	queries: Vec<String>,
	registry: Arc<MessageRegistry>,
	state: Arc<Mutex<ConnectionState>>,
	initial_error: Arc<Mutex<Option<String>>>,
	reports: mpsc::Sender<Report>,
}

impl ClientWorker {
	async fn run(self, mut shutdown: watch::Receiver<bool>) {
		let mut first_attempt = true;

		loop {
			if *shutdown.borrow() {
				break;
			}

			self.set_state(ConnectionState::Connecting);

			match connect_async(self.node.as_str()).await {
				Ok((stream, _)) => {
					if first_attempt {
						self.record_initial_outcome(None);
					}
					info!(
						chain = self.chain.as_str(),
						node = self.node.as_str(),
						"Connected"
					);
					match self.run_session(stream, &mut shutdown).await {
						SessionEnd::Shutdown => break,
						SessionEnd::ConnectionLost(reason) => {
							self.set_state(ConnectionState::Error);
							warn!(
								node = self.node.as_str(),
								reason = reason.as_str(),
								"Connection lost, reconnecting"
							);
							if !self.emit_connection_error(&reason).await {
								break;
							}
						}
					}
				}
				Err(e) => {
					let reason = e.to_string();
					if first_attempt {
						self.record_initial_outcome(Some(reason.clone()));
					}
					self.set_state(ConnectionState::Error);
					warn!(
						node = self.node.as_str(),
						error = reason.as_str(),
						"Connection attempt failed"
					);
					if !self.emit_connection_error(&reason).await {
						break;
					}
				}
			}

			first_attempt = false;

			tokio::select! {
				changed = shutdown.changed() => {
					// A dropped sender means the client handle is gone;
					// treat it the same as an explicit stop
					if changed.is_err() || *shutdown.borrow() {
						break;
					}
				}
				_ = tokio::time::sleep(RECONNECT_DELAY) => {}
			}
		}

		self.set_state(ConnectionState::Stopped);
		debug!(node = self.node.as_str(), "Client loop finished");
	}

	/// Subscribes the configured queries and pumps inbound frames until
	/// shutdown or connection loss.
	async fn run_session(
		&self,
		stream: WsStream,
		shutdown: &mut watch::Receiver<bool>,
	) -> SessionEnd {
		let (mut write, mut read) = stream.split();

		// Each session re-issues the clean subscription set; nothing is
		// carried over from a previous connection.
		self.set_state(ConnectionState::Subscribed);
		for (id, query) in self.queries.iter().enumerate() {
			let frame = serde_json::json!({
				"jsonrpc": "2.0",
				"method": "subscribe",
				"id": id,
				"params": {"query": query}
			});
			// One failing filter must not abort the others
			if let Err(e) = write.send(WsMessage::Text(frame.to_string().into())).await {
				warn!(
					node = self.node.as_str(),
					query = query.as_str(),
					error = %e,
					"Subscription request failed"
				);
			}
		}

		self.set_state(ConnectionState::Listening);
		loop {
			tokio::select! {
				changed = shutdown.changed() => {
					if changed.is_err() || *shutdown.borrow() {
						if let Err(e) = write.send(WsMessage::Close(None)).await {
							debug!(node = self.node.as_str(), error = %e, "Error closing connection");
						}
						return SessionEnd::Shutdown;
					}
				}
				frame = read.next() => match frame {
					None => return SessionEnd::ConnectionLost("stream ended".to_string()),
					Some(Err(e)) => return SessionEnd::ConnectionLost(e.to_string()),
					Some(Ok(WsMessage::Text(text))) => {
						let event = match decode_frame(text.as_str(), &self.registry) {
							Ok(None) => continue,
							Ok(Some(event)) => event,
							// Malformed frames become observable events and are not retried
							Err(e) => Event::TransactionError(TransactionErrorEvent::new(e.to_string())),
						};
						trace!(node = self.node.as_str(), hash = event.hash(), "Decoded event");
						if !self.emit(event).await {
							return SessionEnd::Shutdown;
						}
					}
					Some(Ok(WsMessage::Ping(payload))) => {
						if let Err(e) = write.send(WsMessage::Pong(payload)).await {
							return SessionEnd::ConnectionLost(e.to_string());
						}
					}
					Some(Ok(WsMessage::Close(_))) => {
						return SessionEnd::ConnectionLost("closed by remote".to_string());
					}
					Some(Ok(_)) => {}
				}
			}
		}
	}

	/// Forwards an event as a report; returns false once the consumer is gone
	async fn emit(&self, event: Event) -> bool {
		let report = Report {
			chain: self.chain.clone(),
			node: self.node.clone(),
			event,
		};
		self.reports.send(report).await.is_ok()
	}

	async fn emit_connection_error(&self, reason: &str) -> bool {
		self.emit(Event::NodeConnectionError(NodeConnectionErrorEvent::new(
			self.node.clone(),
			reason,
		)))
		.await
	}

	fn set_state(&self, next: ConnectionState) {
		*self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
	}

	fn record_initial_outcome(&self, error: Option<String>) {
		*self
			.initial_error
			.lock()
			.unwrap_or_else(|e| e.into_inner()) = error;
	}
}

enum SessionEnd {
	/// Stop was requested; the session closed cleanly
	Shutdown,
	/// The connection dropped and should be re-established
	ConnectionLost(String),
}
