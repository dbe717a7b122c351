//! Webhook delivery implementation.
//!
//! Sends formatted messages to a configured webhook URL as a JSON
//! payload. Each delivery attempt is independent; retries are the
//! receiving side's concern.

use std::str::FromStr;

use async_trait::async_trait;
use reqwest::{
	header::{HeaderMap, HeaderName, HeaderValue},
	Method,
};
use serde::Serialize;

use crate::{
	models::NotifyConfig,
	services::notification::{error::NotificationError, Notifier},
};

/// A formatted delivery payload
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct WebhookMessage {
	pub title: String,
	pub body: String,
	/// RFC 3339 time the payload was built, not the on-chain time
	pub timestamp: String,
}

impl WebhookMessage {
	pub fn new(title: String, body: String) -> Self {
		Self {
			title,
			body,
			timestamp: chrono::Utc::now().to_rfc3339(),
		}
	}
}

/// Delivers messages to one webhook endpoint
pub struct WebhookNotifier {
	url: String,
	method: Method,
	headers: HeaderMap,
	client: reqwest::Client,
}

impl WebhookNotifier {
	/// Creates a notifier from a subscription's delivery target
	pub fn from_config(
		config: &NotifyConfig,
		client: reqwest::Client,
	) -> Result<Self, NotificationError> {
		let method = match &config.method {
			Some(method) => Method::from_str(method).map_err(|_| {
				NotificationError::config_error(format!("invalid HTTP method: {}", method))
			})?,
			None => Method::POST,
		};

		let mut headers = HeaderMap::new();
		if let Some(configured) = &config.headers {
			for (key, value) in configured {
				let name = HeaderName::from_str(key).map_err(|_| {
					NotificationError::config_error(format!("invalid header name: {}", key))
				})?;
				let value = HeaderValue::from_str(value).map_err(|_| {
					NotificationError::config_error(format!("invalid header value for {}", key))
				})?;
				headers.insert(name, value);
			}
		}

		Ok(Self {
			url: config.url.clone(),
			method,
			headers,
			client,
		})
	}
}

#[async_trait]
impl Notifier for WebhookNotifier {
	async fn notify(&self, message: &WebhookMessage) -> Result<(), NotificationError> {
		let response = self
			.client
			.request(self.method.clone(), &self.url)
			.headers(self.headers.clone())
			.json(message)
			.send()
			.await?;

		if !response.status().is_success() {
			return Err(NotificationError::network_error(format!(
				"webhook returned status {}",
				response.status()
			)));
		}

		Ok(())
	}
}
