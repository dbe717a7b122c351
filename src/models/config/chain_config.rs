use std::{collections::HashSet, path::Path};

use crate::models::{Chain, ConfigLoader};

use super::error::ConfigError;

impl ConfigLoader for Chain {
	/// Load all chain configurations from a directory of JSON files
	fn load_all<T>(path: Option<&Path>) -> Result<T, ConfigError>
	where
		T: FromIterator<(String, Self)>,
	{
		let chain_dir = path.unwrap_or(Path::new("config/chains"));
		let mut pairs = Vec::new();

		if !chain_dir.exists() {
			return Err(ConfigError::file_error("chains directory not found"));
		}

		for entry in std::fs::read_dir(chain_dir)? {
			let entry = entry?;
			let path = entry.path();

			if !Self::is_json_file(&path) {
				continue;
			}

			let chain = Self::load_from_path(&path)?;
			pairs.push((chain.name.clone(), chain));
		}

		Ok(T::from_iter(pairs))
	}

	fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
		let file = std::fs::File::open(path)?;
		let config: Chain = serde_json::from_reader(file)?;

		if let Err(validation_error) = config.validate() {
			return Err(ConfigError::validation_error(validation_error));
		}

		Ok(config)
	}

	fn validate(&self) -> Result<(), String> {
		if !self
			.name
			.chars()
			.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
		{
			return Err(
				"Chain name must contain only lowercase letters, numbers, underscores, and hyphens"
					.to_string(),
			);
		}

		if self.nodes.is_empty() {
			return Err("At least one node endpoint is required".to_string());
		}

		// The transport decides TLS from the scheme, so only ws/wss are valid
		for node in &self.nodes {
			let parsed = url::Url::parse(node)
				.map_err(|e| format!("Invalid node endpoint {}: {}", node, e))?;
			if parsed.scheme() != "ws" && parsed.scheme() != "wss" {
				return Err(format!(
					"Node endpoint {} must use the ws:// or wss:// scheme",
					node
				));
			}
		}

		if self.queries.iter().any(|query| query.trim().is_empty()) {
			return Err("Stream queries must not be empty".to_string());
		}

		let mut names = HashSet::new();
		for subscription in &self.subscriptions {
			if subscription.name.is_empty() {
				return Err("Subscription names must not be empty".to_string());
			}
			if !names.insert(&subscription.name) {
				return Err(format!(
					"Duplicate subscription name: {}",
					subscription.name
				));
			}
			if subscription.notify.url.is_empty() {
				return Err(format!(
					"Subscription {} has an empty notify URL",
					subscription.name
				));
			}
		}

		Ok(())
	}
}
