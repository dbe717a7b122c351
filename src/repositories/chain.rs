use std::{collections::HashMap, path::Path};

use crate::{
	models::{Chain, ConfigLoader},
	repositories::error::RepositoryError,
};

/// In-memory store of chain configurations loaded at startup
pub struct ChainRepository {
	pub chains: HashMap<String, Chain>,
}

impl ChainRepository {
	pub fn new(path: Option<&Path>) -> Result<Self, RepositoryError> {
		let chains = Chain::load_all(path)
			.map_err(|e| RepositoryError::load_error(format!("Failed to load chains: {}", e)))?;
		Ok(ChainRepository { chains })
	}
}

#[cfg_attr(test, mockall::automock)]
pub trait ChainRepositoryTrait {
	fn get(&self, chain_name: &str) -> Option<Chain>;
	fn get_all(&self) -> HashMap<String, Chain>;
}

impl ChainRepositoryTrait for ChainRepository {
	fn get(&self, chain_name: &str) -> Option<Chain> {
		self.chains.get(chain_name).cloned()
	}

	fn get_all(&self) -> HashMap<String, Chain> {
		self.chains.clone()
	}
}

/// Service wrapper around a chain repository
pub struct ChainService<T: ChainRepositoryTrait> {
	repository: T,
}

impl<T: ChainRepositoryTrait> ChainService<T> {
	pub fn new(path: Option<&Path>) -> Result<ChainService<ChainRepository>, RepositoryError> {
		let repository = ChainRepository::new(path)?;
		Ok(ChainService { repository })
	}

	pub fn new_with_repository(repository: T) -> Self {
		ChainService { repository }
	}

	pub fn get(&self, chain_name: &str) -> Option<Chain> {
		self.repository.get(chain_name)
	}

	pub fn get_all(&self) -> HashMap<String, Chain> {
		self.repository.get_all()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	fn write_chain(dir: &Path, name: &str) {
		let mut file = std::fs::File::create(dir.join(format!("{}.json", name))).unwrap();
		write!(
			file,
			r#"{{"name": "{}", "nodes": ["ws://localhost:26657/websocket"], "subscriptions": []}}"#,
			name
		)
		.unwrap();
	}

	#[test]
	fn test_repository_loads_chains() {
		let dir = tempfile::tempdir().unwrap();
		write_chain(dir.path(), "cosmoshub");
		write_chain(dir.path(), "osmosis");

		let service = ChainService::<ChainRepository>::new(Some(dir.path())).unwrap();
		assert_eq!(service.get_all().len(), 2);
		assert!(service.get("cosmoshub").is_some());
		assert!(service.get("unknown").is_none());
	}

	#[test]
	fn test_service_with_mocked_repository() {
		let mut mock = MockChainRepositoryTrait::new();
		mock.expect_get()
			.with(mockall::predicate::eq("cosmoshub"))
			.returning(|_| None);
		mock.expect_get_all().returning(HashMap::new);

		let service = ChainService::new_with_repository(mock);
		assert!(service.get("cosmoshub").is_none());
		assert!(service.get_all().is_empty());
	}

	#[test]
	fn test_repository_missing_directory_is_load_error() {
		let result = ChainRepository::new(Some(Path::new("/nonexistent/chains")));
		assert!(matches!(result, Err(RepositoryError::LoadError(_))));
	}
}
