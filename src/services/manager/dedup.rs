//! Bounded window of recently delivered event hashes.

use std::collections::VecDeque;

/// Default number of delivered hashes remembered per process
pub const DEFAULT_DEDUP_WINDOW: usize = 100;

/// Insertion-ordered window of the last N delivered event hashes.
///
/// Membership is an O(N) scan, acceptable at this window size; the
/// queue never exceeds its capacity and evicts strictly FIFO. All
/// access is serialized by the manager's single lock.
#[derive(Debug)]
pub struct DedupCache {
	window: VecDeque<String>,
	capacity: usize,
}

impl DedupCache {
	pub fn new(capacity: usize) -> Self {
		Self {
			window: VecDeque::with_capacity(capacity),
			capacity,
		}
	}

	pub fn contains(&self, hash: &str) -> bool {
		self.window.iter().any(|seen| seen == hash)
	}

	/// Records a delivered hash, evicting the oldest entry when full.
	/// A zero-capacity window remembers nothing, disabling dedup.
	pub fn insert(&mut self, hash: String) {
		if self.capacity == 0 {
			return;
		}
		if self.window.len() >= self.capacity {
			self.window.pop_front();
		}
		self.window.push_back(hash);
	}

	pub fn len(&self) -> usize {
		self.window.len()
	}

	pub fn is_empty(&self) -> bool {
		self.window.is_empty()
	}
}

impl Default for DedupCache {
	fn default() -> Self {
		Self::new(DEFAULT_DEDUP_WINDOW)
	}
}
