//! Configuration-backed repositories.
//!
//! Repositories load validated configuration at startup and expose it
//! read-only to the rest of the pipeline through trait seams that tests
//! can mock.

mod chain;
mod error;

pub use chain::{ChainRepository, ChainRepositoryTrait, ChainService};
pub use error::RepositoryError;
