//! Storage layer for artifacts.
//!
//! The orchestrator depends only on the [`ArtifactStore`] trait. Two
//! implementations ship with the crate: an in-memory map and a JSONL file
//! store used by the command-line tool.

mod jsonl;
mod memory;
mod traits;

pub use jsonl::JsonlArtifactStore;
pub use memory::MemoryArtifactStore;
pub use traits::{ArtifactStore, Filter, FilterOp};
