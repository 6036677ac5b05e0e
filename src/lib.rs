//! Artifact pipeline - drives content artifacts through AI tool steps
//!
//! An artifact moves through an ordered step table: research, foundations,
//! storytelling, skeleton, write, humanize and an optional visuals pass. Each
//! step is checkpointed, retried with backoff on transport errors and rolled
//! back on failure. The skeleton step pauses the run until a human approves it.

pub mod backoff;
pub mod checkpoint;
pub mod domain;
pub mod error;
pub mod id;
pub mod pipeline;
pub mod storage;
pub mod tools;

pub use error::{PipelineError, Result};
