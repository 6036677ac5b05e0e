//! ID generation utilities
//!
//! Provides functions for generating artifact identifiers and per-run trace ids.

use rand::Rng;

use crate::domain::RunKind;

/// Get current timestamp in milliseconds since Unix epoch
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Generate a unique artifact ID
///
/// Format: `art-{timestamp_ms}-{random_hex}`
pub fn generate_artifact_id() -> String {
    let random: u16 = rand::rng().random();
    format!("art-{}-{:04x}", now_ms(), random)
}

/// Generate a trace id for one pipeline run, prefixed by the run kind.
///
/// Format: `{kind}-{timestamp_ms}-{random_hex}`
/// Example: `pipeline-resume-1738300800123-00a1b2c3`
pub fn generate_trace_id(kind: RunKind) -> String {
    let random: u32 = rand::rng().random();
    format!("{}-{}-{:08x}", kind.prefix(), now_ms(), random)
}
