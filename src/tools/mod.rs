//! Tool units - the opaque async operations each pipeline step invokes
//!
//! A tool unit receives the artifact fields its step selected and answers with
//! a [`ToolOutcome`]. Returning `Err` means the call itself broke (spawn
//! failure, timeout, network) and is eligible for retry.

mod command;
mod kind;
mod registry;

pub use command::{CommandTool, CommandToolConfig};
pub use kind::ToolKind;
pub use registry::ToolRegistry;

use async_trait::async_trait;

use crate::domain::{ArtifactFields, ToolOutcome};
use crate::error::Result;

/// Per-invocation context handed to a tool unit
#[derive(Debug, Clone, PartialEq)]
pub struct ToolContext {
    pub artifact_id: String,
    pub trace_id: String,
    pub tool: ToolKind,
}

/// An asynchronous unit of work behind one pipeline step
#[async_trait]
pub trait ToolUnit: Send + Sync {
    fn name(&self) -> &str;

    async fn execute(&self, params: ArtifactFields, ctx: &ToolContext) -> Result<ToolOutcome>;
}
