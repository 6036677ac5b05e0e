//! Compile-time set of tool units the pipeline knows about.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// One tool unit per pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    Research,
    FoundationsAnalysis,
    StorytellingAnalysis,
    Skeleton,
    Write,
    Humanize,
    #[serde(rename = "identify-visual-needs")]
    VisualNeeds,
}

impl ToolKind {
    pub const ALL: [ToolKind; 7] = [
        ToolKind::Research,
        ToolKind::FoundationsAnalysis,
        ToolKind::StorytellingAnalysis,
        ToolKind::Skeleton,
        ToolKind::Write,
        ToolKind::Humanize,
        ToolKind::VisualNeeds,
    ];

    /// Stable name used as the step name, in logs and in `tool_results`.
    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Research => "research",
            ToolKind::FoundationsAnalysis => "foundations-analysis",
            ToolKind::StorytellingAnalysis => "storytelling-analysis",
            ToolKind::Skeleton => "skeleton",
            ToolKind::Write => "write",
            ToolKind::Humanize => "humanize",
            ToolKind::VisualNeeds => "identify-visual-needs",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ToolKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| PipelineError::UnknownTool(s.to_string()))
    }
}
