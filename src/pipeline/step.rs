//! Step definitions and the validated step table.

use std::collections::HashSet;

use crate::backoff::BackoffOverride;
use crate::domain::{ArtifactField, ArtifactStatus};
use crate::error::{PipelineError, Result};
use crate::tools::ToolKind;

/// Static definition of one pipeline stage
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    pub tool: ToolKind,
    pub status_before: ArtifactStatus,
    pub status_after: ArtifactStatus,
    /// Failure of a non-required step is logged and skipped
    pub required: bool,
    /// Success suspends the pipeline until `resume_from_approval`
    pub pause_for_approval: bool,
    /// Artifact fields resolved into the tool's params
    pub fields: Vec<ArtifactField>,
    pub backoff: Option<BackoffOverride>,
}

impl PipelineStep {
    /// A required step reading title, type and content.
    pub fn new(tool: ToolKind, status_before: ArtifactStatus, status_after: ArtifactStatus) -> Self {
        Self {
            tool,
            status_before,
            status_after,
            required: true,
            pause_for_approval: false,
            fields: vec![ArtifactField::Title, ArtifactField::Type, ArtifactField::Content],
            backoff: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn pause_for_approval(mut self) -> Self {
        self.pause_for_approval = true;
        self
    }

    pub fn reads(mut self, fields: &[ArtifactField]) -> Self {
        self.fields = fields.to_vec();
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffOverride) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn name(&self) -> &'static str {
        self.tool.name()
    }

    /// Status the orchestrator persists when this step succeeds.
    pub fn committed_status(&self) -> ArtifactStatus {
        if self.pause_for_approval {
            ArtifactStatus::AWAITING_APPROVAL
        } else {
            self.status_after
        }
    }
}

/// Totally ordered, validated list of steps
#[derive(Debug, Clone, PartialEq)]
pub struct StepTable {
    steps: Vec<PipelineStep>,
}

impl StepTable {
    /// Build a table, rejecting anything [`StepTable::validate`] rejects.
    pub fn new(steps: Vec<PipelineStep>) -> Result<Self> {
        Self::validate(&steps)?;
        Ok(Self { steps })
    }

    /// The content pipeline:
    /// research → foundations → storytelling → skeleton (pause) → write →
    /// humanize → visuals (optional).
    pub fn content_pipeline() -> Self {
        use crate::domain::ArtifactField::*;
        use crate::domain::ArtifactStatus::*;

        Self {
            steps: vec![
                PipelineStep::new(ToolKind::Research, Draft, Research),
                PipelineStep::new(ToolKind::FoundationsAnalysis, Research, Foundations),
                PipelineStep::new(ToolKind::StorytellingAnalysis, Foundations, Foundations),
                PipelineStep::new(ToolKind::Skeleton, Foundations, Skeleton)
                    .reads(&[Title, Type, Tone, Content])
                    .pause_for_approval(),
                PipelineStep::new(ToolKind::Write, FoundationsApproval, HumanityChecking)
                    .reads(&[Title, Type, Tone, Content]),
                PipelineStep::new(ToolKind::Humanize, HumanityChecking, Ready).reads(&[Type, Tone, Content]),
                PipelineStep::new(ToolKind::VisualNeeds, Ready, Ready).optional(),
            ],
        }
    }

    /// Check the table is non-empty, uses each tool once, and that every
    /// adjacent pair chains: `status_after` of a step equals `status_before`
    /// of the next, except after a pause step, where the next step must start
    /// from an approval-eligible status.
    pub fn validate(steps: &[PipelineStep]) -> Result<()> {
        if steps.is_empty() {
            return Err(PipelineError::InvalidStepTable("no steps".to_string()));
        }

        let mut seen = HashSet::new();
        for step in steps {
            if !seen.insert(step.tool) {
                return Err(PipelineError::InvalidStepTable(format!(
                    "tool {} appears more than once",
                    step.tool
                )));
            }
        }

        for pair in steps.windows(2) {
            let (current, next) = (&pair[0], &pair[1]);
            if current.pause_for_approval {
                if !next.status_before.is_approval_eligible() {
                    return Err(PipelineError::InvalidStepTable(format!(
                        "{} follows a pause but starts from {}, which is not an approval status",
                        next.tool, next.status_before
                    )));
                }
            } else if current.status_after != next.status_before {
                return Err(PipelineError::InvalidStepTable(format!(
                    "{} ends in {} but {} starts from {}",
                    current.tool, current.status_after, next.tool, next.status_before
                )));
            }
        }

        Ok(())
    }

    pub fn steps(&self) -> &[PipelineStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Table index and definition of the step using `tool`.
    pub fn get(&self, tool: ToolKind) -> Option<(usize, &PipelineStep)> {
        self.steps.iter().enumerate().find(|(_, s)| s.tool == tool)
    }

    pub fn pause_index(&self) -> Option<usize> {
        self.steps.iter().position(|s| s.pause_for_approval)
    }

    /// Index of the first step to run after approval.
    pub fn resume_index(&self) -> Option<usize> {
        self.pause_index().map(|i| i + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtifactStatus::*;

    #[test]
    fn test_content_pipeline_is_valid() {
        let table = StepTable::content_pipeline();
        StepTable::validate(table.steps()).unwrap();
        assert_eq!(table.len(), 7);
    }

    #[test]
    fn test_content_pipeline_shape() {
        let table = StepTable::content_pipeline();
        let names: Vec<_> = table.steps().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "research",
                "foundations-analysis",
                "storytelling-analysis",
                "skeleton",
                "write",
                "humanize",
                "identify-visual-needs"
            ]
        );
        assert_eq!(table.pause_index(), Some(3));
        assert_eq!(table.resume_index(), Some(4));

        let (index, visuals) = table.get(ToolKind::VisualNeeds).unwrap();
        assert_eq!(index, 6);
        assert!(!visuals.required);
        assert!(table.steps()[..6].iter().all(|s| s.required));
    }

    #[test]
    fn test_pause_step_commits_awaiting_approval() {
        let table = StepTable::content_pipeline();
        let (_, skeleton) = table.get(ToolKind::Skeleton).unwrap();
        assert_eq!(skeleton.status_after, Skeleton);
        assert_eq!(skeleton.committed_status(), FoundationsApproval);

        let (_, write) = table.get(ToolKind::Write).unwrap();
        assert_eq!(write.committed_status(), HumanityChecking);
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(StepTable::new(vec![]), Err(PipelineError::InvalidStepTable(_))));
    }

    #[test]
    fn test_broken_chain_rejected() {
        let err = StepTable::new(vec![
            PipelineStep::new(ToolKind::Research, Draft, Research),
            PipelineStep::new(ToolKind::Write, Foundations, Ready),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("research ends in research but write starts from foundations"));
    }

    #[test]
    fn test_step_after_pause_must_start_from_approval_status() {
        let err = StepTable::new(vec![
            PipelineStep::new(ToolKind::Skeleton, Foundations, Skeleton).pause_for_approval(),
            PipelineStep::new(ToolKind::Write, Foundations, Ready),
        ])
        .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidStepTable(_)));

        StepTable::new(vec![
            PipelineStep::new(ToolKind::Skeleton, Foundations, Skeleton).pause_for_approval(),
            PipelineStep::new(ToolKind::Write, Skeleton, Ready),
        ])
        .unwrap();
    }

    #[test]
    fn test_duplicate_tool_rejected() {
        let err = StepTable::new(vec![
            PipelineStep::new(ToolKind::Research, Draft, Research),
            PipelineStep::new(ToolKind::Research, Research, Research),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_table_without_pause() {
        let table = StepTable::new(vec![PipelineStep::new(ToolKind::Research, Draft, Research)]).unwrap();
        assert_eq!(table.pause_index(), None);
        assert_eq!(table.resume_index(), None);
    }
}
