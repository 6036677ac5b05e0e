//! Artifact record and related types
//!
//! The artifact is the content document advanced through the pipeline. The
//! orchestrator never caches it: every step reads the narrow field subset it
//! needs through [`ArtifactFields`] and writes back through [`ArtifactUpdate`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::id::{generate_artifact_id, now_ms};

/// The content document stored in the artifact store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub id: String,
    pub title: String,
    pub artifact_type: ArtifactType,
    pub status: ArtifactStatus,
    /// Body produced so far (research notes, outline, draft)
    pub content: String,
    pub tone: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl Artifact {
    /// Create a new draft artifact with a generated id
    pub fn new(title: impl Into<String>, artifact_type: ArtifactType) -> Self {
        let now = now_ms();
        Self {
            id: generate_artifact_id(),
            title: title.into(),
            artifact_type,
            status: ArtifactStatus::Draft,
            content: String::new(),
            tone: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_status(mut self, status: ArtifactStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_tone(mut self, tone: impl Into<String>) -> Self {
        self.tone = Some(tone.into());
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Project the requested fields out of the record.
    pub fn select(&self, fields: &[ArtifactField]) -> ArtifactFields {
        let mut selected = ArtifactFields {
            id: self.id.clone(),
            ..Default::default()
        };
        for field in fields {
            match field {
                ArtifactField::Status => selected.status = Some(self.status),
                ArtifactField::Title => selected.title = Some(self.title.clone()),
                ArtifactField::Type => selected.artifact_type = Some(self.artifact_type),
                ArtifactField::Content => selected.content = Some(self.content.clone()),
                ArtifactField::Tone => selected.tone = self.tone.clone(),
            }
        }
        selected
    }

    /// Apply a partial update, bumping `updated_at`.
    pub fn apply(&mut self, update: &ArtifactUpdate) {
        if let Some(status) = update.status {
            self.status = status;
        }
        if let Some(title) = &update.title {
            self.title = title.clone();
        }
        if let Some(content) = &update.content {
            self.content = content.clone();
        }
        if let Some(tone) = &update.tone {
            self.tone = Some(tone.clone());
        }
        self.updated_at = now_ms();
    }
}

/// Kind of content document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactType {
    Blog,
    SocialPost,
    Showcase,
}

impl fmt::Display for ArtifactType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactType::Blog => "blog",
            ArtifactType::SocialPost => "social_post",
            ArtifactType::Showcase => "showcase",
        };
        f.write_str(s)
    }
}

impl FromStr for ArtifactType {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blog" => Ok(ArtifactType::Blog),
            "social_post" | "social-post" => Ok(ArtifactType::SocialPost),
            "showcase" => Ok(ArtifactType::Showcase),
            other => Err(PipelineError::Config(format!("unknown artifact type: {}", other))),
        }
    }
}

/// Pipeline status of an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactStatus {
    /// Created, nothing run yet
    Draft,
    Research,
    Foundations,
    /// Outline produced. Also accepted as a legacy approval status.
    Skeleton,
    /// Canonical "awaiting approval" status written when the pipeline pauses
    FoundationsApproval,
    HumanityChecking,
    /// Terminal
    Ready,
}

impl ArtifactStatus {
    /// Status persisted when a pause-for-approval step completes.
    pub const AWAITING_APPROVAL: ArtifactStatus = ArtifactStatus::FoundationsApproval;

    /// Statuses from which `resume_from_approval` may continue.
    pub const APPROVAL_ELIGIBLE: [ArtifactStatus; 2] =
        [ArtifactStatus::FoundationsApproval, ArtifactStatus::Skeleton];

    pub fn is_approval_eligible(&self) -> bool {
        Self::APPROVAL_ELIGIBLE.contains(self)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ArtifactStatus::Ready)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactStatus::Draft => "draft",
            ArtifactStatus::Research => "research",
            ArtifactStatus::Foundations => "foundations",
            ArtifactStatus::Skeleton => "skeleton",
            ArtifactStatus::FoundationsApproval => "foundations_approval",
            ArtifactStatus::HumanityChecking => "humanity_checking",
            ArtifactStatus::Ready => "ready",
        }
    }
}

impl fmt::Display for ArtifactStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArtifactStatus {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ArtifactStatus::Draft),
            "research" => Ok(ArtifactStatus::Research),
            "foundations" => Ok(ArtifactStatus::Foundations),
            "skeleton" => Ok(ArtifactStatus::Skeleton),
            "foundations_approval" => Ok(ArtifactStatus::FoundationsApproval),
            "humanity_checking" => Ok(ArtifactStatus::HumanityChecking),
            "ready" => Ok(ArtifactStatus::Ready),
            other => Err(PipelineError::InvalidStatus(other.to_string())),
        }
    }
}

/// A single selectable artifact column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactField {
    Status,
    Title,
    Type,
    Content,
    Tone,
}

/// Narrow projection of an artifact; unselected fields are `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFields {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ArtifactStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<ArtifactType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tone: Option<String>,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactUpdate {
    pub status: Option<ArtifactStatus>,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tone: Option<String>,
}

impl ArtifactUpdate {
    pub fn status(status: ArtifactStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }
}
