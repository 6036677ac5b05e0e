//! Artifact store trait and record filters.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{ArtifactField, ArtifactFields, ArtifactUpdate};
use crate::error::Result;

/// Keyed record storage for artifact state.
///
/// The orchestrator only ever asks for the narrow field subset a step needs,
/// and only ever writes partial updates.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Read the requested fields of an artifact; `Ok(None)` if it does not exist.
    async fn get(&self, id: &str, fields: &[ArtifactField]) -> Result<Option<ArtifactFields>>;

    /// Apply a partial update. Fails with `ArtifactNotFound` for an unknown id.
    async fn update(&self, id: &str, update: ArtifactUpdate) -> Result<()>;
}

/// Filter operations for querying records.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOp {
    /// Field equals value
    Eq,
    /// Field does not equal value
    Ne,
    /// Field contains value (string/array)
    Contains,
}

/// A filter for listing artifacts, matched against their JSON form.
#[derive(Debug, Clone)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: serde_json::Value,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(field, FilterOp::Ne, value)
    }

    pub fn contains(field: impl Into<String>, value: impl Serialize) -> Self {
        Self::new(field, FilterOp::Contains, value)
    }

    fn new(field: impl Into<String>, op: FilterOp, value: impl Serialize) -> Self {
        Self {
            field: field.into(),
            op,
            value: serde_json::to_value(value).unwrap_or(serde_json::Value::Null),
        }
    }

    /// Check if a record matches this filter.
    pub fn matches(&self, record: &serde_json::Value) -> bool {
        let field_value = record.get(&self.field);

        match &self.op {
            FilterOp::Eq => match field_value {
                Some(v) => *v == self.value,
                None => self.value.is_null(),
            },
            FilterOp::Ne => match field_value {
                Some(v) => *v != self.value,
                None => !self.value.is_null(),
            },
            FilterOp::Contains => match (field_value, &self.value) {
                (Some(serde_json::Value::String(s)), serde_json::Value::String(needle)) => {
                    s.to_lowercase().contains(&needle.to_lowercase())
                }
                (Some(serde_json::Value::Array(arr)), v) => arr.contains(v),
                _ => false,
            },
        }
    }
}
