//! Registry of tool units keyed by [`ToolKind`].

use std::collections::HashMap;
use std::sync::Arc;

use super::{ToolKind, ToolUnit};

/// Maps each tool kind to the unit that implements it
#[derive(Clone, Default)]
pub struct ToolRegistry {
    units: HashMap<ToolKind, Arc<dyn ToolUnit>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a unit, replacing any previous one for the kind.
    pub fn register(&mut self, kind: ToolKind, unit: Arc<dyn ToolUnit>) {
        self.units.insert(kind, unit);
    }

    pub fn with(mut self, kind: ToolKind, unit: Arc<dyn ToolUnit>) -> Self {
        self.register(kind, unit);
        self
    }

    pub fn get(&self, kind: ToolKind) -> Option<Arc<dyn ToolUnit>> {
        self.units.get(&kind).cloned()
    }

    pub fn contains(&self, kind: ToolKind) -> bool {
        self.units.contains_key(&kind)
    }

    /// Kinds with no registered unit, in pipeline order.
    pub fn missing(&self) -> Vec<ToolKind> {
        ToolKind::ALL.into_iter().filter(|k| !self.contains(*k)).collect()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.units.keys().map(|k| k.name()).collect();
        kinds.sort_unstable();
        f.debug_struct("ToolRegistry").field("units", &kinds).finish()
    }
}
