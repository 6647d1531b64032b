//! Per-call context passed through the gate to policies and executors.

use serde_json::{Map, Value};

/// Identifies one gated call and where it sits in a chain of nested calls.
///
/// A tool that itself makes gated calls should pass [`CallContext::child`]
/// so events and logs can be stitched back together.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    /// Unique ID for this call (UUID v4 unless supplied).
    pub call_id: String,
    /// ID of the call that triggered this one, if nested.
    pub parent_id: Option<String>,
    /// Nesting depth; 0 for top-level calls.
    pub depth: usize,
    /// Free-form data for policies and executors (run IDs, user IDs, ...).
    pub metadata: Map<String, Value>,
}

impl CallContext {
    /// Create a top-level context with a fresh ID.
    pub fn new() -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string())
    }

    /// Create a top-level context with a caller-supplied ID
    /// (e.g. the model's tool use ID).
    pub fn with_id(call_id: impl Into<String>) -> Self {
        Self {
            call_id: call_id.into(),
            parent_id: None,
            depth: 0,
            metadata: Map::new(),
        }
    }

    /// Create the context for a call made from inside this one.
    ///
    /// Metadata is inherited.
    pub fn child(&self) -> Self {
        Self {
            call_id: uuid::Uuid::new_v4().to_string(),
            parent_id: Some(self.call_id.clone()),
            depth: self.depth + 1,
            metadata: self.metadata.clone(),
        }
    }

    /// Attach a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

impl Default for CallContext {
    fn default() -> Self {
        Self::new()
    }
}
