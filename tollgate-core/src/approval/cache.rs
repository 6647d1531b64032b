//! Session-scoped cache of human approvals.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use super::canonical::canonical_json;
use super::types::{ApprovalDecision, ToolArgs};

/// Cache key: tool name plus canonical arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Tool name.
    pub tool_name: String,
    /// Output of [`canonical_json`] for the call's arguments.
    pub canonical_args: String,
}

impl CacheKey {
    /// Build the key for a call.
    pub fn new(tool_name: &str, tool_args: &ToolArgs) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            canonical_args: canonical_json(tool_args),
        }
    }
}

/// A remembered approval.
#[derive(Debug, Clone)]
pub struct CachedApproval {
    /// Tool name.
    pub tool_name: String,
    /// Arguments as they were first approved.
    pub tool_args: ToolArgs,
    /// The approving decision. Always approved with `remember = Session`.
    pub decision: ApprovalDecision,
    /// When the approval was recorded.
    pub approved_at: DateTime<Utc>,
}

/// Remembers "approve for session" answers so identical calls skip the prompt.
///
/// Only approvals with [`Remember::Session`](super::Remember::Session) are
/// kept. Denials and one-off approvals are never stored, so a retried call
/// after a denial always asks again.
///
/// The cache lives in memory only and is shared between gates through an
/// `Arc`. Every operation takes one short lock; nothing holds it across an
/// `.await`, so nested gated calls can read and write freely.
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::{ApprovalDecision, SessionCache};
/// use serde_json::json;
///
/// let cache = SessionCache::new();
/// let args = json!({"path": "/tmp/test.txt"}).as_object().cloned().unwrap();
///
/// cache.store("write_file", &args, &ApprovalDecision::approve_for_session());
/// assert!(cache.lookup("write_file", &args).unwrap().approved);
///
/// // One-off approvals are not remembered
/// cache.store("delete_file", &args, &ApprovalDecision::approve());
/// assert!(cache.lookup("delete_file", &args).is_none());
/// ```
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: Mutex<HashMap<CacheKey, CachedApproval>>,
}

impl SessionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a remembered approval for an identical call.
    pub fn lookup(&self, tool_name: &str, tool_args: &ToolArgs) -> Option<ApprovalDecision> {
        let key = CacheKey::new(tool_name, tool_args);
        self.entries
            .lock()
            .get(&key)
            .map(|entry| entry.decision.clone())
    }

    /// Check whether an identical call has been approved for the session.
    pub fn contains(&self, tool_name: &str, tool_args: &ToolArgs) -> bool {
        self.lookup(tool_name, tool_args).is_some()
    }

    /// Remember a decision if it is an approval for the session.
    ///
    /// Returns `true` when an entry was recorded. Anything other than
    /// `approved = true, remember = Session` is ignored.
    pub fn store(&self, tool_name: &str, tool_args: &ToolArgs, decision: &ApprovalDecision) -> bool {
        if !decision.is_session_approval() {
            return false;
        }

        let key = CacheKey::new(tool_name, tool_args);
        let entry = CachedApproval {
            tool_name: tool_name.to_string(),
            tool_args: tool_args.clone(),
            decision: decision.clone(),
            approved_at: Utc::now(),
        };
        self.entries.lock().insert(key, entry);
        true
    }

    /// All remembered approvals, in no particular order.
    pub fn entries(&self) -> Vec<CachedApproval> {
        self.entries.lock().values().cloned().collect()
    }

    /// Number of remembered approvals.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// True when nothing has been remembered.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Forget every remembered approval.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}
