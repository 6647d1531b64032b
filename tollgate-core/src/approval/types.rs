//! Approval request, decision, and evaluation result types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Tool arguments as received from the model.
///
/// Key order is preserved as given by the caller. Anything that needs an
/// order-independent form goes through [`crate::approval::canonical_json`].
pub type ToolArgs = Map<String, Value>;

/// How long an approval should be remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Remember {
    /// Approve this call only.
    #[default]
    None,

    /// Approve identical calls for the rest of the session.
    Session,
}

impl std::fmt::Display for Remember {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Remember::None => write!(f, "none"),
            Remember::Session => write!(f, "session"),
        }
    }
}

/// Everything a human needs to decide on a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Name of the tool being called.
    pub tool_name: String,

    /// Arguments the tool will be called with.
    pub tool_args: ToolArgs,

    /// Human-readable description of the call.
    pub description: String,
}

impl ApprovalRequest {
    /// Create a request with an explicit description.
    pub fn new(
        tool_name: impl Into<String>,
        tool_args: ToolArgs,
        description: impl Into<String>,
    ) -> Self {
        Self {
            tool_name: tool_name.into(),
            tool_args,
            description: description.into(),
        }
    }

    /// Create a request described by [`default_description`].
    pub fn described(tool_name: impl Into<String>, tool_args: ToolArgs) -> Self {
        let tool_name = tool_name.into();
        let description = default_description(&tool_name, &tool_args);
        Self {
            tool_name,
            tool_args,
            description,
        }
    }
}

/// Render a call as `name(key=value, ...)` with JSON-encoded values.
///
/// Arguments appear in the order the caller supplied them.
pub fn default_description(tool_name: &str, tool_args: &ToolArgs) -> String {
    let args = tool_args
        .iter()
        .map(|(key, value)| format!("{}={}", key, value))
        .collect::<Vec<_>>()
        .join(", ");
    format!("{}({})", tool_name, args)
}

/// A human's answer to an [`ApprovalRequest`].
///
/// `approved` is required when parsing from JSON; `note` and `remember`
/// default to empty and [`Remember::None`].
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::{ApprovalDecision, Remember};
///
/// let once = ApprovalDecision::approve();
/// assert_eq!(once.remember, Remember::None);
///
/// let session = ApprovalDecision::approve_for_session();
/// assert!(session.is_session_approval());
///
/// let no = ApprovalDecision::deny_with_note("too risky");
/// assert_eq!(no.note.as_deref(), Some("too risky"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Whether the call may proceed.
    pub approved: bool,

    /// Feedback for the requester (typically the model).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Whether to reuse this decision for identical calls.
    #[serde(default)]
    pub remember: Remember,
}

impl ApprovalDecision {
    /// Approve this call only.
    pub fn approve() -> Self {
        Self {
            approved: true,
            note: None,
            remember: Remember::None,
        }
    }

    /// Approve this call and identical calls for the rest of the session.
    pub fn approve_for_session() -> Self {
        Self {
            approved: true,
            note: None,
            remember: Remember::Session,
        }
    }

    /// Deny without a note.
    pub fn deny() -> Self {
        Self {
            approved: false,
            note: None,
            remember: Remember::None,
        }
    }

    /// Deny and tell the requester why.
    pub fn deny_with_note(note: impl Into<String>) -> Self {
        Self {
            approved: false,
            note: Some(note.into()),
            remember: Remember::None,
        }
    }

    /// Attach a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Set the remember flag.
    pub fn with_remember(mut self, remember: Remember) -> Self {
        self.remember = remember;
        self
    }

    /// True for approvals that belong in the session cache.
    pub fn is_session_approval(&self) -> bool {
        self.approved && self.remember == Remember::Session
    }
}

/// Outcome of evaluating a tool call against policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApprovalResult {
    /// Policy forbids the call. It never reaches a human.
    Blocked {
        /// Why the call was blocked.
        reason: String,
    },

    /// Policy allows the call without asking.
    PreApproved,

    /// A human has to decide.
    NeedsApproval,
}

impl ApprovalResult {
    /// Create a blocked result.
    pub fn blocked(reason: impl Into<String>) -> Self {
        Self::Blocked {
            reason: reason.into(),
        }
    }

    /// Check if the call is blocked.
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Check if the call is pre-approved.
    pub fn is_pre_approved(&self) -> bool {
        matches!(self, Self::PreApproved)
    }

    /// Check if the call needs a human decision.
    pub fn is_needs_approval(&self) -> bool {
        matches!(self, Self::NeedsApproval)
    }

    /// The block reason, if blocked.
    pub fn block_reason(&self) -> Option<&str> {
        match self {
            Self::Blocked { reason } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_result_predicates() {
        let blocked = ApprovalResult::blocked("Operation not allowed");
        assert!(blocked.is_blocked());
        assert!(!blocked.is_pre_approved());
        assert!(!blocked.is_needs_approval());
        assert_eq!(blocked.block_reason(), Some("Operation not allowed"));

        let pre = ApprovalResult::PreApproved;
        assert!(pre.is_pre_approved());
        assert!(!pre.is_blocked());
        assert_eq!(pre.block_reason(), None);

        let needs = ApprovalResult::NeedsApproval;
        assert!(needs.is_needs_approval());
        assert!(!needs.is_pre_approved());
        assert_eq!(needs.block_reason(), None);
    }

    #[test]
    fn test_result_serializes_with_status_tag() {
        let value = serde_json::to_value(ApprovalResult::blocked("nope")).unwrap();
        assert_eq!(value, json!({"status": "blocked", "reason": "nope"}));

        let value = serde_json::to_value(ApprovalResult::NeedsApproval).unwrap();
        assert_eq!(value, json!({"status": "needs_approval"}));
    }

    #[test]
    fn test_decision_constructors() {
        let once = ApprovalDecision::approve();
        assert!(once.approved);
        assert_eq!(once.remember, Remember::None);
        assert!(once.note.is_none());
        assert!(!once.is_session_approval());

        let session = ApprovalDecision::approve_for_session();
        assert!(session.is_session_approval());

        let denied = ApprovalDecision::deny_with_note("Not safe to execute");
        assert!(!denied.approved);
        assert_eq!(denied.note.as_deref(), Some("Not safe to execute"));

        // A denial is never a session approval, whatever the flag says
        let odd = ApprovalDecision::deny().with_remember(Remember::Session);
        assert!(!odd.is_session_approval());
    }

    #[test]
    fn test_decision_defaults_when_parsed() {
        let decision: ApprovalDecision = serde_json::from_value(json!({"approved": true})).unwrap();
        assert_eq!(decision, ApprovalDecision::approve());

        let decision: ApprovalDecision = serde_json::from_value(
            json!({"approved": true, "remember": "session", "note": "ok"}),
        )
        .unwrap();
        assert!(decision.is_session_approval());
        assert_eq!(decision.note.as_deref(), Some("ok"));
    }

    #[test]
    fn test_decision_requires_approved_field() {
        assert!(serde_json::from_value::<ApprovalDecision>(json!({"note": "hi"})).is_err());
        assert!(serde_json::from_value::<ApprovalDecision>(json!(true)).is_err());
        assert!(serde_json::from_value::<ApprovalDecision>(
            json!({"approved": true, "remember": "forever"})
        )
        .is_err());
    }

    #[test]
    fn test_default_description_keeps_argument_order() {
        let tool_args = args(json!({"path": "config.json", "lines_changed": 5}));
        assert_eq!(
            default_description("patch_file", &tool_args),
            r#"patch_file(path="config.json", lines_changed=5)"#
        );

        assert_eq!(default_description("get_time", &ToolArgs::new()), "get_time()");
    }

    #[test]
    fn test_request_described() {
        let request = ApprovalRequest::described("shell_exec", args(json!({"command": "ls -la"})));
        assert_eq!(request.tool_name, "shell_exec");
        assert_eq!(request.description, r#"shell_exec(command="ls -la")"#);
    }

    #[test]
    fn test_remember_display() {
        assert_eq!(Remember::None.to_string(), "none");
        assert_eq!(Remember::Session.to_string(), "session");
    }
}
