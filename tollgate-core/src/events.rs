use std::time::Duration;

use crate::approval::{ApprovalDecision, ApprovalRequest, Remember, ToolArgs};
use crate::tool::ToolResult;

/// Events emitted while a gated call moves through approval and execution
///
/// Every call emits `ToolRequested` first, then exactly one of the
/// authorization events, then `ToolCompleted`/`ToolFailed` if it ran.
#[derive(Debug, Clone)]
pub enum GateEvent {
    // ===== Call Lifecycle =====
    /// A tool call arrived at the gate (fires exactly once per call)
    ToolRequested {
        /// Call ID from the [`crate::CallContext`]
        call_id: String,
        /// Tool name
        tool_name: String,
        /// Input arguments
        tool_args: ToolArgs,
    },

    // ===== Authorization =====
    /// Policy blocked the call; no human was asked
    PolicyBlocked {
        call_id: String,
        tool_name: String,
        /// Reason given by the policy
        reason: String,
    },

    /// Policy or configuration allowed the call without asking
    PreApproved { call_id: String, tool_name: String },

    /// An identical call was already approved for this session
    SessionCacheHit {
        call_id: String,
        tool_name: String,
        /// Fingerprint of the canonical arguments
        params_hash: String,
    },

    /// A human is being asked
    ApprovalRequested {
        call_id: String,
        /// What the human sees
        request: ApprovalRequest,
        /// Fingerprint of the canonical arguments
        params_hash: String,
    },

    /// The human approved
    ApprovalGranted {
        call_id: String,
        tool_name: String,
        /// Whether the approval was remembered for the session
        remember: Remember,
    },

    /// The human denied
    ApprovalDenied {
        call_id: String,
        tool_name: String,
        /// The denying decision
        decision: ApprovalDecision,
    },

    /// The approval request never got an answer
    ApprovalCancelled {
        call_id: String,
        tool_name: String,
        /// What happened to the request
        reason: String,
    },

    // ===== Execution =====
    /// Tool execution completed successfully
    ToolCompleted {
        call_id: String,
        tool_name: String,
        /// Tool output
        output: ToolResult,
        /// Execution duration
        duration: Duration,
    },

    /// Tool execution failed
    ToolFailed {
        call_id: String,
        tool_name: String,
        /// Error message
        error: String,
        /// How long before failure
        duration: Duration,
    },
}

impl GateEvent {
    /// Call ID this event belongs to
    pub fn call_id(&self) -> &str {
        match self {
            GateEvent::ToolRequested { call_id, .. }
            | GateEvent::PolicyBlocked { call_id, .. }
            | GateEvent::PreApproved { call_id, .. }
            | GateEvent::SessionCacheHit { call_id, .. }
            | GateEvent::ApprovalRequested { call_id, .. }
            | GateEvent::ApprovalGranted { call_id, .. }
            | GateEvent::ApprovalDenied { call_id, .. }
            | GateEvent::ApprovalCancelled { call_id, .. }
            | GateEvent::ToolCompleted { call_id, .. }
            | GateEvent::ToolFailed { call_id, .. } => call_id,
        }
    }
}

/// Hook for observing gate events
///
/// # Example
/// ```
/// use tollgate_core::events::{GateEvent, GateHook};
///
/// struct Audit;
///
/// impl GateHook for Audit {
///     fn on_event(&self, event: &GateEvent) {
///         match event {
///             GateEvent::ApprovalDenied { tool_name, decision, .. } => {
///                 println!("{} denied: {:?}", tool_name, decision.note);
///             }
///             GateEvent::PolicyBlocked { tool_name, reason, .. } => {
///                 println!("{} blocked: {}", tool_name, reason);
///             }
///             _ => {}
///         }
///     }
/// }
/// ```
pub trait GateHook: Send + Sync {
    /// Called when an event occurs
    fn on_event(&self, event: &GateEvent);
}

/// Blanket implementation for closures
impl<F> GateHook for F
where
    F: Fn(&GateEvent) + Send + Sync,
{
    fn on_event(&self, event: &GateEvent) {
        self(event)
    }
}

/// Unique identifier for a registered hook.
///
/// Used to remove hooks via [`crate::ApprovalGate::remove_hook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(pub(crate) u64);
