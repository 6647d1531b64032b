//! Top-level error types for tollgate
//!
//! Gated calls fail in ways callers need to tell apart:
//!
//! - [`Error::Blocked`] - Policy forbids the call; adjusting arguments rarely helps
//! - [`Error::Denied`] - A human said no; the agent can read the note and try again
//! - [`Error::Cancelled`] - Nobody answered; neither a yes nor a no
//! - [`Error::MalformedCallbackResult`] - Integration bug in the approval callback
//! - [`Error::Tool`] - The approved tool itself failed
//! - [`Error::Config`] - Fix configuration

use thiserror::Error;

use crate::approval::ApprovalDecision;
use crate::tool::ToolError;

/// Top-level error type for tollgate operations
#[derive(Debug, Error)]
pub enum Error {
    /// Policy forbids this call
    #[error("tool '{tool_name}' blocked by policy: {reason}")]
    Blocked {
        /// Tool that was called
        tool_name: String,
        /// Reason given by the policy
        reason: String,
    },

    /// The human denied this call
    #[error("user denied {tool_name}: {}", .decision.note.as_deref().unwrap_or("no reason given"))]
    Denied {
        /// Tool that was called
        tool_name: String,
        /// The denying decision, including any note for the requester
        decision: ApprovalDecision,
    },

    /// The approval request was cancelled before a decision arrived
    #[error("approval for tool '{tool_name}' was cancelled: {reason}")]
    Cancelled {
        /// Tool that was called
        tool_name: String,
        /// What happened to the request
        reason: String,
    },

    /// The approval callback answered with something other than a decision
    #[error("malformed approval callback result: {0}")]
    MalformedCallbackResult(String),

    /// Interactive approval requested but no callback was configured
    #[error("no approval callback configured for interactive mode")]
    MissingCallback,

    /// A synchronous approval path received a pending reply
    #[error("approval callback returned a pending reply; use the async request path")]
    PendingCallbackInSyncContext,

    /// Tool execution failed
    #[error("tool error: {0}")]
    Tool(#[from] ToolError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Returns true if policy blocked the call
    pub fn is_blocked(&self) -> bool {
        matches!(self, Self::Blocked { .. })
    }

    /// Returns true if a human denied the call
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::Denied { .. })
    }

    /// Returns true if the approval request was cancelled
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// Returns true if the callback produced something that is not a decision
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedCallbackResult(_))
    }

    /// Returns true if the tool ran and failed
    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Tool(_))
    }

    /// Returns true if this is a configuration error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if the requesting agent is expected to adjust and carry on
    ///
    /// Only human denials qualify: the note tells the agent what to change.
    /// Policy blocks, cancellations, and integration errors are not something
    /// a different set of arguments will fix.
    pub fn is_recoverable(&self) -> bool {
        self.is_denied()
    }

    /// The denying decision, if a human said no
    pub fn decision(&self) -> Option<&ApprovalDecision> {
        match self {
            Self::Denied { decision, .. } => Some(decision),
            _ => None,
        }
    }
}

/// Result type for tollgate operations
pub type Result<T> = std::result::Result<T, Error>;
