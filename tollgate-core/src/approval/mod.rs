//! Approval decisions for tool calls.
//!
//! Every call is classified before it runs. Blocked calls fail, pre-approved
//! calls run, and everything else is put to a human unless an identical call
//! was already approved for the session.
//!
//! # Overview
//!
//! - **[`ApprovalResult`]**: Classification of a call (Blocked, PreApproved, NeedsApproval)
//! - **[`ToolPolicy`]**: Custom classification logic, consulted before configuration
//! - **[`ApprovalRequest`] / [`ApprovalDecision`]**: What the human sees and what they answer
//! - **[`ApprovalCallback`]**: How the human is asked (sync or async)
//! - **[`SessionCache`]**: Approvals remembered for the session, keyed by tool and canonical arguments
//! - **[`ApprovalController`]**: Mode switch for interactive, approve-all, and strict operation
//!
//! # Default Behavior
//!
//! Tools without configuration **need approval**. Nothing runs unasked unless
//! configuration or a policy says so.
//!
//! # Example
//!
//! ```rust
//! use tollgate_core::approval::{ApprovalDecision, SessionCache, ToolArgs};
//! use serde_json::json;
//!
//! let cache = SessionCache::new();
//! let a: ToolArgs = json!({"path": "a.txt", "mode": "w"}).as_object().cloned().unwrap();
//! let b: ToolArgs = json!({"mode": "w", "path": "a.txt"}).as_object().cloned().unwrap();
//!
//! cache.store("write_file", &a, &ApprovalDecision::approve_for_session());
//!
//! // Key order does not matter
//! assert!(cache.contains("write_file", &b));
//! ```
//!
//! # Remember Scopes
//!
//! | Decision | Cached | Next identical call |
//! |----------|--------|---------------------|
//! | `approve()` | no | asks again |
//! | `approve_for_session()` | yes | runs without asking |
//! | `deny()` / `deny_with_note(..)` | no | asks again |

mod cache;
mod callback;
mod canonical;
mod controller;
mod policy;
mod types;

pub use cache::{CacheKey, CachedApproval, SessionCache};
pub use callback::{
    async_callback, sync_callback, ApprovalCallback, AsyncCallback, CallbackError, CallbackReply,
    PendingReply, SyncCallback,
};
pub use canonical::{canonical_json, hash_params};
pub use controller::{ApprovalController, ApprovalMode, ApproveAll, StrictDeny};
pub use policy::{evaluate, needs_approval_from_config, ToolPolicy};
pub use types::{
    default_description, ApprovalDecision, ApprovalRequest, ApprovalResult, Remember, ToolArgs,
};
