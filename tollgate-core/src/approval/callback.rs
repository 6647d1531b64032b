//! Human approval callbacks, synchronous or asynchronous.
//!
//! A callback receives an [`ApprovalRequest`] and answers with a
//! [`CallbackReply`]. A reply is either ready right away (a CLI prompt that
//! blocked until the user typed an answer) or pending (a web dashboard or
//! chat bot that answers later). The gate only awaits pending replies.

use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::future::Future;
use tokio::sync::oneshot;

use crate::error::{Error, Result};

use super::types::{ApprovalDecision, ApprovalRequest};

/// Future behind a [`CallbackReply::Pending`].
pub type PendingReply = BoxFuture<'static, std::result::Result<CallbackReply, CallbackError>>;

/// Why a pending reply never produced a decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallbackError {
    /// The request was withdrawn before anyone answered.
    #[error("approval request cancelled")]
    Cancelled,

    /// The interactive layer went away (closed channel, dropped session).
    #[error("approval request abandoned: {0}")]
    Abandoned(String),
}

/// What a callback hands back to the gate.
///
/// There is intentionally no `From<bool>`: "yes" alone does not say whether
/// the approval should be remembered, so callers must build an
/// [`ApprovalDecision`].
pub enum CallbackReply {
    /// A decision, available now.
    Ready(ApprovalDecision),

    /// A decision as untyped JSON, e.g. posted by a web UI.
    ///
    /// Parsed strictly; anything that is not a decision object (a bare
    /// `true`, a string, an object without `approved`) is rejected.
    Raw(Value),

    /// A decision that will arrive later.
    Pending(PendingReply),
}

impl CallbackReply {
    /// Wrap a decision that is available now.
    pub fn ready(decision: ApprovalDecision) -> Self {
        Self::Ready(decision)
    }

    /// Wrap an untyped JSON answer.
    pub fn raw(value: Value) -> Self {
        Self::Raw(value)
    }

    /// Wrap a future that resolves to a decision.
    pub fn pending<F>(future: F) -> Self
    where
        F: Future<Output = ApprovalDecision> + Send + 'static,
    {
        Self::Pending(future.map(|decision| Ok(CallbackReply::Ready(decision))).boxed())
    }

    /// Wrap a future that resolves to another reply or fails.
    pub fn pending_reply<F>(future: F) -> Self
    where
        F: Future<Output = std::result::Result<CallbackReply, CallbackError>> + Send + 'static,
    {
        Self::Pending(future.boxed())
    }

    /// Wait for a decision sent over a oneshot channel.
    ///
    /// Dropping the sender without answering cancels the request.
    pub fn from_receiver(rx: oneshot::Receiver<ApprovalDecision>) -> Self {
        Self::pending_reply(async move {
            rx.await
                .map(CallbackReply::Ready)
                .map_err(|_| CallbackError::Abandoned("response channel closed".to_string()))
        })
    }

    /// True if resolving this reply requires awaiting.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending(_))
    }

    /// Turn the reply into a decision, awaiting only if it is pending.
    pub async fn resolve(self, tool_name: &str) -> Result<ApprovalDecision> {
        let mut reply = self;
        loop {
            match reply {
                Self::Ready(decision) => return Ok(decision),
                Self::Raw(value) => return parse_raw_decision(value),
                Self::Pending(future) => {
                    reply = future.await.map_err(|e| Error::Cancelled {
                        tool_name: tool_name.to_string(),
                        reason: e.to_string(),
                    })?;
                }
            }
        }
    }

    /// Turn the reply into a decision without awaiting.
    ///
    /// Fails with [`Error::PendingCallbackInSyncContext`] for pending replies.
    pub fn resolve_sync(self) -> Result<ApprovalDecision> {
        match self {
            Self::Ready(decision) => Ok(decision),
            Self::Raw(value) => parse_raw_decision(value),
            Self::Pending(_) => Err(Error::PendingCallbackInSyncContext),
        }
    }
}

impl From<ApprovalDecision> for CallbackReply {
    fn from(decision: ApprovalDecision) -> Self {
        Self::Ready(decision)
    }
}

impl std::fmt::Debug for CallbackReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(decision) => f.debug_tuple("Ready").field(decision).finish(),
            Self::Raw(value) => f.debug_tuple("Raw").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

fn parse_raw_decision(value: Value) -> Result<ApprovalDecision> {
    match value {
        Value::Bool(b) => Err(Error::MalformedCallbackResult(format!(
            "callback returned bare boolean `{}`; return an approval decision so the remember flag is explicit",
            b
        ))),
        Value::Object(_) => serde_json::from_value(value).map_err(|e| {
            Error::MalformedCallbackResult(format!("callback returned an invalid decision: {}", e))
        }),
        other => Err(Error::MalformedCallbackResult(format!(
            "callback returned {} instead of an approval decision",
            json_type_name(&other)
        ))),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Presents an [`ApprovalRequest`] to a human and reports the answer.
///
/// Closures `Fn(&ApprovalRequest) -> CallbackReply` implement this trait.
/// For closures returning a plain [`ApprovalDecision`] or a future of one,
/// use [`sync_callback`] or [`async_callback`].
pub trait ApprovalCallback: Send + Sync {
    /// Ask for a decision.
    fn request(&self, request: &ApprovalRequest) -> CallbackReply;
}

/// Blanket implementation for closures
impl<F> ApprovalCallback for F
where
    F: Fn(&ApprovalRequest) -> CallbackReply + Send + Sync,
{
    fn request(&self, request: &ApprovalRequest) -> CallbackReply {
        self(request)
    }
}

/// Callback built from a blocking function. See [`sync_callback`].
pub struct SyncCallback<F>(F);

impl<F> ApprovalCallback for SyncCallback<F>
where
    F: Fn(&ApprovalRequest) -> ApprovalDecision + Send + Sync,
{
    fn request(&self, request: &ApprovalRequest) -> CallbackReply {
        CallbackReply::Ready((self.0)(request))
    }
}

/// Callback built from an async function. See [`async_callback`].
pub struct AsyncCallback<F>(F);

impl<F, Fut> ApprovalCallback for AsyncCallback<F>
where
    F: Fn(ApprovalRequest) -> Fut + Send + Sync,
    Fut: Future<Output = ApprovalDecision> + Send + 'static,
{
    fn request(&self, request: &ApprovalRequest) -> CallbackReply {
        CallbackReply::pending((self.0)(request.clone()))
    }
}

/// Adapt a function that blocks until the human answers.
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::{sync_callback, ApprovalCallback, ApprovalDecision, ApprovalRequest};
///
/// let callback = sync_callback(|request: &ApprovalRequest| {
///     if request.tool_name == "get_time" {
///         ApprovalDecision::approve()
///     } else {
///         ApprovalDecision::deny_with_note("not now")
///     }
/// });
///
/// let request = ApprovalRequest::described("get_time", Default::default());
/// assert!(!callback.request(&request).is_pending());
/// ```
pub fn sync_callback<F>(f: F) -> SyncCallback<F>
where
    F: Fn(&ApprovalRequest) -> ApprovalDecision + Send + Sync,
{
    SyncCallback(f)
}

/// Adapt an async function; the gate awaits its future.
///
/// The request is cloned into the function so the future can outlive the
/// borrow.
pub fn async_callback<F, Fut>(f: F) -> AsyncCallback<F>
where
    F: Fn(ApprovalRequest) -> Fut + Send + Sync,
    Fut: Future<Output = ApprovalDecision> + Send + 'static,
{
    AsyncCallback(f)
}
