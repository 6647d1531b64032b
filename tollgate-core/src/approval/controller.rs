//! Mode-based approval handling.

use std::sync::Arc;

use super::cache::SessionCache;
use super::callback::{ApprovalCallback, CallbackReply};
use super::types::{ApprovalDecision, ApprovalRequest};
use crate::error::{Error, Result};

/// How requests are answered when no session approval applies.
///
/// # Security
///
/// `ApproveAll` skips the human entirely. Use it only in tests or sandboxes.
/// `Strict` denies everything that needs approval, which is the safe choice
/// for CI and other unattended runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ApprovalMode {
    /// Ask the human through the configured callback (default).
    #[default]
    Interactive,

    /// Approve every request without asking.
    ApproveAll,

    /// Deny every request without asking.
    Strict,
}

/// Callback that approves everything. Used by [`ApprovalMode::ApproveAll`].
pub struct ApproveAll;

impl ApprovalCallback for ApproveAll {
    fn request(&self, _request: &ApprovalRequest) -> CallbackReply {
        CallbackReply::Ready(ApprovalDecision::approve())
    }
}

/// Callback that denies everything. Used by [`ApprovalMode::Strict`].
pub struct StrictDeny;

impl ApprovalCallback for StrictDeny {
    fn request(&self, request: &ApprovalRequest) -> CallbackReply {
        CallbackReply::Ready(strict_denial(request))
    }
}

fn strict_denial(request: &ApprovalRequest) -> ApprovalDecision {
    ApprovalDecision::deny_with_note(format!(
        "Strict mode: {} requires approval",
        request.tool_name
    ))
}

/// Owns the approval mode, the callback, and the session cache.
///
/// Gates built with [`ApprovalGate::from_controller`](crate::ApprovalGate::from_controller)
/// share the controller's cache, so approvals granted through either are
/// visible to both.
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::{ApprovalController, ApprovalMode, ApprovalRequest};
///
/// let controller = ApprovalController::new(ApprovalMode::Strict);
/// let request = ApprovalRequest::described("any_tool", Default::default());
///
/// let decision = controller.request_approval_sync(&request).unwrap();
/// assert!(!decision.approved);
/// assert_eq!(decision.note.as_deref(), Some("Strict mode: any_tool requires approval"));
/// ```
pub struct ApprovalController {
    mode: ApprovalMode,
    callback: Option<Arc<dyn ApprovalCallback>>,
    cache: Arc<SessionCache>,
}

impl ApprovalController {
    /// Create a controller in the given mode, with no callback and an empty cache.
    pub fn new(mode: ApprovalMode) -> Self {
        Self {
            mode,
            callback: None,
            cache: Arc::new(SessionCache::new()),
        }
    }

    /// Create an interactive controller that asks through `callback`.
    pub fn interactive(callback: impl ApprovalCallback + 'static) -> Self {
        Self::new(ApprovalMode::Interactive).with_callback(callback)
    }

    /// Set the callback used in interactive mode.
    pub fn with_callback(mut self, callback: impl ApprovalCallback + 'static) -> Self {
        self.callback = Some(Arc::new(callback));
        self
    }

    /// Use an existing session cache.
    pub fn with_cache(mut self, cache: Arc<SessionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Current mode.
    pub fn mode(&self) -> ApprovalMode {
        self.mode
    }

    /// The session cache.
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// The callback a gate should use for this controller's mode.
    ///
    /// A configured callback always wins. Without one, `ApproveAll` and
    /// `Strict` get their built-in callbacks and `Interactive` fails with
    /// [`Error::MissingCallback`].
    pub fn callback(&self) -> Result<Arc<dyn ApprovalCallback>> {
        if let Some(callback) = &self.callback {
            return Ok(Arc::clone(callback));
        }

        match self.mode {
            ApprovalMode::ApproveAll => Ok(Arc::new(ApproveAll)),
            ApprovalMode::Strict => Ok(Arc::new(StrictDeny)),
            ApprovalMode::Interactive => Err(Error::MissingCallback),
        }
    }

    /// Check if this request is already approved for the session.
    pub fn is_session_approved(&self, request: &ApprovalRequest) -> bool {
        self.cache
            .lookup(&request.tool_name, &request.tool_args)
            .is_some_and(|d| d.approved)
    }

    /// Forget all session approvals.
    pub fn clear_session_approvals(&self) {
        self.cache.clear();
    }

    /// Answer a request according to the mode, awaiting the callback if needed.
    ///
    /// - `ApproveAll`: approved immediately
    /// - `Strict`: denied with a note
    /// - `Interactive`: session cache first, then the callback; session
    ///   approvals are cached
    pub async fn request_approval(&self, request: &ApprovalRequest) -> Result<ApprovalDecision> {
        let reply = match self.begin(request)? {
            Begin::Decided(decision) => return Ok(decision),
            Begin::Ask(reply) => reply,
        };
        let decision = reply.resolve(&request.tool_name).await?;
        self.remember(request, &decision);
        Ok(decision)
    }

    /// Like [`request_approval`](Self::request_approval) without awaiting.
    ///
    /// A callback that replies with a pending future fails with
    /// [`Error::PendingCallbackInSyncContext`].
    pub fn request_approval_sync(&self, request: &ApprovalRequest) -> Result<ApprovalDecision> {
        let reply = match self.begin(request)? {
            Begin::Decided(decision) => return Ok(decision),
            Begin::Ask(reply) => reply,
        };
        let decision = reply.resolve_sync()?;
        self.remember(request, &decision);
        Ok(decision)
    }

    fn begin(&self, request: &ApprovalRequest) -> Result<Begin> {
        match self.mode {
            ApprovalMode::ApproveAll => return Ok(Begin::Decided(ApprovalDecision::approve())),
            ApprovalMode::Strict => return Ok(Begin::Decided(strict_denial(request))),
            ApprovalMode::Interactive => {}
        }

        if let Some(cached) = self.cache.lookup(&request.tool_name, &request.tool_args) {
            log::debug!("session approval reused for {}", request.tool_name);
            return Ok(Begin::Decided(cached));
        }

        let callback = self.callback.as_ref().ok_or(Error::MissingCallback)?;
        Ok(Begin::Ask(callback.request(request)))
    }

    fn remember(&self, request: &ApprovalRequest, decision: &ApprovalDecision) {
        if self
            .cache
            .store(&request.tool_name, &request.tool_args, decision)
        {
            log::debug!("approval for {} remembered for session", request.tool_name);
        }
    }
}

impl Default for ApprovalController {
    fn default() -> Self {
        Self::new(ApprovalMode::default())
    }
}

enum Begin {
    Decided(ApprovalDecision),
    Ask(CallbackReply),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::approval::sync_callback;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn request(tool: &str, args: serde_json::Value) -> ApprovalRequest {
        ApprovalRequest::described(tool, args.as_object().cloned().unwrap())
    }

    fn counting(
        decision: ApprovalDecision,
    ) -> (Arc<AtomicUsize>, impl ApprovalCallback + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let callback = sync_callback(move |_: &ApprovalRequest| {
            seen.fetch_add(1, Ordering::SeqCst);
            decision.clone()
        });
        (count, callback)
    }

    #[test]
    fn test_default_mode_is_interactive() {
        assert_eq!(ApprovalController::default().mode(), ApprovalMode::Interactive);
    }

    #[test]
    fn test_approve_all_mode() {
        let controller = ApprovalController::new(ApprovalMode::ApproveAll);
        let decision = controller
            .request_approval_sync(&request("dangerous_tool", json!({"action": "destroy"})))
            .unwrap();
        assert!(decision.approved);
    }

    #[test]
    fn test_strict_mode() {
        let controller = ApprovalController::new(ApprovalMode::Strict);
        let decision = controller
            .request_approval_sync(&request("any_tool", json!({"key": "value"})))
            .unwrap();
        assert!(!decision.approved);
        assert!(decision.note.unwrap().contains("Strict mode"));
    }

    #[test]
    fn test_session_approval_caching() {
        let (count, callback) = counting(ApprovalDecision::approve_for_session());
        let controller = ApprovalController::interactive(callback);
        let req = request("write_file", json!({"path": "/tmp/test.txt"}));

        assert!(controller.request_approval_sync(&req).unwrap().approved);
        assert_eq!(count.load(Ordering::SeqCst), 1);

        assert!(controller.request_approval_sync(&req).unwrap().approved);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_session_approval_different_args() {
        let (count, callback) = counting(ApprovalDecision::approve_for_session());
        let controller = ApprovalController::interactive(callback);

        controller
            .request_approval_sync(&request("write_file", json!({"path": "/tmp/file1.txt"})))
            .unwrap();
        controller
            .request_approval_sync(&request("write_file", json!({"path": "/tmp/file2.txt"})))
            .unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_remember_none_not_cached() {
        let (count, callback) = counting(ApprovalDecision::approve());
        let controller = ApprovalController::interactive(callback);
        let req = request("write_file", json!({"path": "/tmp/test.txt"}));

        controller.request_approval_sync(&req).unwrap();
        controller.request_approval_sync(&req).unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_clear_session_approvals() {
        let (_, callback) = counting(ApprovalDecision::approve_for_session());
        let controller = ApprovalController::interactive(callback);
        let req = request("tool", json!({"key": "value"}));

        controller.request_approval_sync(&req).unwrap();
        assert!(controller.is_session_approved(&req));

        controller.clear_session_approvals();
        assert!(!controller.is_session_approved(&req));
    }

    #[test]
    fn test_interactive_without_callback_fails() {
        let controller = ApprovalController::new(ApprovalMode::Interactive);
        let err = controller
            .request_approval_sync(&request("tool", json!({})))
            .unwrap_err();
        assert!(matches!(err, Error::MissingCallback));
        assert!(matches!(controller.callback(), Err(Error::MissingCallback)));
    }

    #[test]
    fn test_sync_request_rejects_pending_callback() {
        let controller = ApprovalController::interactive(|_: &ApprovalRequest| {
            CallbackReply::pending(async { ApprovalDecision::approve() })
        });
        let err = controller
            .request_approval_sync(&request("tool", json!({})))
            .unwrap_err();
        assert!(matches!(err, Error::PendingCallbackInSyncContext));
    }

    #[tokio::test]
    async fn test_async_request_awaits_pending_callback() {
        let controller = ApprovalController::interactive(|_: &ApprovalRequest| {
            CallbackReply::pending(async { ApprovalDecision::approve_for_session() })
        });
        let req = request("tool", json!({"a": 1}));

        assert!(controller.request_approval(&req).await.unwrap().approved);
        assert!(controller.is_session_approved(&req));
    }

    #[test]
    fn test_mode_callbacks() {
        let req = request("tool", json!({}));

        let approve = ApprovalController::new(ApprovalMode::ApproveAll)
            .callback()
            .unwrap();
        assert!(approve.request(&req).resolve_sync().unwrap().approved);

        let strict = ApprovalController::new(ApprovalMode::Strict)
            .callback()
            .unwrap();
        assert!(!strict.request(&req).resolve_sync().unwrap().approved);
    }

    #[test]
    fn test_configured_callback_wins_over_mode() {
        let (count, callback) = counting(ApprovalDecision::deny());
        let controller = ApprovalController::new(ApprovalMode::ApproveAll).with_callback(callback);

        let decision = controller
            .callback()
            .unwrap()
            .request(&request("tool", json!({})))
            .resolve_sync()
            .unwrap();
        assert!(!decision.approved);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_shared_cache() {
        let cache = Arc::new(SessionCache::new());
        let (_, callback) = counting(ApprovalDecision::approve_for_session());
        let controller = ApprovalController::interactive(callback).with_cache(Arc::clone(&cache));

        controller
            .request_approval_sync(&request("tool", json!({"k": 1})))
            .unwrap();
        assert_eq!(cache.len(), 1);
    }
}
