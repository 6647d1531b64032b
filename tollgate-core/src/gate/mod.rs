//! The approval gate wrapped around a tool executor.
//!
//! [`ApprovalGate`] sits between whatever decides to call a tool (usually an
//! LLM agent loop) and the [`ToolExecutor`] that runs it. Every call goes
//! through [`ApprovalGate::authorize`] first; only authorized calls reach the
//! executor.

mod authorize;

pub use authorize::Authorized;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use crate::approval::{
    ApprovalCallback, ApprovalController, SessionCache, ToolArgs, ToolPolicy,
};
use crate::config::ApprovalConfig;
use crate::context::CallContext;
use crate::error::Result;
use crate::events::{GateEvent, GateHook, HookId};
use crate::tool::{ToolError, ToolExecutor, ToolResult};

/// Wraps a [`ToolExecutor`] so that every call is approved before it runs.
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::{sync_callback, ApprovalDecision, ApprovalRequest};
/// use tollgate_core::{ApprovalConfig, ApprovalGate, CallContext, ToolBox};
///
/// # tokio_test::block_on(async {
/// let gate = ApprovalGate::new(
///     ToolBox::new(),
///     sync_callback(|_: &ApprovalRequest| ApprovalDecision::deny_with_note("not today")),
/// )
/// .with_config(ApprovalConfig::new().pre_approve("read_file"));
///
/// let err = gate
///     .call("delete_file", Default::default(), &CallContext::new())
///     .await
///     .unwrap_err();
/// assert!(err.is_denied());
/// # });
/// ```
pub struct ApprovalGate<E> {
    inner: E,
    callback: Arc<dyn ApprovalCallback>,
    config: ApprovalConfig,
    policy: Option<Arc<dyn ToolPolicy>>,
    cache: Arc<SessionCache>,
    hooks: parking_lot::RwLock<Vec<(HookId, Arc<dyn GateHook>)>>,
    next_hook_id: AtomicU64,
}

impl<E: ToolExecutor> ApprovalGate<E> {
    /// Gate `inner` behind `callback`, with empty configuration and no policy.
    ///
    /// With no configuration every tool needs approval.
    pub fn new(inner: E, callback: impl ApprovalCallback + 'static) -> Self {
        Self::with_shared_callback(inner, Arc::new(callback))
    }

    /// Like [`new`](Self::new) for a callback that is already shared.
    pub fn with_shared_callback(inner: E, callback: Arc<dyn ApprovalCallback>) -> Self {
        Self {
            inner,
            callback,
            config: ApprovalConfig::default(),
            policy: None,
            cache: Arc::new(SessionCache::new()),
            hooks: parking_lot::RwLock::new(Vec::new()),
            next_hook_id: AtomicU64::new(0),
        }
    }

    /// Gate `inner` using a controller's mode and session cache.
    ///
    /// Fails with [`Error::MissingCallback`](crate::Error::MissingCallback)
    /// for an interactive controller without a callback.
    pub fn from_controller(inner: E, controller: &ApprovalController) -> Result<Self> {
        Ok(Self::with_shared_callback(inner, controller.callback()?)
            .with_cache(Arc::clone(controller.cache())))
    }

    /// Set the static configuration.
    pub fn with_config(mut self, config: ApprovalConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a custom policy, consulted before the configuration.
    pub fn with_policy(mut self, policy: impl ToolPolicy + 'static) -> Self {
        self.policy = Some(Arc::new(policy));
        self
    }

    /// Install a custom policy that is already shared.
    pub fn with_shared_policy(mut self, policy: Arc<dyn ToolPolicy>) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Use an existing session cache, e.g. one shared with other gates.
    pub fn with_cache(mut self, cache: Arc<SessionCache>) -> Self {
        self.cache = cache;
        self
    }

    /// Register a hook at construction time.
    pub fn with_hook(self, hook: impl GateHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    /// The wrapped executor.
    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// The static configuration.
    pub fn config(&self) -> &ApprovalConfig {
        &self.config
    }

    /// The session cache.
    pub fn cache(&self) -> &Arc<SessionCache> {
        &self.cache
    }

    /// True if a custom policy is installed.
    pub fn has_policy(&self) -> bool {
        self.policy.is_some()
    }

    /// Add an event hook to observe gated calls
    ///
    /// # Example
    /// ```
    /// use tollgate_core::approval::{sync_callback, ApprovalDecision, ApprovalRequest};
    /// use tollgate_core::{ApprovalGate, GateEvent, ToolBox};
    ///
    /// let gate = ApprovalGate::new(
    ///     ToolBox::new(),
    ///     sync_callback(|_: &ApprovalRequest| ApprovalDecision::approve()),
    /// );
    ///
    /// let id = gate.add_hook(|event: &GateEvent| {
    ///     if let GateEvent::ApprovalDenied { tool_name, .. } = event {
    ///         eprintln!("denied: {}", tool_name);
    ///     }
    /// });
    /// assert!(gate.remove_hook(id));
    /// ```
    pub fn add_hook(&self, hook: impl GateHook + 'static) -> HookId {
        let id = HookId(self.next_hook_id.fetch_add(1, Ordering::Relaxed));
        self.hooks.write().push((id, Arc::new(hook)));
        id
    }

    /// Remove a hook. Returns false if it was not registered.
    pub fn remove_hook(&self, id: HookId) -> bool {
        let mut hooks = self.hooks.write();
        let before = hooks.len();
        hooks.retain(|(hook_id, _)| *hook_id != id);
        hooks.len() != before
    }

    /// Emit an event to all registered hooks, in registration order
    pub(crate) fn emit_event(&self, event: GateEvent) {
        // Snapshot so hooks may add or remove hooks without deadlocking
        let hooks: Vec<Arc<dyn GateHook>> =
            self.hooks.read().iter().map(|(_, h)| Arc::clone(h)).collect();
        for hook in hooks {
            hook.on_event(&event);
        }
    }

    /// Authorize and run a tool call.
    ///
    /// Returns the executor's result unchanged. Fails with
    /// [`Error::Blocked`](crate::Error::Blocked),
    /// [`Error::Denied`](crate::Error::Denied) or another authorization error
    /// without running anything, or with [`Error::Tool`](crate::Error::Tool)
    /// if the executor failed.
    pub async fn call(
        &self,
        tool_name: &str,
        tool_args: ToolArgs,
        ctx: &CallContext,
    ) -> Result<ToolResult> {
        let start = Instant::now();

        // Emit ToolRequested (always fires exactly once)
        self.emit_event(GateEvent::ToolRequested {
            call_id: ctx.call_id.clone(),
            tool_name: tool_name.to_string(),
            tool_args: tool_args.clone(),
        });

        self.authorize(tool_name, &tool_args, ctx).await?;

        log::debug!("executing {} (call {})", tool_name, ctx.call_id);
        match self.inner.execute(tool_name, tool_args, ctx).await {
            Ok(output) => {
                self.emit_event(GateEvent::ToolCompleted {
                    call_id: ctx.call_id.clone(),
                    tool_name: tool_name.to_string(),
                    output: output.clone(),
                    duration: start.elapsed(),
                });
                Ok(output)
            }
            Err(e) => {
                log::warn!("tool {} failed: {}", tool_name, e);
                self.emit_event(GateEvent::ToolFailed {
                    call_id: ctx.call_id.clone(),
                    tool_name: tool_name.to_string(),
                    error: e.to_string(),
                    duration: start.elapsed(),
                });
                Err(e.into())
            }
        }
    }

    /// Like [`call`](Self::call) for arguments that arrive as untyped JSON.
    ///
    /// Tool input must be a JSON object; anything else fails with
    /// [`ToolError::InvalidInput`] before authorization.
    pub async fn call_json(
        &self,
        tool_name: &str,
        tool_args: Value,
        ctx: &CallContext,
    ) -> Result<ToolResult> {
        match tool_args {
            Value::Object(args) => self.call(tool_name, args, ctx).await,
            other => {
                let type_name = match &other {
                    Value::Null => "null",
                    Value::Bool(_) => "boolean",
                    Value::Number(_) => "number",
                    Value::String(_) => "string",
                    Value::Array(_) => "array",
                    Value::Object(_) => "object",
                };
                Err(ToolError::InvalidInput(format!(
                    "Tool input must be a JSON object, got: {}",
                    type_name
                ))
                .into())
            }
        }
    }
}

impl<E> std::fmt::Debug for ApprovalGate<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApprovalGate")
            .field("config", &self.config)
            .field("has_policy", &self.policy.is_some())
            .field("cached_approvals", &self.cache.len())
            .field("hooks", &self.hooks.read().len())
            .finish_non_exhaustive()
    }
}
