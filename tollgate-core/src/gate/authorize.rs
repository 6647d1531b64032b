//! Authorization flow for a single call.

use crate::approval::{
    default_description, evaluate, hash_params, ApprovalDecision, ApprovalRequest, ApprovalResult,
    ToolArgs,
};
use crate::context::CallContext;
use crate::error::{Error, Result};
use crate::events::GateEvent;
use crate::tool::ToolExecutor;

use super::ApprovalGate;

/// How a call was allowed through.
#[derive(Debug, Clone, PartialEq)]
pub enum Authorized {
    /// Policy or configuration allowed it without asking.
    PreApproved,
    /// An identical call was approved earlier in the session.
    SessionCache,
    /// A human approved it just now.
    User(ApprovalDecision),
}

impl<E: ToolExecutor> ApprovalGate<E> {
    /// Decide whether a call may run, asking the human if needed.
    ///
    /// 1. Evaluate policy and configuration. Blocked calls fail here and
    ///    never reach the human; pre-approved calls pass.
    /// 2. Check the session cache for an identical approved call.
    /// 3. Ask the callback, awaiting only if its reply is pending. Approvals
    ///    remembered for the session are cached; denials never are.
    ///
    /// Nothing is executed. [`call`](Self::call) runs this first.
    pub async fn authorize(
        &self,
        tool_name: &str,
        tool_args: &ToolArgs,
        ctx: &CallContext,
    ) -> Result<Authorized> {
        match evaluate(
            tool_name,
            tool_args,
            ctx,
            &self.config,
            self.policy.as_deref(),
        ) {
            ApprovalResult::Blocked { reason } => {
                log::info!("{} blocked by policy: {}", tool_name, reason);
                self.emit_event(GateEvent::PolicyBlocked {
                    call_id: ctx.call_id.clone(),
                    tool_name: tool_name.to_string(),
                    reason: reason.clone(),
                });
                return Err(Error::Blocked {
                    tool_name: tool_name.to_string(),
                    reason,
                });
            }
            ApprovalResult::PreApproved => {
                log::debug!("{} pre-approved", tool_name);
                self.emit_event(GateEvent::PreApproved {
                    call_id: ctx.call_id.clone(),
                    tool_name: tool_name.to_string(),
                });
                return Ok(Authorized::PreApproved);
            }
            ApprovalResult::NeedsApproval => {}
        }

        let params_hash = hash_params(tool_args);

        let cached = self
            .cache
            .lookup(tool_name, tool_args)
            .is_some_and(|decision| decision.approved);
        if cached {
            log::debug!("{} approved earlier this session", tool_name);
            self.emit_event(GateEvent::SessionCacheHit {
                call_id: ctx.call_id.clone(),
                tool_name: tool_name.to_string(),
                params_hash,
            });
            return Ok(Authorized::SessionCache);
        }

        self.prompt(tool_name, tool_args, ctx, params_hash).await
    }

    async fn prompt(
        &self,
        tool_name: &str,
        tool_args: &ToolArgs,
        ctx: &CallContext,
        params_hash: String,
    ) -> Result<Authorized> {
        let description = self
            .policy
            .as_ref()
            .and_then(|policy| policy.description(tool_name, tool_args, ctx))
            .unwrap_or_else(|| default_description(tool_name, tool_args));
        let request = ApprovalRequest::new(tool_name, tool_args.clone(), description);

        log::info!("requesting approval: {}", request.description);
        self.emit_event(GateEvent::ApprovalRequested {
            call_id: ctx.call_id.clone(),
            request: request.clone(),
            params_hash,
        });

        let reply = self.callback.request(&request);
        let decision = match reply.resolve(tool_name).await {
            Ok(decision) => decision,
            Err(e) => {
                if let Error::Cancelled { reason, .. } = &e {
                    log::warn!("approval for {} cancelled: {}", tool_name, reason);
                    self.emit_event(GateEvent::ApprovalCancelled {
                        call_id: ctx.call_id.clone(),
                        tool_name: tool_name.to_string(),
                        reason: reason.clone(),
                    });
                } else {
                    log::error!("approval callback for {} failed: {}", tool_name, e);
                }
                return Err(e);
            }
        };

        if !decision.approved {
            log::info!(
                "{} denied: {}",
                tool_name,
                decision.note.as_deref().unwrap_or("no reason given")
            );
            self.emit_event(GateEvent::ApprovalDenied {
                call_id: ctx.call_id.clone(),
                tool_name: tool_name.to_string(),
                decision: decision.clone(),
            });
            return Err(Error::Denied {
                tool_name: tool_name.to_string(),
                decision,
            });
        }

        if self.cache.store(tool_name, tool_args, &decision) {
            log::debug!("{} approved for the rest of the session", tool_name);
        }
        self.emit_event(GateEvent::ApprovalGranted {
            call_id: ctx.call_id.clone(),
            tool_name: tool_name.to_string(),
            remember: decision.remember,
        });
        Ok(Authorized::User(decision))
    }
}
