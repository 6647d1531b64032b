//! Policy evaluation: blocked, pre-approved, or ask a human.

use crate::config::ApprovalConfig;
use crate::context::CallContext;

use super::types::{ApprovalResult, ToolArgs};

/// Custom approval logic for a set of tools.
///
/// Implement this when the static [`ApprovalConfig`] is not enough, e.g. to
/// let harmless shell commands through while blocking destructive ones
/// outright. Register it on the gate with
/// [`ApprovalGate::with_policy`](crate::ApprovalGate::with_policy).
///
/// Implementations must be free of side effects: the gate may evaluate the
/// same call more than once and expects the same answer.
///
/// # Example
///
/// ```rust
/// use tollgate_core::approval::{needs_approval_from_config, ApprovalResult, ToolArgs, ToolPolicy};
/// use tollgate_core::{ApprovalConfig, CallContext};
///
/// struct ShellPolicy;
///
/// impl ToolPolicy for ShellPolicy {
///     fn needs_approval(
///         &self,
///         tool_name: &str,
///         tool_args: &ToolArgs,
///         _ctx: &CallContext,
///         config: &ApprovalConfig,
///     ) -> ApprovalResult {
///         let command = tool_args.get("command").and_then(|c| c.as_str()).unwrap_or("");
///         if tool_name == "shell_exec" && command.starts_with("rm -rf /") {
///             return ApprovalResult::blocked("forbidden");
///         }
///         needs_approval_from_config(tool_name, config)
///     }
/// }
/// ```
pub trait ToolPolicy: Send + Sync {
    /// Classify a call.
    ///
    /// Returning [`ApprovalResult::NeedsApproval`] defers to the static
    /// configuration, which may still pre-approve the tool.
    fn needs_approval(
        &self,
        tool_name: &str,
        tool_args: &ToolArgs,
        ctx: &CallContext,
        config: &ApprovalConfig,
    ) -> ApprovalResult;

    /// Description shown to the human when the call needs approval.
    ///
    /// `None` falls back to [`default_description`](super::default_description).
    fn description(&self, tool_name: &str, tool_args: &ToolArgs, ctx: &CallContext) -> Option<String> {
        let _ = (tool_name, tool_args, ctx);
        None
    }
}

/// Config-only classification: pre-approved if configured so, otherwise ask.
pub fn needs_approval_from_config(tool_name: &str, config: &ApprovalConfig) -> ApprovalResult {
    if config.is_pre_approved(tool_name) {
        ApprovalResult::PreApproved
    } else {
        ApprovalResult::NeedsApproval
    }
}

/// Classify a call.
///
/// The custom policy, when present, is consulted first and its `Blocked` or
/// `PreApproved` answer is final. `NeedsApproval` (or no policy at all) falls
/// through to [`needs_approval_from_config`]. Unconfigured tools always need
/// approval.
pub fn evaluate(
    tool_name: &str,
    tool_args: &ToolArgs,
    ctx: &CallContext,
    config: &ApprovalConfig,
    policy: Option<&dyn ToolPolicy>,
) -> ApprovalResult {
    if let Some(policy) = policy {
        match policy.needs_approval(tool_name, tool_args, ctx, config) {
            ApprovalResult::NeedsApproval => {}
            decided => return decided,
        }
    }
    needs_approval_from_config(tool_name, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn args(value: Value) -> ToolArgs {
        value.as_object().cloned().unwrap()
    }

    struct FixedPolicy(ApprovalResult);

    impl ToolPolicy for FixedPolicy {
        fn needs_approval(
            &self,
            _tool_name: &str,
            _tool_args: &ToolArgs,
            _ctx: &CallContext,
            _config: &ApprovalConfig,
        ) -> ApprovalResult {
            self.0.clone()
        }
    }

    #[test]
    fn test_config_pre_approved() {
        let config = ApprovalConfig::new().pre_approve("safe_tool");
        assert!(needs_approval_from_config("safe_tool", &config).is_pre_approved());
    }

    #[test]
    fn test_unconfigured_needs_approval() {
        let result = evaluate(
            "unknown_tool",
            &ToolArgs::new(),
            &CallContext::new(),
            &ApprovalConfig::new(),
            None,
        );
        assert!(result.is_needs_approval());
    }

    #[test]
    fn test_policy_block_wins_over_config() {
        let config = ApprovalConfig::new().pre_approve("shell_exec");
        let policy = FixedPolicy(ApprovalResult::blocked("forbidden"));

        let result = evaluate(
            "shell_exec",
            &args(json!({"command": "rm -rf /"})),
            &CallContext::new(),
            &config,
            Some(&policy),
        );
        assert_eq!(result, ApprovalResult::blocked("forbidden"));
    }

    #[test]
    fn test_policy_pre_approval_is_final() {
        let policy = FixedPolicy(ApprovalResult::PreApproved);
        let result = evaluate(
            "anything",
            &ToolArgs::new(),
            &CallContext::new(),
            &ApprovalConfig::new(),
            Some(&policy),
        );
        assert!(result.is_pre_approved());
    }

    #[test]
    fn test_policy_deferral_falls_through_to_config() {
        let policy = FixedPolicy(ApprovalResult::NeedsApproval);
        let config = ApprovalConfig::new().pre_approve("read_file");
        let ctx = CallContext::new();

        let result = evaluate("read_file", &ToolArgs::new(), &ctx, &config, Some(&policy));
        assert!(result.is_pre_approved());

        let result = evaluate("write_file", &ToolArgs::new(), &ctx, &config, Some(&policy));
        assert!(result.is_needs_approval());
    }

    #[test]
    fn test_default_description_is_none() {
        let policy = FixedPolicy(ApprovalResult::NeedsApproval);
        assert!(policy
            .description("tool", &ToolArgs::new(), &CallContext::new())
            .is_none());
    }

    #[test]
    fn test_evaluate_is_deterministic() {
        let config = ApprovalConfig::new().pre_approve("a");
        let ctx = CallContext::new();
        for name in ["a", "b"] {
            let first = evaluate(name, &ToolArgs::new(), &ctx, &config, None);
            let second = evaluate(name, &ToolArgs::new(), &ctx, &config, None);
            assert_eq!(first, second);
        }
    }
}
