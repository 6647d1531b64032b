//! Interactive Approval Example
//!
//! Replays a short list of tool calls through an approval gate:
//!
//! 1. **read_file** - Pre-approved in config (never prompts)
//! 2. **shell_exec** - Prompts; answer `s` to approve identical commands for the session
//! 3. **shell_exec rm -rf /** - Blocked by policy before anyone is asked
//!
//! At each prompt answer `y` (once), `s` (session) or `n` (deny, with an
//! optional note after a space, e.g. `n use ls instead`).
//!
//! Run with: cargo run --example session_approvals

use schemars::JsonSchema;
use serde::Deserialize;
use std::io::{self, BufRead, Write};
use tollgate_core::approval::{
    needs_approval_from_config, sync_callback, ApprovalDecision, ApprovalRequest, ApprovalResult,
    ToolArgs, ToolPolicy,
};
use tollgate_core::{
    box_tools, ApprovalConfig, ApprovalGate, CallContext, Error, GateEvent, Tool, ToolBox,
    ToolError, ToolResult,
};

// =============================================================================
// Tool Definitions
// =============================================================================

#[derive(Debug, Deserialize, JsonSchema)]
struct ReadFileInput {
    /// Path to read
    path: String,
}

struct ReadFile;

impl Tool for ReadFile {
    type Input = ReadFileInput;

    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read a file (safe, no side effects)"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::text(format!("<contents of {}>", input.path)))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ShellInput {
    /// Command line to run
    command: String,
}

struct ShellExec;

impl Tool for ShellExec {
    type Input = ShellInput;

    fn name(&self) -> &str {
        "shell_exec"
    }

    fn description(&self) -> &str {
        "Run a shell command (pretend)"
    }

    async fn execute(&self, input: Self::Input) -> Result<ToolResult, ToolError> {
        Ok(ToolResult::text(format!("$ {}\n<output>", input.command)))
    }
}

// =============================================================================
// Policy
// =============================================================================

struct NoRootWipe;

impl ToolPolicy for NoRootWipe {
    fn needs_approval(
        &self,
        tool_name: &str,
        tool_args: &ToolArgs,
        _ctx: &CallContext,
        config: &ApprovalConfig,
    ) -> ApprovalResult {
        let command = tool_args
            .get("command")
            .and_then(|c| c.as_str())
            .unwrap_or_default();
        if tool_name == "shell_exec" && command.trim_start().starts_with("rm -rf /") {
            return ApprovalResult::blocked("wiping the filesystem is never allowed");
        }
        needs_approval_from_config(tool_name, config)
    }

    fn description(&self, tool_name: &str, tool_args: &ToolArgs, _ctx: &CallContext) -> Option<String> {
        let command = tool_args.get("command")?.as_str()?;
        (tool_name == "shell_exec").then(|| format!("Run `{}`", command))
    }
}

// =============================================================================
// Prompt
// =============================================================================

fn prompt(request: &ApprovalRequest) -> ApprovalDecision {
    print!("\nApprove {}? [y/s/n] ", request.description);
    let _ = io::stdout().flush();

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return ApprovalDecision::deny_with_note("could not read answer");
    }

    let line = line.trim();
    let (answer, note) = line.split_once(' ').unwrap_or((line, ""));
    match answer {
        "y" | "yes" => ApprovalDecision::approve(),
        "s" | "session" => ApprovalDecision::approve_for_session(),
        _ if note.is_empty() => ApprovalDecision::deny(),
        _ => ApprovalDecision::deny_with_note(note),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApprovalConfig::from_json_str(r#"{"read_file": {"pre_approved": true}}"#)?;

    let gate = ApprovalGate::new(
        ToolBox::new().with_tools(box_tools![ReadFile, ShellExec]),
        sync_callback(prompt),
    )
    .with_config(config)
    .with_policy(NoRootWipe)
    .with_hook(|event: &GateEvent| match event {
        GateEvent::PreApproved { tool_name, .. } => println!("  [pre-approved] {}", tool_name),
        GateEvent::SessionCacheHit { tool_name, .. } => {
            println!("  [approved earlier this session] {}", tool_name)
        }
        _ => {}
    });

    let calls = [
        ("read_file", serde_json::json!({"path": "README.md"})),
        ("shell_exec", serde_json::json!({"command": "ls -la"})),
        ("shell_exec", serde_json::json!({"command": "ls -la"})),
        ("shell_exec", serde_json::json!({"command": "rm -rf /"})),
        ("shell_exec", serde_json::json!({"command": "cat /etc/hosts"})),
    ];

    for (tool_name, args) in calls {
        println!("\n> {} {}", tool_name, args);
        match gate.call_json(tool_name, args, &CallContext::new()).await {
            Ok(output) => println!("{}", output.as_text()),
            Err(Error::Denied { decision, .. }) => println!(
                "denied: {}",
                decision.note.as_deref().unwrap_or("no reason given")
            ),
            Err(Error::Blocked { reason, .. }) => println!("blocked: {}", reason),
            Err(e) => return Err(e.into()),
        }
    }

    println!("\n{} approval(s) remembered for this session", gate.cache().len());
    Ok(())
}
