//! Command tool: run one arbitrary command on the target.
//!
//! Supports an optional allowlist on the base command of every pipeline
//! segment.

use async_trait::async_trait;
use std::sync::Arc;
use sysreact_core::error::ToolError;
use sysreact_core::tool::{ParamKind, ParameterSchema, Tool, ToolDescriptor};
use tracing::{debug, warn};
use crate::runner::CommandRunner;

pub const NAME: &str = "exec_command_remote_system";

/// Characters that reach past the segment check: expansion, substitution, redirection.
const FORBIDDEN_METACHARACTERS: [char; 4] = ['`', '$', '<', '>'];

/// Execute commands on the target with an optional allowlist.
pub struct ExecCommandRemoteSystem {
    descriptor: ToolDescriptor,
    runner: Arc<dyn CommandRunner>,
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,
}

impl ExecCommandRemoteSystem {
    pub fn new(runner: Arc<dyn CommandRunner>, allowed_commands: Vec<String>) -> Result<Self, ToolError> {
        let descriptor = ToolDescriptor::new(
            NAME,
            "Executes a shell command on the target system and returns its output. \
             Use it for checks the other analyzers do not cover.",
        )?
        .with_parameters(ParameterSchema::new().required(
            "command",
            ParamKind::String,
            "The command to execute on the target system",
        ));
        Ok(Self {
            descriptor,
            runner,
            allowed_commands,
        })
    }

    /// First word of every `|`, `;`, `&&` and `||` segment must be allowed.
    ///
    /// With an allowlist set, expansions (`` ` ``, `$(..)`, `${..}`, `$VAR`),
    /// process substitution and redirection are refused outright.
    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true;
        }

        if command.contains(FORBIDDEN_METACHARACTERS) {
            return false;
        }

        command
            .split(['|', ';', '&', '\n'])
            .map(str::trim)
            .filter(|segment| !segment.is_empty())
            .all(|segment| {
                let base_cmd = segment.split_whitespace().next().unwrap_or("");
                self.allowed_commands.iter().any(|a| a == base_cmd)
            })
    }
}

#[async_trait]
impl Tool for ExecCommandRemoteSystem {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<String, ToolError> {
        let command = arguments["command"]
            .as_str()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ToolError::InvalidArguments("'command' must be a non-empty string".into()))?;

        if !self.is_command_allowed(command) {
            return Err(ToolError::PermissionDenied {
                tool_name: NAME.into(),
                reason: format!("Command '{command}' not in allowlist"),
            });
        }

        debug!(command = %command, "Executing command on target");

        let output = self
            .runner
            .run(command)
            .await
            .map_err(|e| e.into_tool_error(NAME))?;

        let stdout = output.stdout.trim_end();
        let stderr = output.stderr.trim();
        let mut text = if stderr.is_empty() {
            stdout.to_string()
        } else {
            format!("{stdout}\n[stderr]: {stderr}")
        };

        if !output.success() {
            let code = output.exit_code.unwrap_or(-1);
            warn!(command = %command, exit_code = code, "Command failed");
            text = format!("[exit code: {code}]\n{text}");
        }

        if text.trim().is_empty() {
            text = "(no output)".into();
        }
        Ok(text.trim().to_string())
    }
}
