//! Command runners: how the diagnostic tools reach the target host.
//!
//! Every tool funnels its commands through a [`CommandRunner`], so the same
//! tool works over ssh, against the local machine, or against a scripted
//! runner in tests.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use sysreact_config::{TargetConfig, TargetMode};
use sysreact_core::error::ToolError;
use tokio::process::Command;
use tracing::{debug, warn};

/// Captured result of one command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Transport-level failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum RunnerError {
    #[error("no target configured: {0}")]
    NotConfigured(String),

    #[error("could not connect to {target}: {reason}")]
    Connection { target: String, reason: String },

    #[error("failed to start command: {0}")]
    Spawn(String),

    #[error("command timed out after {0}s")]
    Timeout(u64),
}

impl RunnerError {
    /// Attribute this failure to `tool_name`.
    pub fn into_tool_error(self, tool_name: &str) -> ToolError {
        match self {
            RunnerError::Timeout(secs) => ToolError::Timeout {
                tool_name: tool_name.to_string(),
                timeout_secs: secs,
            },
            other => ToolError::ExecutionFailed {
                tool_name: tool_name.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Human-readable description of where commands run.
    fn target(&self) -> String;

    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError>;
}

async fn collect(mut command: Command, timeout: Duration) -> Result<CommandOutput, RunnerError> {
    command.kill_on_drop(true);
    let output = tokio::time::timeout(timeout, command.output())
        .await
        .map_err(|_| RunnerError::Timeout(timeout.as_secs()))?
        .map_err(|e| RunnerError::Spawn(e.to_string()))?;

    Ok(CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        exit_code: output.status.code(),
    })
}

/// Runs commands on a remote host through the system `ssh` client.
///
/// Authentication is key-based only: `BatchMode=yes` makes ssh fail instead
/// of prompting.
#[derive(Debug, Clone)]
pub struct SshRunner {
    host: String,
    port: u16,
    username: Option<String>,
    identity_file: Option<PathBuf>,
    connect_timeout: Duration,
    command_timeout: Duration,
}

impl SshRunner {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            identity_file: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(60),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    pub fn with_identity_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.identity_file = Some(path.into());
        self
    }

    pub fn with_timeouts(mut self, connect: Duration, command: Duration) -> Self {
        self.connect_timeout = connect;
        self.command_timeout = command;
        self
    }

    fn destination(&self) -> String {
        match &self.username {
            Some(user) => format!("{user}@{}", self.host),
            None => self.host.clone(),
        }
    }

    fn ssh_args(&self, command: &str) -> Vec<String> {
        let mut args = vec![
            "-o".to_string(),
            "BatchMode=yes".to_string(),
            "-o".to_string(),
            format!("ConnectTimeout={}", self.connect_timeout.as_secs().max(1)),
            "-o".to_string(),
            "StrictHostKeyChecking=accept-new".to_string(),
            "-p".to_string(),
            self.port.to_string(),
        ];
        if let Some(identity) = &self.identity_file {
            args.push("-i".to_string());
            args.push(identity.display().to_string());
        }
        args.push(self.destination());
        args.push("--".to_string());
        args.push(command.to_string());
        args
    }
}

#[async_trait]
impl CommandRunner for SshRunner {
    fn target(&self) -> String {
        format!("{}:{}", self.destination(), self.port)
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError> {
        debug!(target = %self.target(), command = %command, "Running remote command");
        let mut ssh = Command::new("ssh");
        ssh.args(self.ssh_args(command));

        let output = collect(ssh, self.command_timeout).await?;

        // ssh reserves 255 for its own failures
        if output.exit_code == Some(255) && output.stdout.trim().is_empty() {
            warn!(target = %self.target(), stderr = %output.stderr.trim(), "ssh connection failed");
            return Err(RunnerError::Connection {
                target: self.target(),
                reason: output.stderr.trim().to_string(),
            });
        }
        Ok(output)
    }
}

/// Runs commands on this machine with `sh -c`.
#[derive(Debug, Clone)]
pub struct LocalRunner {
    command_timeout: Duration,
}

impl LocalRunner {
    pub fn new(command_timeout: Duration) -> Self {
        Self { command_timeout }
    }
}

#[async_trait]
impl CommandRunner for LocalRunner {
    fn target(&self) -> String {
        "localhost".into()
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError> {
        debug!(command = %command, "Running local command");
        let mut sh = Command::new("sh");
        sh.args(["-c", command]);
        collect(sh, self.command_timeout).await
    }
}

/// Stand-in used when no target host is configured.
#[derive(Debug, Clone, Default)]
pub struct DisconnectedRunner;

#[async_trait]
impl CommandRunner for DisconnectedRunner {
    fn target(&self) -> String {
        "(not configured)".into()
    }

    async fn run(&self, _command: &str) -> Result<CommandOutput, RunnerError> {
        Err(RunnerError::NotConfigured(
            "set [target] host in ~/.sysreact/config.toml, or mode = \"local\"".into(),
        ))
    }
}

/// Pick the runner described by `target`.
pub fn runner_from_config(target: &TargetConfig) -> Arc<dyn CommandRunner> {
    let command_timeout = Duration::from_secs(target.command_timeout_secs);
    match (target.mode, target.host.as_deref()) {
        (TargetMode::Local, _) => Arc::new(LocalRunner::new(command_timeout)),
        (TargetMode::Ssh, Some(host)) if !host.trim().is_empty() => {
            let mut runner = SshRunner::new(host.trim())
                .with_port(target.port)
                .with_timeouts(Duration::from_secs(target.connect_timeout_secs), command_timeout);
            if let Some(user) = &target.username {
                runner = runner.with_username(user);
            }
            if let Some(identity) = &target.identity_file {
                runner = runner.with_identity_file(identity);
            }
            Arc::new(runner)
        }
        (TargetMode::Ssh, _) => Arc::new(DisconnectedRunner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssh_args_use_batch_mode_and_key() {
        let runner = SshRunner::new("10.0.0.5")
            .with_port(2222)
            .with_username("ops")
            .with_identity_file("/keys/id_ed25519");
        let args = runner.ssh_args("uptime");
        assert!(args.contains(&"BatchMode=yes".to_string()));
        assert!(args.contains(&"ConnectTimeout=10".to_string()));
        let port = args.iter().position(|a| a == "-p").unwrap();
        assert_eq!(args[port + 1], "2222");
        let key = args.iter().position(|a| a == "-i").unwrap();
        assert_eq!(args[key + 1], "/keys/id_ed25519");
        assert_eq!(&args[args.len() - 3..], ["ops@10.0.0.5", "--", "uptime"]);
        assert_eq!(runner.target(), "ops@10.0.0.5:2222");
    }

    #[test]
    fn timeout_maps_to_tool_timeout() {
        let err = RunnerError::Timeout(60).into_tool_error("system_info_analyzer");
        assert!(matches!(err, ToolError::Timeout { timeout_secs: 60, .. }));

        let err = RunnerError::Connection {
            target: "h:22".into(),
            reason: "refused".into(),
        }
        .into_tool_error("system_info_analyzer");
        assert!(err.to_string().contains("refused"));
    }

    #[test]
    fn config_selects_runner() {
        let unconfigured = TargetConfig::default();
        assert_eq!(runner_from_config(&unconfigured).target(), "(not configured)");

        let local = TargetConfig {
            mode: TargetMode::Local,
            ..TargetConfig::default()
        };
        assert_eq!(runner_from_config(&local).target(), "localhost");

        let remote = TargetConfig {
            host: Some("db01".into()),
            username: Some("root".into()),
            ..TargetConfig::default()
        };
        assert_eq!(runner_from_config(&remote).target(), "root@db01:22");
    }

    #[tokio::test]
    async fn disconnected_runner_explains_itself() {
        let err = DisconnectedRunner.run("uptime").await.unwrap_err();
        assert!(err.to_string().contains("[target] host"));
    }

    #[tokio::test]
    async fn local_runner_captures_output_and_exit_code() {
        let runner = LocalRunner::new(Duration::from_secs(5));
        let out = runner.run("echo hello; echo oops >&2; exit 3").await.unwrap();
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
        assert_eq!(out.exit_code, Some(3));
        assert!(!out.success());
    }

    #[tokio::test]
    async fn local_runner_enforces_timeout() {
        let runner = LocalRunner::new(Duration::from_millis(200));
        let err = runner.run("sleep 5").await.unwrap_err();
        assert!(matches!(err, RunnerError::Timeout(_)));
    }
}
