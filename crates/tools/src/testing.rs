//! Scripted runner shared by the tool tests.

use async_trait::async_trait;
use std::sync::Mutex;
use crate::runner::{CommandOutput, CommandRunner, RunnerError};

type Responder = Box<dyn Fn(&str) -> Result<CommandOutput, RunnerError> + Send + Sync>;

/// Answers every command through a closure and records what it was asked.
pub struct ScriptedRunner {
    respond: Responder,
    pub commands: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&str) -> Result<CommandOutput, RunnerError> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            commands: Mutex::new(Vec::new()),
        }
    }

    /// Every command gets `stdout` with exit code 0.
    pub fn stdout(stdout: &'static str) -> Self {
        Self::new(move |_| Ok(ok(stdout)))
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

pub fn ok(stdout: &str) -> CommandOutput {
    CommandOutput {
        stdout: stdout.to_string(),
        stderr: String::new(),
        exit_code: Some(0),
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    fn target(&self) -> String {
        "scripted".into()
    }

    async fn run(&self, command: &str) -> Result<CommandOutput, RunnerError> {
        self.commands.lock().unwrap().push(command.to_string());
        (self.respond)(command)
    }
}
