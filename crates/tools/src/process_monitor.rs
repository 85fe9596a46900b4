//! Process monitor tool: process listings, top consumers and the process tree.

use async_trait::async_trait;
use std::sync::Arc;
use sysreact_core::error::ToolError;
use sysreact_core::tool::{Tool, ToolDescriptor};
use crate::batch::{Section, run_sections};
use crate::runner::CommandRunner;

pub const NAME: &str = "process_monitor_analyzer";

const SECTIONS: [Section; 6] = [
    Section::new("Process list", "ps aux | head -20"),
    Section::new("Top 10 by CPU", "ps -eo pid,ppid,cmd,%mem,%cpu --sort=-%cpu | head -11"),
    Section::new("Top 10 by memory", "ps -eo pid,ppid,cmd,%mem,%cpu --sort=-%mem | head -11"),
    Section::new("Resource snapshot", "top -bn1 | head -15"),
    Section::new("Process tree", "pstree -p | head -20"),
    Section::new("Process count", "ps aux | wc -l"),
];

pub struct ProcessMonitorAnalyzer {
    descriptor: ToolDescriptor,
    runner: Arc<dyn CommandRunner>,
}

impl ProcessMonitorAnalyzer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Result<Self, ToolError> {
        let descriptor = ToolDescriptor::new(
            NAME,
            "Monitors processes on the target system: full listing, top CPU and memory \
             consumers, a top snapshot, the process tree and the process count. Takes no arguments.",
        )?;
        Ok(Self { descriptor, runner })
    }
}

#[async_trait]
impl Tool for ProcessMonitorAnalyzer {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        run_sections(self.runner.as_ref(), NAME, "Process monitor", &SECTIONS).await
    }
}
