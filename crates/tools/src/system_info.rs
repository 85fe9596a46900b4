//! System info tool: OS, uptime, memory, disk and CPU facts.

use async_trait::async_trait;
use std::sync::Arc;
use sysreact_core::error::ToolError;
use sysreact_core::tool::{Tool, ToolDescriptor};
use crate::batch::{Section, run_sections};
use crate::runner::CommandRunner;

pub const NAME: &str = "system_info_analyzer";

const SECTIONS: [Section; 5] = [
    Section::new("System", "uname -a"),
    Section::new("Uptime", "uptime"),
    Section::new("Memory usage", "free -h"),
    Section::new("Disk usage", "df -h"),
    Section::new("CPU", "lscpu"),
];

pub struct SystemInfoAnalyzer {
    descriptor: ToolDescriptor,
    runner: Arc<dyn CommandRunner>,
}

impl SystemInfoAnalyzer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Result<Self, ToolError> {
        let descriptor = ToolDescriptor::new(
            NAME,
            "Collects basic facts about the target system: kernel and OS, uptime and load, \
             memory, disk usage and CPU details. Takes no arguments.",
        )?;
        Ok(Self { descriptor, runner })
    }
}

#[async_trait]
impl Tool for SystemInfoAnalyzer {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        run_sections(self.runner.as_ref(), NAME, "System information", &SECTIONS).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedRunner;

    #[tokio::test]
    async fn runs_all_sections_in_one_call() {
        let runner = Arc::new(ScriptedRunner::stdout(
            "SECTION_START:System\nLinux web01 6.1.0\nSECTION_END:0\n\
             SECTION_START:Uptime\n up 12 days, load average: 0.10\nSECTION_END:0\n",
        ));
        let tool = SystemInfoAnalyzer::new(runner.clone()).unwrap();
        let report = tool.execute(serde_json::json!({})).await.unwrap();

        assert_eq!(runner.commands().len(), 1);
        let script = &runner.commands()[0];
        for cmd in ["uname -a", "uptime", "free -h", "df -h", "lscpu"] {
            assert!(script.contains(cmd), "missing {cmd}");
        }
        assert!(report.contains("System information (scripted)"));
        assert!(report.contains("Linux web01 6.1.0"));
        assert!(report.contains("[CPU]\n----------------------------------------\ncommand failed or produced no output"));
    }

    #[test]
    fn takes_no_required_arguments() {
        let tool = SystemInfoAnalyzer::new(Arc::new(ScriptedRunner::stdout(""))).unwrap();
        assert!(tool.validate(&serde_json::json!({})).is_empty());
        assert_eq!(tool.name(), NAME);
    }
}
