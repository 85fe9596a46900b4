//! Service status tool: systemd units, failures and boot-time services.

use async_trait::async_trait;
use std::sync::Arc;
use sysreact_core::error::ToolError;
use sysreact_core::tool::{Tool, ToolDescriptor};
use crate::batch::{Section, run_sections};
use crate::runner::CommandRunner;

pub const NAME: &str = "service_status_analyzer";

const SECTIONS: [Section; 6] = [
    Section::new("Active services", "systemctl list-units --type=service --state=active --no-pager"),
    Section::new("Failed services", "systemctl list-units --type=service --state=failed --no-pager"),
    Section::new("Service summary", "systemctl list-units --type=service --no-pager | head -20"),
    Section::new("System state", "systemctl status --no-pager"),
    Section::new(
        "Enabled at boot",
        "systemctl list-unit-files --type=service --state=enabled --no-pager | head -15",
    ),
    Section::new(
        "Service count",
        "systemctl list-units --type=service --all --no-pager | grep -c 'service'",
    ),
];

pub struct ServiceStatusAnalyzer {
    descriptor: ToolDescriptor,
    runner: Arc<dyn CommandRunner>,
}

impl ServiceStatusAnalyzer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Result<Self, ToolError> {
        let descriptor = ToolDescriptor::new(
            NAME,
            "Analyzes systemd services on the target system: active and failed units, \
             overall system state and services enabled at boot. Takes no arguments.",
        )?;
        Ok(Self { descriptor, runner })
    }
}

#[async_trait]
impl Tool for ServiceStatusAnalyzer {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        run_sections(self.runner.as_ref(), NAME, "Service status", &SECTIONS).await
    }
}
