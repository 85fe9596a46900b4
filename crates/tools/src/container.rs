//! Container tool: Docker and Kubernetes state, when those CLIs exist.
//!
//! Availability is probed first so the report only contains sections the
//! host can actually answer.

use async_trait::async_trait;
use std::sync::Arc;
use sysreact_core::error::ToolError;
use sysreact_core::tool::{Tool, ToolDescriptor};
use tracing::debug;
use crate::batch::{Section, render_report, run_batch};
use crate::runner::CommandRunner;

pub const NAME: &str = "container_analyzer";

const DOCKER_PROBE: Section = Section::new("Docker available", "which docker");
const KUBECTL_PROBE: Section = Section::new("Kubernetes available", "which kubectl");

const DOCKER_SECTIONS: [Section; 4] = [
    Section::new("Docker containers", "docker ps -a"),
    Section::new("Docker images", "docker images"),
    Section::new("Docker disk usage", "docker system df"),
    Section::new("Running container resources", "docker stats --no-stream"),
];

const KUBECTL_SECTIONS: [Section; 4] = [
    Section::new("Kubernetes pods", "kubectl get pods --all-namespaces"),
    Section::new("Kubernetes nodes", "kubectl get nodes"),
    Section::new("Kubernetes services", "kubectl get services --all-namespaces"),
    Section::new("Kubernetes cluster info", "kubectl cluster-info"),
];

pub struct ContainerAnalyzer {
    descriptor: ToolDescriptor,
    runner: Arc<dyn CommandRunner>,
}

impl ContainerAnalyzer {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Result<Self, ToolError> {
        let descriptor = ToolDescriptor::new(
            NAME,
            "Analyzes the container environment of the target system: Docker containers, \
             images and resource usage, plus Kubernetes pods, nodes and services when \
             kubectl is installed. Takes no arguments.",
        )?;
        Ok(Self { descriptor, runner })
    }
}

#[async_trait]
impl Tool for ContainerAnalyzer {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _arguments: serde_json::Value) -> Result<String, ToolError> {
        let runner = self.runner.as_ref();
        let probes = run_batch(runner, NAME, &[DOCKER_PROBE, KUBECTL_PROBE]).await?;
        let available = |probe: &Section| probes.get(probe.title).is_some_and(|s| s.exit_code == 0);
        let docker = available(&DOCKER_PROBE);
        let kubectl = available(&KUBECTL_PROBE);
        debug!(docker, kubectl, "Container tooling probed");

        let mut sections = Vec::new();
        let mut unavailable = Vec::new();
        if docker {
            sections.extend_from_slice(&DOCKER_SECTIONS);
        } else {
            unavailable.push("docker");
        }
        if kubectl {
            sections.extend_from_slice(&KUBECTL_SECTIONS);
        } else {
            unavailable.push("kubectl");
        }

        let heading = format!("Container environment ({})", runner.target());
        if sections.is_empty() {
            return Ok(format!(
                "{heading}\nNeither docker nor kubectl is installed on the target; no container runtime to analyze."
            ));
        }

        let parsed = run_batch(runner, NAME, &sections).await?;
        let mut report = render_report(&heading, &sections, &parsed);
        if !unavailable.is_empty() {
            report.push_str(&format!("\n\nNot available on target: {}", unavailable.join(", ")));
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedRunner, ok};

    #[tokio::test]
    async fn only_available_runtimes_are_queried() {
        let runner = Arc::new(ScriptedRunner::new(|script| {
            if script.contains("which docker") {
                Ok(ok(
                    "SECTION_START:Docker available\n/usr/bin/docker\nSECTION_END:0\n\
                     SECTION_START:Kubernetes available\nSECTION_END:1\n",
                ))
            } else {
                Ok(ok("SECTION_START:Docker containers\nCONTAINER ID   IMAGE\nabc123   redis:7\nSECTION_END:0\n"))
            }
        }));
        let tool = ContainerAnalyzer::new(runner.clone()).unwrap();
        let report = tool.execute(serde_json::json!({})).await.unwrap();

        let commands = runner.commands();
        assert_eq!(commands.len(), 2);
        assert!(commands[1].contains("docker ps -a"));
        assert!(!commands[1].contains("kubectl"));
        assert!(report.contains("abc123   redis:7"));
        assert!(report.contains("Not available on target: kubectl"));
    }

    #[tokio::test]
    async fn no_runtime_skips_second_call() {
        let runner = Arc::new(ScriptedRunner::stdout(
            "SECTION_START:Docker available\nSECTION_END:1\nSECTION_START:Kubernetes available\nSECTION_END:1\n",
        ));
        let tool = ContainerAnalyzer::new(runner.clone()).unwrap();
        let report = tool.execute(serde_json::json!({})).await.unwrap();
        assert_eq!(runner.commands().len(), 1);
        assert!(report.contains("Neither docker nor kubectl"));
    }
}
