//! Built-in diagnostic tools for sysreact.
//!
//! Tools give the agent eyes on the target host: system facts, processes,
//! systemd services, containers, and an escape hatch for arbitrary
//! commands. All of them run through a [`CommandRunner`] picked from the
//! `[target]` configuration.

pub mod batch;
pub mod container;
pub mod exec_command;
pub mod process_monitor;
pub mod runner;
pub mod service_status;
pub mod system_info;

#[cfg(test)]
mod testing;

use std::sync::Arc;
use sysreact_config::TargetConfig;
use sysreact_core::tool::{Tool, ToolRegistry, ToolSource};

pub use container::ContainerAnalyzer;
pub use exec_command::ExecCommandRemoteSystem;
pub use process_monitor::ProcessMonitorAnalyzer;
pub use runner::{
    CommandOutput, CommandRunner, DisconnectedRunner, LocalRunner, RunnerError, SshRunner,
    runner_from_config,
};
pub use service_status::ServiceStatusAnalyzer;
pub use system_info::SystemInfoAnalyzer;

/// Constructors for every built-in tool, sharing one runner.
pub fn default_sources(runner: Arc<dyn CommandRunner>, allowed_commands: Vec<String>) -> Vec<ToolSource> {
    let system = runner.clone();
    let process = runner.clone();
    let service = runner.clone();
    let container = runner.clone();
    vec![
        ToolSource::new(system_info::NAME, move || {
            Ok(Box::new(SystemInfoAnalyzer::new(system.clone())?) as Box<dyn Tool>)
        }),
        ToolSource::new(process_monitor::NAME, move || {
            Ok(Box::new(ProcessMonitorAnalyzer::new(process.clone())?) as Box<dyn Tool>)
        }),
        ToolSource::new(service_status::NAME, move || {
            Ok(Box::new(ServiceStatusAnalyzer::new(service.clone())?) as Box<dyn Tool>)
        }),
        ToolSource::new(container::NAME, move || {
            Ok(Box::new(ContainerAnalyzer::new(container.clone())?) as Box<dyn Tool>)
        }),
        ToolSource::new(exec_command::NAME, move || {
            Ok(Box::new(ExecCommandRemoteSystem::new(runner.clone(), allowed_commands.clone())?) as Box<dyn Tool>)
        }),
    ]
}

/// Create the default tool registry for `target`.
pub fn default_registry(target: &TargetConfig) -> ToolRegistry {
    let runner = runner_from_config(target);
    ToolRegistry::from_sources(default_sources(runner, target.allowed_commands.clone()))
}
