//! The observer port the loop notifies at each transition.
//!
//! Methods take `&self` and return nothing: an observer can render or log
//! but has no way to change what the loop does next. Calls are made inline
//! on the loop's task, so implementations must not block.

use serde_json::Value;
use tracing::{debug, info, warn};
use crate::record::ReasoningEntry;

#[allow(unused_variables)]
pub trait ReasoningCallback: Send + Sync {
    fn on_iteration_start(&self, iteration: u32, max_iterations: u32) {}

    fn on_reasoning(&self, entry: &ReasoningEntry) {}

    fn on_tool_call_start(&self, iteration: u32, tool: &str, arguments: &Value) {}

    fn on_tool_call_end(&self, iteration: u32, tool: &str, result: &str, success: bool) {}

    fn on_observation(&self, iteration: u32, observation: &str) {}

    fn on_iteration_end(&self, iteration: u32) {}

    fn on_final_result(&self, result: &str, iterations: u32) {}

    fn on_error(&self, iteration: u32, message: &str) {}
}

/// Ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCallback;

impl ReasoningCallback for NoopCallback {}

/// Renders loop progress as tracing events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingCallback;

impl ReasoningCallback for TracingCallback {
    fn on_iteration_start(&self, iteration: u32, max_iterations: u32) {
        info!(iteration, max_iterations, "Iteration started");
    }

    fn on_reasoning(&self, entry: &ReasoningEntry) {
        debug!(iteration = entry.iteration, reasoning = %entry.reasoning, "Reasoning");
    }

    fn on_tool_call_start(&self, iteration: u32, tool: &str, arguments: &Value) {
        info!(iteration, tool, %arguments, "Calling tool");
    }

    fn on_tool_call_end(&self, iteration: u32, tool: &str, result: &str, success: bool) {
        if success {
            info!(iteration, tool, bytes = result.len(), "Tool succeeded");
        } else {
            warn!(iteration, tool, error = %result, "Tool failed");
        }
    }

    fn on_observation(&self, iteration: u32, observation: &str) {
        info!(iteration, %observation, "Observation");
    }

    fn on_iteration_end(&self, iteration: u32) {
        debug!(iteration, "Iteration finished");
    }

    fn on_final_result(&self, result: &str, iterations: u32) {
        info!(iterations, chars = result.len(), "Run finished");
    }

    fn on_error(&self, iteration: u32, message: &str) {
        warn!(iteration, error = %message, "Iteration error");
    }
}
