//! Terminal rendering of loop progress.

use serde_json::Value;
use sysreact_agent::{ReasoningCallback, ReasoningEntry};

const PREVIEW_CHARS: usize = 300;

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str(" ...");
    }
    out
}

/// Prints each loop transition to stdout. Silent when `quiet`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleCallback {
    quiet: bool,
}

impl ConsoleCallback {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ReasoningCallback for ConsoleCallback {
    fn on_iteration_start(&self, iteration: u32, max_iterations: u32) {
        if !self.quiet {
            println!("\n  ── Iteration {iteration}/{max_iterations} ──");
        }
    }

    fn on_reasoning(&self, entry: &ReasoningEntry) {
        if !self.quiet {
            for line in preview(&entry.reasoning).lines() {
                println!("  Thought     > {line}");
            }
        }
    }

    fn on_tool_call_start(&self, _iteration: u32, tool: &str, arguments: &Value) {
        if !self.quiet {
            println!("  Action      > {tool}({arguments})");
        }
    }

    fn on_tool_call_end(&self, _iteration: u32, tool: &str, result: &str, success: bool) {
        if self.quiet {
            return;
        }
        let status = if success { "ok" } else { "failed" };
        println!("  Result      > {tool} {status}, {} chars", result.chars().count());
        if !success {
            println!("                {}", preview(result));
        }
    }

    fn on_observation(&self, _iteration: u32, observation: &str) {
        if !self.quiet {
            println!("  Observation > {observation}");
        }
    }

    fn on_error(&self, iteration: u32, message: &str) {
        if !self.quiet {
            eprintln!("  [Error] iteration {iteration}: {message}");
        }
    }
}
