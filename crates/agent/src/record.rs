//! Records the loop keeps about a run, and the report it returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysreact_core::ProviderHealth;
use crate::usage::TokenUsage;

/// One dispatched tool invocation. Immutable once the dispatch completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub arguments: serde_json::Value,
    pub call_id: String,
    pub success: bool,
    /// Result text, or the error payload sent back to the model
    pub output: String,
    /// Human-readable error, set when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub result_length: usize,
    pub timestamp: DateTime<Utc>,
    pub duration_ms: u64,
}

/// One loop pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationRecord {
    pub iteration: u32,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub observations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IterationRecord {
    pub fn new(iteration: u32) -> Self {
        Self {
            iteration,
            timestamp: Utc::now(),
            reasoning: None,
            tool_calls: Vec::new(),
            observations: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningEntry {
    pub iteration: u32,
    pub reasoning: String,
    pub timestamp: DateTime<Utc>,
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunOutcome {
    /// The model gave a final answer
    Final,
    /// The iteration budget ran out; `result` is a synthesized conclusion
    Partial,
    /// The gateway failed on the last allowed pass
    Fatal,
}

/// Everything `run()` returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub success: bool,
    pub outcome: RunOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub iterations: u32,
    /// Wall-clock seconds, rounded to hundredths
    pub execution_time: f64,
    pub tools_used: Vec<String>,
    pub conversation_length: usize,
    pub token_usage: TokenUsage,
    pub reasoning_history: Vec<ReasoningEntry>,
    pub execution_log: Vec<IterationRecord>,
}

impl RunReport {
    /// The answer or the error, whichever this run produced.
    pub fn text(&self) -> &str {
        self.result
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsHealth {
    pub count: usize,
    pub names: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    pub provider: String,
    pub endpoint: Option<String>,
    pub model: String,
    pub max_iterations: u32,
    pub temperature: f32,
}

/// Operator-facing status snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub gateway: ProviderHealth,
    pub tools: ToolsHealth,
    pub configuration: AgentSettings,
}
