//! The ReAct agent loop for sysreact.
//!
//! The agent follows a **Reason → Act → Observe** cycle:
//!
//! 1. **Receive** a user request
//! 2. **Send** the conversation and tool schemas to the gateway
//! 3. **If tool calls**: dispatch them in order, append every result, loop
//! 4. **If a final answer**: return it
//!
//! When the iteration budget runs out the loop returns a partial conclusion
//! built from the tool results and reasoning it collected.

pub mod callback;
pub mod conclusion;
pub mod prompt;
pub mod react;
pub mod reasoning;
pub mod record;
pub mod usage;

#[cfg(test)]
mod test_helpers;

pub use callback::{NoopCallback, ReasoningCallback, TracingCallback};
pub use conclusion::PARTIAL_MARKER;
pub use prompt::default_system_prompt;
pub use react::ReactAgent;
pub use reasoning::ReasoningExtractor;
pub use record::{
    AgentSettings, HealthReport, IterationRecord, ReasoningEntry, RunOutcome, RunReport, ToolCallRecord,
    ToolsHealth,
};
pub use usage::TokenUsage;
