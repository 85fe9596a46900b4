//! Provider trait: the abstraction over the LLM gateway.
//!
//! A Provider knows how to send a conversation plus the available tool
//! schemas to a chat-completion endpoint and get one response back.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, Ollama `/v1`).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::ProviderError;
use crate::message::{Message, MessageToolCall};

/// Finish reason that signals the model wants tools invoked.
pub const FINISH_TOOL_CALLS: &str = "tool_calls";

/// Configuration for a provider request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    /// The model to use (e.g., "gpt-oss:20b", "gpt-4o")
    pub model: String,

    /// The conversation messages
    pub messages: Vec<Message>,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Available tools the model can call
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

fn default_temperature() -> f32 {
    0.7
}

/// A tool definition sent to the LLM so it knows what tools it can call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// The generated assistant message
    pub message: Message,

    /// Separate reasoning text, when the model exposes one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,

    /// Why generation stopped ("stop", "tool_calls", "length", ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,

    /// Token usage statistics
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// What the loop should do with a response.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    /// The model answered; the run is complete.
    FinalAnswer(String),
    /// The model requested these invocations (possibly none).
    ToolCalls(Vec<MessageToolCall>),
}

impl ProviderResponse {
    /// Classify this response.
    ///
    /// Only a `tool_calls` finish reason requests tools. Any other reason,
    /// including a missing one, is a final answer even if tool calls are
    /// present in the message.
    pub fn outcome(&self) -> TurnOutcome {
        match self.finish_reason.as_deref() {
            Some(FINISH_TOOL_CALLS) => TurnOutcome::ToolCalls(self.message.tool_calls.clone()),
            _ => TurnOutcome::FinalAnswer(self.message.content.clone()),
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Result of probing the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderHealth {
    pub reachable: bool,
    pub response_time_ms: Option<u64>,
    pub endpoint: Option<String>,
    pub model: Option<String>,
    /// Which probe answered, or why none did
    pub detail: String,
}

/// The core Provider trait.
///
/// The agent loop calls `complete()` without knowing which backend is
/// being used.
#[async_trait]
pub trait Provider: Send + Sync {
    /// A human-readable name for this provider (e.g., "ollama", "openai").
    fn name(&self) -> &str;

    /// Base URL requests are sent to, if any.
    fn endpoint(&self) -> Option<&str> {
        None
    }

    /// Send a request and get a complete response.
    async fn complete(&self, request: ProviderRequest) -> std::result::Result<ProviderResponse, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check: can we reach the provider?
    async fn health_check(&self) -> std::result::Result<ProviderHealth, ProviderError> {
        Ok(ProviderHealth {
            reachable: true,
            response_time_ms: None,
            endpoint: self.endpoint().map(str::to_string),
            model: None,
            detail: "no probe available".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(finish: Option<&str>, content: &str, calls: Vec<MessageToolCall>) -> ProviderResponse {
        let mut message = Message::assistant(content);
        message.tool_calls = calls;
        ProviderResponse {
            message,
            reasoning: None,
            finish_reason: finish.map(str::to_string),
            usage: None,
            model: "test".into(),
        }
    }

    fn call(name: &str) -> MessageToolCall {
        MessageToolCall {
            id: "call_1".into(),
            name: name.into(),
            arguments: "{}".into(),
        }
    }

    #[test]
    fn tool_calls_finish_reason_yields_invocations() {
        let resp = response(Some("tool_calls"), "", vec![call("system_info_analyzer")]);
        match resp.outcome() {
            TurnOutcome::ToolCalls(calls) => assert_eq!(calls[0].name, "system_info_analyzer"),
            other => panic!("expected tool calls, got {other:?}"),
        }
    }

    #[test]
    fn stop_with_tool_calls_is_still_final() {
        let resp = response(Some("stop"), "Disk is fine", vec![call("system_info_analyzer")]);
        assert_eq!(resp.outcome(), TurnOutcome::FinalAnswer("Disk is fine".into()));
    }

    #[test]
    fn missing_finish_reason_is_final() {
        let resp = response(None, "done", vec![]);
        assert_eq!(resp.outcome(), TurnOutcome::FinalAnswer("done".into()));
    }

    #[test]
    fn empty_tool_call_list_is_not_final() {
        let resp = response(Some("tool_calls"), "", vec![]);
        assert_eq!(resp.outcome(), TurnOutcome::ToolCalls(vec![]));
    }

    #[test]
    fn tool_definition_serialization() {
        let tool = ToolDefinition {
            name: "exec_command_remote_system".into(),
            description: "Execute a command on the target".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": {
                    "command": { "type": "string", "description": "The command to run" }
                },
                "required": ["command"]
            }),
        };
        let json = serde_json::to_string(&tool).unwrap();
        assert!(json.contains("exec_command_remote_system"));
        assert!(json.contains("command"));
    }
}
