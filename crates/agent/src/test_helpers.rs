//! Shared test doubles for the agent loop.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use sysreact_core::error::{ProviderError, ToolError};
use sysreact_core::message::{Message, MessageToolCall};
use sysreact_core::provider::{FINISH_TOOL_CALLS, Provider, ProviderRequest, ProviderResponse, Usage};
use sysreact_core::tool::{ParamKind, ParameterSchema, Tool, ToolDescriptor};
use crate::callback::ReasoningCallback;
use crate::record::ReasoningEntry;

type Scripted = Result<ProviderResponse, ProviderError>;

/// A provider that plays back a script of responses and failures.
///
/// Panics if more calls are made than the script holds, unless built with
/// [`repeating`](Self::repeating), which replays the last entry forever.
pub struct SequentialMockProvider {
    script: Vec<Scripted>,
    repeat_last: bool,
    call_count: AtomicUsize,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl SequentialMockProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    pub fn scripted(script: Vec<Scripted>) -> Self {
        Self {
            script,
            repeat_last: false,
            call_count: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn repeating(response: Scripted) -> Self {
        Self {
            repeat_last: true,
            ..Self::scripted(vec![response])
        }
    }

    pub fn single_text(text: &str) -> Self {
        Self::new(vec![make_text_response(text)])
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for SequentialMockProvider {
    fn name(&self) -> &str {
        "sequential_mock"
    }

    fn endpoint(&self) -> Option<&str> {
        Some("http://mock.invalid")
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        let count = self.call_count.fetch_add(1, Ordering::SeqCst);

        let index = if self.repeat_last {
            count.min(self.script.len() - 1)
        } else {
            count
        };
        match self.script.get(index) {
            Some(entry) => entry.clone(),
            None => panic!(
                "SequentialMockProvider: no more responses (call #{count}, have {})",
                self.script.len()
            ),
        }
    }
}

/// A final-answer response with reported usage.
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        reasoning: None,
        finish_reason: Some("stop".into()),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A response requesting `tool_calls`, without usage data.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>, thought: &str) -> ProviderResponse {
    let mut message = Message::assistant(thought);
    message.tool_calls = tool_calls;
    ProviderResponse {
        message,
        reasoning: None,
        finish_reason: Some(FINISH_TOOL_CALLS.into()),
        usage: None,
        model: "mock-model".into(),
    }
}

pub fn make_tool_call(name: &str, args: Value) -> MessageToolCall {
    make_tool_call_with_id(&format!("call_{name}"), name, args)
}

pub fn make_tool_call_with_id(id: &str, name: &str, args: Value) -> MessageToolCall {
    MessageToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

/// Echoes its `text` argument.
pub struct EchoTool {
    descriptor: ToolDescriptor,
}

impl EchoTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new("echo", "Echo the input text")
            .unwrap()
            .with_parameters(ParameterSchema::new().required("text", ParamKind::String, "Text to echo"));
        Self { descriptor }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, arguments: Value) -> Result<String, ToolError> {
        Ok(arguments["text"].as_str().unwrap_or_default().to_string())
    }
}

/// Always fails with `ExecutionFailed`.
pub struct FailingTool {
    descriptor: ToolDescriptor,
}

impl FailingTool {
    pub fn new() -> Self {
        Self {
            descriptor: ToolDescriptor::new("failing", "Always fails").unwrap(),
        }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _arguments: Value) -> Result<String, ToolError> {
        Err(ToolError::ExecutionFailed {
            tool_name: "failing".into(),
            reason: "disk unreadable".into(),
        })
    }
}

/// Counts executions; shares the counter with the test.
pub struct CountingTool {
    descriptor: ToolDescriptor,
    calls: std::sync::Arc<AtomicUsize>,
}

impl CountingTool {
    pub fn new(name: &str, calls: std::sync::Arc<AtomicUsize>) -> Self {
        Self {
            descriptor: ToolDescriptor::new(name, "Counts how often it runs").unwrap(),
            calls,
        }
    }
}

#[async_trait]
impl Tool for CountingTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn execute(&self, _arguments: Value) -> Result<String, ToolError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("run {n}"))
    }
}

/// Records every notification as a line of text.
#[derive(Default)]
pub struct RecordingCallback {
    events: Mutex<Vec<String>>,
}

impl RecordingCallback {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl ReasoningCallback for RecordingCallback {
    fn on_iteration_start(&self, iteration: u32, max_iterations: u32) {
        self.push(format!("start {iteration}/{max_iterations}"));
    }

    fn on_reasoning(&self, entry: &ReasoningEntry) {
        self.push(format!("reasoning {}: {}", entry.iteration, entry.reasoning));
    }

    fn on_tool_call_start(&self, iteration: u32, tool: &str, _arguments: &Value) {
        self.push(format!("tool_start {iteration} {tool}"));
    }

    fn on_tool_call_end(&self, iteration: u32, tool: &str, _result: &str, success: bool) {
        self.push(format!("tool_end {iteration} {tool} {success}"));
    }

    fn on_observation(&self, iteration: u32, observation: &str) {
        self.push(format!("observation {iteration}: {observation}"));
    }

    fn on_iteration_end(&self, iteration: u32) {
        self.push(format!("end {iteration}"));
    }

    fn on_final_result(&self, _result: &str, iterations: u32) {
        self.push(format!("final {iterations}"));
    }

    fn on_error(&self, iteration: u32, message: &str) {
        self.push(format!("error {iteration}: {message}"));
    }
}
