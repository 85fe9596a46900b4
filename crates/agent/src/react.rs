//! ReAct loop: Reason → Act → Observe until the model answers.
//!
//! Each pass sends the whole conversation and the registry's schemas to the
//! gateway, then either stops on a final answer or dispatches the requested
//! tools in order and feeds every result back as a `tool` message.
//!
//! # Terminal states
//!
//! - **Final**: the model answered (any finish reason but `tool_calls`).
//! - **Partial**: the iteration budget ran out; the result is a conclusion
//!   assembled from what the run collected.
//! - **Fatal**: the gateway failed on the last allowed pass. Earlier
//!   gateway failures are logged and the next pass retries.

use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use serde_json::Value;
use sysreact_config::AppConfig;
use sysreact_core::error::ToolError;
use sysreact_core::message::{Conversation, Message, MessageToolCall, Role};
use sysreact_core::provider::{Provider, ProviderHealth, ProviderRequest, TurnOutcome};
use sysreact_core::tool::ToolRegistry;
use tracing::{debug, info, warn};

use crate::callback::{ReasoningCallback, TracingCallback};
use crate::conclusion;
use crate::prompt::default_system_prompt;
use crate::reasoning::{ReasoningExtractor, select_reasoning};
use crate::record::{
    AgentSettings, HealthReport, IterationRecord, ReasoningEntry, RunOutcome, RunReport, ToolCallRecord,
    ToolsHealth,
};
use crate::usage::UsageAccumulator;

/// Result text used when the model ends the run with empty content.
pub const EMPTY_ANSWER: &str = "The task is complete, but the model returned no answer text.";

/// Observation recorded when a pass ends on a final answer.
pub const FINAL_OBSERVATION: &str = "Final answer reached";

const NO_INVOCATIONS: &str = "No tool invocations requested";

/// A single-task ReAct agent. Owns all of its run state; use one instance
/// per independent task, or call [`reset`](Self::reset) between tasks.
pub struct ReactAgent {
    provider: Arc<dyn Provider>,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    max_iterations: u32,
    tools: ToolRegistry,
    conversation: Conversation,
    callback: Arc<dyn ReasoningCallback>,
    extractor: ReasoningExtractor,
    execution_log: Vec<IterationRecord>,
    reasoning_history: Vec<ReasoningEntry>,
    usage: UsageAccumulator,
    current_iteration: u32,
}

impl ReactAgent {
    /// Create an agent with the default system prompt for `tools`.
    pub fn new(provider: Arc<dyn Provider>, model: impl Into<String>, tools: ToolRegistry) -> Self {
        let prompt = default_system_prompt(&tools.descriptors());
        Self {
            provider,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            max_iterations: 10,
            tools,
            conversation: Conversation::new(prompt),
            callback: Arc::new(TracingCallback),
            extractor: ReasoningExtractor::default(),
            execution_log: Vec::new(),
            reasoning_history: Vec::new(),
            usage: UsageAccumulator::new(),
            current_iteration: 0,
        }
    }

    /// Create an agent with every setting taken from `config`.
    pub fn from_config(provider: Arc<dyn Provider>, tools: ToolRegistry, config: &AppConfig) -> Self {
        let mut agent = Self::new(provider, &config.model, tools)
            .with_max_iterations(config.max_iterations)
            .with_temperature(config.temperature)
            .with_max_tokens(config.max_tokens)
            .with_reasoning_extractor(ReasoningExtractor::from_config(&config.reasoning));
        if let Some(prompt) = config.system_prompt_override.as_deref().filter(|p| !p.trim().is_empty()) {
            agent = agent.with_system_prompt(prompt);
        }
        agent
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max.max(1);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max: Option<u32>) -> Self {
        self.max_tokens = max;
        self
    }

    /// Replace the default system prompt. Starts a fresh conversation.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.conversation = Conversation::new(prompt);
        self
    }

    pub fn with_callback(mut self, callback: Arc<dyn ReasoningCallback>) -> Self {
        self.callback = callback;
        self
    }

    pub fn with_reasoning_extractor(mut self, extractor: ReasoningExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn execution_log(&self) -> &[IterationRecord] {
        &self.execution_log
    }

    pub fn reasoning_history(&self) -> &[ReasoningEntry] {
        &self.reasoning_history
    }

    /// Pass number of the current (or last) run, 0 before any run.
    pub fn current_iteration(&self) -> u32 {
        self.current_iteration
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Rebuild the tool registry from its sources.
    pub fn reload_tools(&mut self) {
        self.tools.reload();
        info!(tools = self.tools.len(), "Tools reloaded");
    }

    /// Clear all run state and re-seed the conversation from the system prompt.
    pub fn reset(&mut self) {
        self.conversation.reset();
        self.execution_log.clear();
        self.reasoning_history.clear();
        self.usage.reset();
        self.current_iteration = 0;
        debug!(conversation_id = %self.conversation.id, "Agent reset");
    }

    /// Run the loop for one user request.
    ///
    /// Never returns an error: a `Fatal` outcome is reported with
    /// `success = false` and a message in `error`.
    pub async fn run(&mut self, user_input: &str) -> RunReport {
        let started = Instant::now();
        self.execution_log.clear();
        self.reasoning_history.clear();
        self.usage.reset();
        self.current_iteration = 0;
        self.conversation.push(Message::user(user_input));

        info!(
            model = %self.model,
            max_iterations = self.max_iterations,
            conversation_id = %self.conversation.id,
            "ReAct loop starting"
        );

        let (outcome, text) = self.iterate().await;

        let (success, result, error) = match outcome {
            RunOutcome::Final | RunOutcome::Partial => {
                self.callback.on_final_result(&text, self.current_iteration);
                (true, Some(text), None)
            }
            RunOutcome::Fatal => {
                self.callback.on_error(self.current_iteration, &text);
                (false, None, Some(text))
            }
        };

        let elapsed = started.elapsed().as_secs_f64();
        let tools_used = self
            .execution_log
            .iter()
            .flat_map(|r| &r.tool_calls)
            .map(|c| c.tool.clone())
            .collect();

        info!(
            outcome = ?outcome,
            iterations = self.current_iteration,
            elapsed_secs = elapsed,
            "ReAct loop finished"
        );

        RunReport {
            success,
            outcome,
            result,
            error,
            iterations: self.current_iteration,
            execution_time: (elapsed * 100.0).round() / 100.0,
            tools_used,
            conversation_length: self.conversation.len(),
            token_usage: self.usage.totals(self.conversation.messages()),
            reasoning_history: self.reasoning_history.clone(),
            execution_log: self.execution_log.clone(),
        }
    }

    async fn iterate(&mut self) -> (RunOutcome, String) {
        let max = self.max_iterations;

        for iteration in 1..=max {
            self.current_iteration = iteration;
            self.callback.on_iteration_start(iteration, max);
            debug!(iteration, "ReAct iteration");
            let mut record = IterationRecord::new(iteration);

            let request = ProviderRequest {
                model: self.model.clone(),
                messages: self.conversation.messages().to_vec(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                tools: self.tools.schema_for_all(),
            };

            let response = match self.provider.complete(request).await {
                Ok(response) => response,
                Err(e) => {
                    let message = e.to_string();
                    warn!(iteration, error = %message, "Gateway call failed");
                    record.error = Some(message.clone());
                    self.callback.on_error(iteration, &message);
                    self.execution_log.push(record);
                    if iteration < max {
                        continue;
                    }
                    return (
                        RunOutcome::Fatal,
                        format!("ReAct run failed at iteration {iteration}: {message}"),
                    );
                }
            };
            self.usage.record(response.usage.as_ref());

            if let Some(reasoning) =
                select_reasoning(response.reasoning.as_deref(), &response.message.content, &self.extractor)
            {
                let entry = ReasoningEntry {
                    iteration,
                    reasoning: reasoning.clone(),
                    timestamp: Utc::now(),
                };
                self.callback.on_reasoning(&entry);
                self.reasoning_history.push(entry);
                record.reasoning = Some(reasoning);
            }

            let outcome = response.outcome();
            // The gateway's turn is always the assistant's, whatever role it reports
            let mut message = response.message;
            message.role = Role::Assistant;
            self.conversation.push(message);

            match outcome {
                TurnOutcome::FinalAnswer(content) => {
                    record.observations.push(FINAL_OBSERVATION.into());
                    self.callback.on_observation(iteration, FINAL_OBSERVATION);
                    self.callback.on_iteration_end(iteration);
                    self.execution_log.push(record);

                    let answer = if content.trim().is_empty() {
                        EMPTY_ANSWER.to_string()
                    } else {
                        content
                    };
                    return (RunOutcome::Final, answer);
                }
                TurnOutcome::ToolCalls(calls) => {
                    for call in &calls {
                        let call_record = self.dispatch(iteration, call).await;
                        record.tool_calls.push(call_record);
                    }

                    let observation = observe(&record.tool_calls);
                    self.callback.on_observation(iteration, &observation);
                    record.observations.push(observation);
                    self.callback.on_iteration_end(iteration);
                    self.execution_log.push(record);
                }
            }
        }

        warn!(max_iterations = max, "Maximum iterations reached");
        let text = conclusion::synthesize(
            max,
            &self.execution_log,
            &self.reasoning_history,
            self.conversation.messages(),
        );
        let headline = text.lines().next().unwrap_or_default();
        self.callback.on_observation(self.current_iteration, headline);
        (RunOutcome::Partial, text)
    }

    /// Run one requested invocation and append its `tool` reply.
    async fn dispatch(&mut self, iteration: u32, call: &MessageToolCall) -> ToolCallRecord {
        let parsed = parse_arguments(&call.arguments);
        let arguments = match &parsed {
            Ok(value) => value.clone(),
            Err(_) => Value::String(call.arguments.clone()),
        };

        self.callback.on_tool_call_start(iteration, &call.name, &arguments);
        let timestamp = Utc::now();
        let started = Instant::now();

        let result = match parsed {
            Ok(value) => self.tools.dispatch(&call.name, value).await,
            Err(e) => Err(e),
        };
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let (success, output, error) = match result {
            Ok(output) => (true, output, None),
            Err(e) => {
                warn!(iteration, tool = %call.name, error = %e, "Tool invocation failed");
                (false, format!("error: {}", e.to_payload(&arguments)), Some(e.to_string()))
            }
        };

        self.callback.on_tool_call_end(iteration, &call.name, &output, success);
        self.conversation.push(Message::tool_result(&call.id, &output));

        ToolCallRecord {
            tool: call.name.clone(),
            arguments,
            call_id: call.id.clone(),
            success,
            result_length: output.chars().count(),
            output,
            error,
            timestamp,
            duration_ms,
        }
    }

    /// Gateway reachability, registry contents and current settings.
    pub async fn health_check(&self) -> HealthReport {
        let gateway = match self.provider.health_check().await {
            Ok(health) => health,
            Err(e) => ProviderHealth {
                reachable: false,
                response_time_ms: None,
                endpoint: self.provider.endpoint().map(str::to_string),
                model: Some(self.model.clone()),
                detail: e.to_string(),
            },
        };

        HealthReport {
            gateway,
            tools: ToolsHealth {
                count: self.tools.len(),
                names: self.tools.list_tools(),
            },
            configuration: AgentSettings {
                provider: self.provider.name().to_string(),
                endpoint: self.provider.endpoint().map(str::to_string),
                model: self.model.clone(),
                max_iterations: self.max_iterations,
                temperature: self.temperature,
            },
        }
    }
}

/// Empty arguments mean "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(raw).map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}

fn observe(calls: &[ToolCallRecord]) -> String {
    if calls.is_empty() {
        return NO_INVOCATIONS.to_string();
    }
    calls
        .iter()
        .map(|c| match &c.error {
            None => format!("{} succeeded", c.tool),
            Some(error) => format!("{} failed: {error}", c.tool),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
