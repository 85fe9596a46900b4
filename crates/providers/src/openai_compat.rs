//! OpenAI-compatible provider implementation.
//!
//! Works with: OpenAI, Ollama (`/v1`), vLLM, llama.cpp and any
//! OpenAI-compatible endpoint.
//!
//! Supports:
//! - Chat completions with tool use / function calling
//! - Separate reasoning traces (`reasoning` / `reasoning_content`)
//! - Model listing and health probes

use async_trait::async_trait;
use std::time::{Duration, Instant};
use sysreact_core::error::ProviderError;
use sysreact_core::message::{Message, MessageToolCall, Role};
use sysreact_core::provider::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// An OpenAI-compatible LLM provider.
///
/// This handles the vast majority of LLM servers since most expose
/// an OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiCompatProvider {
    name: String,
    base_url: String,
    api_key: String,
    /// Ollama server root used for `/api/*` probes
    probe_root: Option<String>,
    model: Option<String>,
    client: reqwest::Client,
}

impl OpenAiCompatProvider {
    /// Create a new OpenAI-compatible provider.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            probe_root: None,
            model: None,
            client,
        })
    }

    /// Create an OpenAI provider (convenience constructor).
    pub fn openai(api_key: impl Into<String>, timeout: Duration) -> Result<Self, ProviderError> {
        Self::new("openai", "https://api.openai.com/v1", api_key, timeout)
    }

    /// Create an Ollama provider from the server root (e.g. `http://localhost:11434`).
    pub fn ollama(root: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let root = root.trim_end_matches('/');
        let root = root.strip_suffix("/v1").unwrap_or(root).to_string();
        // Ollama doesn't need a real key
        let provider = Self::new("ollama", format!("{root}/v1"), "ollama", timeout)?;
        Ok(provider.with_probe_root(root))
    }

    pub fn with_probe_root(mut self, root: impl Into<String>) -> Self {
        self.probe_root = Some(root.into().trim_end_matches('/').to_string());
        self
    }

    /// Model reported by health checks.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            builder
        } else {
            builder.header("Authorization", format!("Bearer {}", self.api_key))
        }
    }

    /// Convert our Message types to OpenAI API format.
    fn to_api_messages(messages: &[Message]) -> Vec<ApiMessage> {
        messages
            .iter()
            .map(|m| ApiMessage {
                role: match m.role {
                    Role::User => "user".into(),
                    Role::Assistant => "assistant".into(),
                    Role::System => "system".into(),
                    Role::Tool => "tool".into(),
                },
                content: Some(m.content.clone()),
                tool_calls: if m.tool_calls.is_empty() {
                    None
                } else {
                    Some(
                        m.tool_calls
                            .iter()
                            .map(|tc| ApiToolCall {
                                id: tc.id.clone(),
                                r#type: "function".into(),
                                function: ApiFunction {
                                    name: tc.name.clone(),
                                    arguments: serde_json::Value::String(tc.arguments.clone()),
                                },
                            })
                            .collect(),
                    )
                },
                tool_call_id: m.tool_call_id.clone(),
            })
            .collect()
    }

    /// Convert tool definitions to OpenAI API format.
    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<ApiToolDefinition> {
        tools
            .iter()
            .map(|t| ApiToolDefinition {
                r#type: "function".into(),
                function: ApiToolFunction {
                    name: t.name.clone(),
                    description: t.description.clone(),
                    parameters: t.parameters.clone(),
                },
            })
            .collect()
    }

    /// Reasoning models only accept the default temperature.
    fn effective_temperature(model: &str, requested: f32) -> f32 {
        if model.contains("gpt-5") { 1.0 } else { requested }
    }

    fn request_body(request: &ProviderRequest) -> serde_json::Value {
        let mut body = serde_json::json!({
            "model": request.model,
            "messages": Self::to_api_messages(&request.messages),
            "temperature": Self::effective_temperature(&request.model, request.temperature),
            "stream": false,
        });

        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = serde_json::json!(max_tokens);
        }

        if !request.tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(&request.tools));
        }

        body
    }

    fn parse_response(
        api_response: ApiResponse,
        requested_model: &str,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".into()))?;

        let tool_calls: Vec<MessageToolCall> = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| MessageToolCall {
                id: if tc.id.is_empty() {
                    format!("call_{}", uuid::Uuid::new_v4().simple())
                } else {
                    tc.id
                },
                name: tc.function.name,
                // Some servers send arguments as an object instead of a string
                arguments: match tc.function.arguments {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Null => "{}".into(),
                    other => other.to_string(),
                },
            })
            .collect();

        let mut message = Message::assistant(choice.message.content.unwrap_or_default());
        message.tool_calls = tool_calls;

        let reasoning = choice
            .message
            .reasoning
            .or(choice.message.reasoning_content)
            .filter(|r| !r.trim().is_empty());

        let usage = api_response.usage.and_then(ApiUsage::into_usage);

        Ok(ProviderResponse {
            message,
            reasoning,
            finish_reason: choice.finish_reason,
            usage,
            model: api_response
                .model
                .unwrap_or_else(|| requested_model.to_string()),
        })
    }

    async fn ollama_tags(&self, root: &str) -> Option<Vec<String>> {
        let response = self
            .client
            .get(format!("{root}/api/tags"))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .ok()?;
        if !response.status().is_success() {
            return None;
        }
        let body: serde_json::Value = response.json().await.ok()?;
        Some(
            body["models"]
                .as_array()?
                .iter()
                .filter_map(|m| m["name"].as_str().map(String::from))
                .collect(),
        )
    }
}

#[async_trait]
impl sysreact_core::Provider for OpenAiCompatProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn endpoint(&self) -> Option<&str> {
        Some(self.probe_root.as_deref().unwrap_or(&self.base_url))
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = Self::request_body(&request);

        debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending completion request"
        );

        let response = self
            .authorized(self.client.post(&url))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ProviderError::Timeout(e.to_string())
                } else {
                    ProviderError::Network(e.to_string())
                }
            })?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(ProviderError::RateLimited {
                retry_after_secs: 5,
            });
        }

        if status == 401 || status == 403 {
            return Err(ProviderError::AuthenticationFailed(
                "Invalid API key or insufficient permissions".into(),
            ));
        }

        if status == 404 {
            let error_body = response.text().await.unwrap_or_default();
            if error_body.contains("model") {
                return Err(ProviderError::ModelNotFound(request.model));
            }
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Provider returned error");
            return Err(ProviderError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))?;

        let parsed = Self::parse_response(api_response, &request.model)?;
        trace!(
            finish_reason = ?parsed.finish_reason,
            tool_calls = parsed.message.tool_calls.len(),
            "Completion received"
        );
        Ok(parsed)
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        if let Some(root) = &self.probe_root
            && let Some(models) = self.ollama_tags(root).await
        {
            return Ok(models);
        }

        let url = format!("{}/models", self.base_url);
        let response = self
            .authorized(self.client.get(&url))
            .timeout(PROBE_TIMEOUT)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Ok(Vec::new());
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        let models = body["data"]
            .as_array()
            .map(|arr| {
                arr.iter()
                    .filter_map(|m| m["id"].as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default();

        Ok(models)
    }

    async fn health_check(&self) -> std::result::Result<ProviderHealth, ProviderError> {
        let mut probes = Vec::new();
        if let Some(root) = &self.probe_root {
            probes.push(format!("{root}/api/tags"));
            probes.push(format!("{root}/api/version"));
        }
        probes.push(format!("{}/models", self.base_url));

        let started = Instant::now();
        let mut last_error = String::from("no probe attempted");

        for url in probes {
            match self
                .authorized(self.client.get(&url))
                .timeout(PROBE_TIMEOUT)
                .send()
                .await
            {
                Ok(resp) if resp.status().is_success() => {
                    debug!(url = %url, "Health probe succeeded");
                    return Ok(ProviderHealth {
                        reachable: true,
                        response_time_ms: Some(started.elapsed().as_millis() as u64),
                        endpoint: sysreact_core::Provider::endpoint(self).map(str::to_string),
                        model: self.model.clone(),
                        detail: format!("{url} responded"),
                    });
                }
                Ok(resp) => last_error = format!("{url} returned {}", resp.status()),
                Err(e) => last_error = format!("{url}: {e}"),
            }
            debug!(error = %last_error, "Health probe failed");
        }

        Ok(ProviderHealth {
            reachable: false,
            response_time_ms: None,
            endpoint: sysreact_core::Provider::endpoint(self).map(str::to_string),
            model: self.model.clone(),
            detail: last_error,
        })
    }
}

// --- Wire types ---

#[derive(Debug, Serialize, Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolCall {
    #[serde(default)]
    id: String,
    #[serde(default = "function_type")]
    r#type: String,
    function: ApiFunction,
}

fn function_type() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiFunction {
    name: String,
    #[serde(default)]
    arguments: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolDefinition {
    r#type: String,
    function: ApiToolFunction,
}

#[derive(Debug, Serialize, Deserialize)]
struct ApiToolFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Debug, Deserialize)]
struct ApiChoice {
    message: ApiResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ApiToolCall>>,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

/// Servers differ in which counters they fill in, so every field is optional.
#[derive(Debug, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl ApiUsage {
    /// `None` when no counter was reported, so the run falls back to its estimate.
    fn into_usage(self) -> Option<Usage> {
        if self.prompt_tokens.is_none() && self.completion_tokens.is_none() && self.total_tokens.is_none() {
            return None;
        }
        let prompt_tokens = self.prompt_tokens.unwrap_or(0);
        let completion_tokens = self.completion_tokens.unwrap_or(0);
        Some(Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: self
                .total_tokens
                .unwrap_or_else(|| prompt_tokens.saturating_add(completion_tokens)),
        })
    }
}
