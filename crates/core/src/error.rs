//! Error types for the sysreact domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the top-level [`Error`]
//! wraps them for callers that don't care which layer failed.

use thiserror::Error;

/// The top-level error type for all sysreact operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Gateway errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the LLM gateway (transport or response).
///
/// The agent loop retries these across iterations and only surfaces one
/// when it happens on the last allowed pass.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Registry and tool failures.
///
/// None of these abort a run: the loop turns them into observations so the
/// model can self-correct.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Unknown tool: {name} (available: {})", available.join(", "))]
    UnknownTool { name: String, available: Vec<String> },

    #[error("Missing required arguments for {tool_name}: {}", fields.join(", "))]
    MissingArguments { tool_name: String, fields: Vec<String> },

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_secs}s")]
    Timeout { tool_name: String, timeout_secs: u64 },

    #[error("Permission denied: {tool_name}: {reason}")]
    PermissionDenied { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Invalid tool definition: {0}")]
    InvalidDefinition(String),
}

impl ToolError {
    /// Render the structured payload sent back to the model as the tool
    /// response for a failed invocation.
    pub fn to_payload(&self, arguments: &serde_json::Value) -> serde_json::Value {
        match self {
            ToolError::UnknownTool { available, .. } => serde_json::json!({
                "error": self.to_string(),
                "available_tools": available,
            }),
            ToolError::MissingArguments { fields, .. } => serde_json::json!({
                "error": self.to_string(),
                "missing": fields,
            }),
            ToolError::ExecutionFailed { tool_name, .. }
            | ToolError::Timeout { tool_name, .. }
            | ToolError::PermissionDenied { tool_name, .. } => serde_json::json!({
                "error": self.to_string(),
                "tool": tool_name,
                "arguments": arguments,
            }),
            ToolError::InvalidArguments(_) | ToolError::InvalidDefinition(_) => {
                serde_json::json!({
                    "error": self.to_string(),
                    "arguments": arguments,
                })
            }
        }
    }
}
