//! # sysreact core
//!
//! Domain types, traits, and error definitions for the sysreact diagnostics
//! agent. This crate defines the domain model that all other crates
//! implement against.
//!
//! ## Design Philosophy
//!
//! Every seam is defined as a trait here: the LLM gateway is a [`Provider`],
//! each capability is a [`Tool`]. Implementations live in their respective
//! crates, so the agent loop can be tested with scripted stand-ins.

pub mod error;
pub mod message;
pub mod provider;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result, ToolError};
pub use message::{Conversation, ConversationId, Message, MessageToolCall, Role};
pub use provider::{
    Provider, ProviderHealth, ProviderRequest, ProviderResponse, ToolDefinition, TurnOutcome, Usage,
};
pub use tool::{ParamField, ParamKind, ParameterSchema, Tool, ToolDescriptor, ToolRegistry, ToolSource};
