//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act on the target system:
//! collect host facts, list processes, inspect services and containers, run
//! commands. Each tool is described by a [`ToolDescriptor`] and reached
//! through the [`ToolRegistry`], which validates arguments and dispatches by
//! name.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};
use crate::error::ToolError;
use crate::provider::ToolDefinition;

/// JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamKind {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl ParamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
            ParamKind::Number => "number",
            ParamKind::Boolean => "boolean",
            ParamKind::Array => "array",
            ParamKind::Object => "object",
        }
    }
}

/// One named field of a parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamField {
    pub name: String,
    pub kind: ParamKind,
    pub description: String,
    pub required: bool,
}

/// The set of named fields a tool accepts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    fields: Vec<ParamField>,
}

impl ParameterSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(mut self, name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        self.push(name.into(), kind, description.into(), true);
        self
    }

    pub fn optional(mut self, name: impl Into<String>, kind: ParamKind, description: impl Into<String>) -> Self {
        self.push(name.into(), kind, description.into(), false);
        self
    }

    fn push(&mut self, name: String, kind: ParamKind, description: String, required: bool) {
        // Field names are unique; redeclaring replaces.
        self.fields.retain(|f| f.name != name);
        self.fields.push(ParamField { name, kind, description, required });
    }

    pub fn fields(&self) -> &[ParamField] {
        &self.fields
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Required fields absent from `args`. A non-object counts as empty.
    pub fn missing(&self, args: &Value) -> Vec<String> {
        let object = args.as_object();
        self.fields
            .iter()
            .filter(|f| f.required)
            .filter(|f| object.is_none_or(|o| !o.contains_key(&f.name)))
            .map(|f| f.name.clone())
            .collect()
    }

    /// Render as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let properties: serde_json::Map<String, Value> = self
            .fields
            .iter()
            .map(|f| {
                (
                    f.name.clone(),
                    serde_json::json!({
                        "type": f.kind.as_str(),
                        "description": f.description,
                    }),
                )
            })
            .collect();
        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": self.required_fields(),
        })
    }
}

/// Name, description and parameters of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    name: String,
    description: String,
    parameters: ParameterSchema,
}

impl ToolDescriptor {
    /// Fails when `name` or `description` is blank.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Result<Self, ToolError> {
        let name = name.into();
        let description = description.into();
        if name.trim().is_empty() {
            return Err(ToolError::InvalidDefinition("tool name must not be empty".into()));
        }
        if description.trim().is_empty() {
            return Err(ToolError::InvalidDefinition(format!(
                "tool '{name}' must have a description"
            )));
        }
        Ok(Self {
            name,
            description,
            parameters: ParameterSchema::default(),
        })
    }

    pub fn with_parameters(mut self, parameters: ParameterSchema) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn parameters(&self) -> &ParameterSchema {
        &self.parameters
    }

    pub fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name.clone(),
            description: self.description.clone(),
            parameters: self.parameters.to_json_schema(),
        }
    }
}

/// The core Tool trait.
///
/// Each diagnostic capability implements this trait and is made available to
/// the agent loop through the [`ToolRegistry`].
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    /// The unique name of this tool (e.g., "system_info_analyzer").
    fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str {
        self.descriptor().description()
    }

    /// Names of required fields missing from `arguments`.
    fn validate(&self, arguments: &Value) -> Vec<String> {
        self.descriptor().parameters().missing(arguments)
    }

    /// Execute the tool with already-validated arguments.
    async fn execute(&self, arguments: Value) -> std::result::Result<String, ToolError>;

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        self.descriptor().to_definition()
    }
}

type BuildFn = dyn Fn() -> std::result::Result<Box<dyn Tool>, ToolError> + Send + Sync;

/// A named constructor for a tool, used by registry discovery.
pub struct ToolSource {
    label: String,
    build: Box<BuildFn>,
}

impl ToolSource {
    pub fn new<F>(label: impl Into<String>, build: F) -> Self
    where
        F: Fn() -> std::result::Result<Box<dyn Tool>, ToolError> + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            build: Box::new(build),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn build(&self) -> std::result::Result<Box<dyn Tool>, ToolError> {
        (self.build)()
    }
}

impl std::fmt::Debug for ToolSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSource").field("label", &self.label).finish()
    }
}

/// A registry of available tools, keyed and ordered by name.
///
/// The agent loop uses this to:
/// 1. Get tool definitions to send to the LLM
/// 2. Validate and execute tools when the LLM requests them
#[derive(Default)]
pub struct ToolRegistry {
    sources: Vec<ToolSource>,
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry by running discovery over `sources`.
    pub fn from_sources(sources: Vec<ToolSource>) -> Self {
        let mut registry = Self {
            sources,
            tools: BTreeMap::new(),
        };
        registry.discover();
        registry
    }

    /// Clear the mapping and rebuild it from the sources.
    ///
    /// Tools added with [`register`](Self::register) are dropped.
    pub fn reload(&mut self) {
        self.tools.clear();
        self.discover();
    }

    fn discover(&mut self) {
        for source in &self.sources {
            match source.build() {
                Ok(tool) => {
                    info!(tool = tool.name(), source = source.label(), "Loaded tool");
                    let name = tool.name().to_string();
                    if self.tools.insert(name.clone(), tool).is_some() {
                        warn!(tool = %name, "Duplicate tool name, later source wins");
                    }
                }
                Err(e) => {
                    warn!(source = source.label(), error = %e, "Skipping tool source");
                }
            }
        }
        debug!(count = self.tools.len(), "Tool discovery complete");
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if self.tools.insert(name.clone(), tool).is_some() {
            warn!(tool = %name, "Replaced existing tool");
        }
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// All registered tool names, sorted.
    pub fn list_tools(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// Descriptors of every tool, in name order.
    pub fn descriptors(&self) -> Vec<&ToolDescriptor> {
        self.tools.values().map(|t| t.descriptor()).collect()
    }

    /// Get all tool definitions (for sending to the LLM).
    pub fn schema_for_all(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|t| t.to_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Look up, validate and run a tool.
    ///
    /// The tool is never invoked when a required argument is missing.
    pub async fn dispatch(&self, name: &str, arguments: Value) -> std::result::Result<String, ToolError> {
        let tool = self.tools.get(name).ok_or_else(|| ToolError::UnknownTool {
            name: name.to_string(),
            available: self.list_tools(),
        })?;

        let missing = tool.validate(&arguments);
        if !missing.is_empty() {
            return Err(ToolError::MissingArguments {
                tool_name: name.to_string(),
                fields: missing,
            });
        }

        debug!(tool = name, "Executing tool");
        tool.execute(arguments).await
    }

    /// Like [`dispatch`](Self::dispatch) but never fails: errors come back
    /// as a JSON payload string.
    pub async fn execute(&self, name: &str, arguments: Value) -> String {
        let payload_args = arguments.clone();
        match self.dispatch(name, arguments).await {
            Ok(output) => output,
            Err(e) => e.to_payload(&payload_args).to_string(),
        }
    }
}

impl std::fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.list_tools())
            .field("sources", &self.sources.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// A simple test tool for unit tests.
    struct EchoTool {
        descriptor: ToolDescriptor,
        calls: Arc<AtomicUsize>,
    }

    impl EchoTool {
        fn new(calls: Arc<AtomicUsize>) -> Self {
            let descriptor = ToolDescriptor::new("echo", "Echoes back the input")
                .unwrap()
                .with_parameters(
                    ParameterSchema::new()
                        .required("text", ParamKind::String, "Text to echo")
                        .optional("upper", ParamKind::Boolean, "Uppercase the text"),
                );
            Self { descriptor, calls }
        }
    }

    #[async_trait]
    impl Tool for EchoTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, arguments: Value) -> std::result::Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(arguments["text"].as_str().unwrap_or("").to_string())
        }
    }

    struct BrokenTool {
        descriptor: ToolDescriptor,
    }

    #[async_trait]
    impl Tool for BrokenTool {
        fn descriptor(&self) -> &ToolDescriptor {
            &self.descriptor
        }

        async fn execute(&self, _arguments: Value) -> std::result::Result<String, ToolError> {
            Err(ToolError::ExecutionFailed {
                tool_name: "broken".into(),
                reason: "host unreachable".into(),
            })
        }
    }

    fn echo_registry() -> (ToolRegistry, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool::new(calls.clone())));
        (registry, calls)
    }

    #[test]
    fn descriptor_requires_name_and_description() {
        assert!(matches!(
            ToolDescriptor::new("", "something"),
            Err(ToolError::InvalidDefinition(_))
        ));
        assert!(matches!(
            ToolDescriptor::new("probe", "   "),
            Err(ToolError::InvalidDefinition(_))
        ));
        assert!(ToolDescriptor::new("probe", "Probe the host").is_ok());
    }

    #[test]
    fn schema_renders_required_and_properties() {
        let schema = ParameterSchema::new()
            .required("command", ParamKind::String, "Command to run")
            .optional("timeout", ParamKind::Integer, "Seconds");
        let json = schema.to_json_schema();
        assert_eq!(json["type"], "object");
        assert_eq!(json["required"], serde_json::json!(["command"]));
        assert_eq!(json["properties"]["timeout"]["type"], "integer");
        assert_eq!(schema.field_names(), vec!["command", "timeout"]);
    }

    #[test]
    fn missing_treats_non_object_as_empty() {
        let schema = ParameterSchema::new().required("command", ParamKind::String, "cmd");
        assert_eq!(schema.missing(&Value::Null), vec!["command".to_string()]);
        assert_eq!(schema.missing(&serde_json::json!("uptime")), vec!["command".to_string()]);
        assert!(schema.missing(&serde_json::json!({"command": "uptime"})).is_empty());
    }

    #[test]
    fn registry_register_and_lookup() {
        let (registry, _) = echo_registry();
        assert!(registry.get("echo").is_some());
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn registry_schema_for_all() {
        let (registry, _) = echo_registry();
        let defs = registry.schema_for_all();
        assert_eq!(defs.len(), 1);
        assert_eq!(defs[0].name, "echo");
        assert_eq!(defs[0].parameters["required"], serde_json::json!(["text"]));
    }

    #[tokio::test]
    async fn registry_dispatch_tool() {
        let (registry, calls) = echo_registry();
        let out = registry
            .dispatch("echo", serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert_eq!(out, "hello world");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unknown_tool_enumerates_available_names() {
        let (registry, _) = echo_registry();
        let err = registry.dispatch("nmap", serde_json::json!({})).await.unwrap_err();
        match err {
            ToolError::UnknownTool { name, available } => {
                assert_eq!(name, "nmap");
                assert_eq!(available, vec!["echo".to_string()]);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let payload: Value =
            serde_json::from_str(&registry.execute("nmap", serde_json::json!({})).await).unwrap();
        assert_eq!(payload["available_tools"], serde_json::json!(["echo"]));
    }

    #[tokio::test]
    async fn missing_arguments_never_invoke_tool() {
        let (registry, calls) = echo_registry();
        let err = registry
            .dispatch("echo", serde_json::json!({"upper": true}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::MissingArguments { ref fields, .. } if fields == &["text"]));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn execute_converts_tool_failure_to_payload() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(BrokenTool {
            descriptor: ToolDescriptor::new("broken", "Always fails").unwrap(),
        }));
        let out = registry.execute("broken", serde_json::json!({"x": 1})).await;
        let payload: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(payload["tool"], "broken");
        assert_eq!(payload["arguments"]["x"], 1);
        assert!(payload["error"].as_str().unwrap().contains("host unreachable"));
    }

    #[test]
    fn discovery_skips_failing_sources_and_reload_rebuilds() {
        let calls = Arc::new(AtomicUsize::new(0));
        let builds = Arc::new(AtomicUsize::new(0));
        let echo_calls = calls.clone();
        let echo_builds = builds.clone();
        let sources = vec![
            ToolSource::new("echo", move || {
                echo_builds.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(EchoTool::new(echo_calls.clone())) as Box<dyn Tool>)
            }),
            ToolSource::new("nameless", || {
                ToolDescriptor::new("", "no name").map(|d| Box::new(BrokenTool { descriptor: d }) as Box<dyn Tool>)
            }),
        ];
        let mut registry = ToolRegistry::from_sources(sources);
        assert_eq!(registry.list_tools(), vec!["echo".to_string()]);

        registry.register(Box::new(BrokenTool {
            descriptor: ToolDescriptor::new("ad_hoc", "Registered directly").unwrap(),
        }));
        assert_eq!(registry.len(), 2);

        registry.reload();
        assert_eq!(registry.list_tools(), vec!["echo".to_string()]);
        assert_eq!(builds.load(Ordering::SeqCst), 2);
    }
}
