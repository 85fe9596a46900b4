//! Configuration loading, validation, and management for sysreact.
//!
//! Loads configuration from `~/.sysreact/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.sysreact/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for hosted endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Which gateway to talk to
    #[serde(default)]
    pub provider: ProviderKind,

    /// Base URL of the local model server (or the custom endpoint)
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Max tokens per LLM response
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Iteration budget of one run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// HTTP timeout for one gateway call
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Replace the built-in system prompt entirely
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt_override: Option<String>,

    /// Fallback reasoning detection
    #[serde(default)]
    pub reasoning: ReasoningConfig,

    /// Host the diagnostic tools run against
    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Gateway selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// Pick Ollama or OpenAI from the model name
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "ollama")]
    Ollama,
    #[serde(rename = "openai")]
    OpenAi,
    /// Any OpenAI-compatible server at `endpoint`
    #[serde(rename = "openai_compat")]
    OpenAiCompat,
}

impl std::str::FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "ollama" => Ok(Self::Ollama),
            "openai" => Ok(Self::OpenAi),
            "openai_compat" | "openai-compat" | "custom" => Ok(Self::OpenAiCompat),
            other => Err(ConfigError::ValidationError(format!(
                "unknown provider '{other}' (expected auto, ollama, openai or openai_compat)"
            ))),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Auto => "auto",
            Self::Ollama => "ollama",
            Self::OpenAi => "openai",
            Self::OpenAiCompat => "openai_compat",
        };
        f.write_str(s)
    }
}

fn default_endpoint() -> String {
    "http://localhost:11434".into()
}
fn default_model() -> String {
    "gpt-oss:20b".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_iterations() -> u32 {
    10
}
fn default_request_timeout() -> u64 {
    120
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("provider", &self.provider)
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("max_iterations", &self.max_iterations)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("system_prompt_override", &self.system_prompt_override.is_some())
            .field("reasoning", &self.reasoning)
            .field("target", &self.target)
            .field("logging", &self.logging)
            .finish()
    }
}

/// Phrases that mark model content as intermediate reasoning.
///
/// `markers` match case-sensitively as substrings; `intent_phrases` match
/// against the lowercased content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReasoningConfig {
    #[serde(default = "default_markers")]
    pub markers: Vec<String>,

    #[serde(default = "default_intent_phrases")]
    pub intent_phrases: Vec<String>,
}

fn default_markers() -> Vec<String> {
    [
        "Current situation:",
        "Information needed:",
        "Next action:",
        "Analysis:",
        "Reasoning:",
        "Plan:",
        "Observation:",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_intent_phrases() -> Vec<String> {
    [
        "let me think",
        "i will analyze",
        "i will check",
        "let me analyze",
        "let me check",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for ReasoningConfig {
    fn default() -> Self {
        Self {
            markers: default_markers(),
            intent_phrases: default_intent_phrases(),
        }
    }
}

/// How the tools reach the diagnosed host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetMode {
    /// Remote host over the system `ssh` client
    #[default]
    Ssh,
    /// The machine sysreact runs on
    Local,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetConfig {
    #[serde(default)]
    pub mode: TargetMode,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default = "default_ssh_port")]
    pub port: u16,

    /// Login user; the ssh client default when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Private key passed to `ssh -i`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity_file: Option<PathBuf>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_command_timeout")]
    pub command_timeout_secs: u64,

    /// First words accepted by `exec_command_remote_system`. Empty = any.
    #[serde(default)]
    pub allowed_commands: Vec<String>,
}

fn default_ssh_port() -> u16 {
    22
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_command_timeout() -> u64 {
    60
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            mode: TargetMode::default(),
            host: None,
            port: default_ssh_port(),
            username: None,
            identity_file: None,
            connect_timeout_secs: default_connect_timeout(),
            command_timeout_secs: default_command_timeout(),
            allowed_commands: vec![],
        }
    }
}

impl TargetConfig {
    /// Whether tools have somewhere to run.
    pub fn is_configured(&self) -> bool {
        match self.mode {
            TargetMode::Local => true,
            TargetMode::Ssh => self.host.as_deref().is_some_and(|h| !h.trim().is_empty()),
        }
    }

    /// `user@host` (or just `host`) for display and for `ssh`.
    pub fn destination(&self) -> Option<String> {
        let host = self.host.as_deref()?;
        Some(match self.username.as_deref() {
            Some(user) => format!("{user}@{host}"),
            None => host.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable logs
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl AppConfig {
    /// Load configuration from the default path (~/.sysreact/config.toml).
    ///
    /// Environment variables override the file:
    /// - `SYSREACT_API_KEY` (falls back to `OPENAI_API_KEY`)
    /// - `SYSREACT_PROVIDER`
    /// - `SYSREACT_ENDPOINT`
    /// - `SYSREACT_MODEL`
    /// - `SYSREACT_MAX_ITERATIONS`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("SYSREACT_API_KEY").or_else(|| {
            if self.api_key.is_none() {
                non_empty("OPENAI_API_KEY")
            } else {
                None
            }
        }) {
            self.api_key = Some(key);
        }

        if let Some(provider) = non_empty("SYSREACT_PROVIDER") {
            self.provider = provider.parse()?;
        }

        if let Some(endpoint) = non_empty("SYSREACT_ENDPOINT") {
            self.endpoint = endpoint;
        }

        if let Some(model) = non_empty("SYSREACT_MODEL") {
            self.model = model;
        }

        if let Some(raw) = non_empty("SYSREACT_MAX_ITERATIONS") {
            self.max_iterations = raw.trim().parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "SYSREACT_MAX_ITERATIONS must be a positive integer, got '{raw}'"
                ))
            })?;
        }

        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".sysreact")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if !(1..=100).contains(&self.max_iterations) {
            return Err(ConfigError::ValidationError(
                "max_iterations must be between 1 and 100".into(),
            ));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "request_timeout_secs must be > 0".into(),
            ));
        }

        if self.model.trim().is_empty() {
            return Err(ConfigError::ValidationError("model must not be empty".into()));
        }

        if !self.endpoint.starts_with("http://") && !self.endpoint.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }

        if self.target.port == 0 {
            return Err(ConfigError::ValidationError("target.port must be > 0".into()));
        }

        if self.target.connect_timeout_secs == 0 || self.target.command_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "target timeouts must be > 0".into(),
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {}",
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            provider: ProviderKind::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            max_iterations: default_max_iterations(),
            request_timeout_secs: default_request_timeout(),
            system_prompt_override: None,
            reasoning: ReasoningConfig::default(),
            target: TargetConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigError> for sysreact_core::Error {
    fn from(e: ConfigError) -> Self {
        sysreact_core::Error::Config {
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert_eq!(config.provider, ProviderKind::Auto);
        assert_eq!(config.endpoint, "http://localhost:11434");
        assert_eq!(config.model, "gpt-oss:20b");
        assert_eq!(config.max_iterations, 10);
        assert_eq!(config.target.port, 22);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider, config.provider);
        assert_eq!(parsed.reasoning, config.reasoning);
        assert_eq!(parsed.target, config.target);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_error_converts_to_domain_error() {
        let err: sysreact_core::Error = ConfigError::ValidationError("temperature out of range".into()).into();
        assert!(matches!(err, sysreact_core::Error::Config { .. }));
        assert!(err.to_string().contains("temperature out of range"));
    }

    #[test]
    fn iteration_budget_bounds() {
        for bad in [0, 101] {
            let config = AppConfig {
                max_iterations: bad,
                ..AppConfig::default()
            };
            assert!(matches!(config.validate(), Err(ConfigError::ValidationError(_))));
        }
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        let config = result.unwrap();
        assert_eq!(config.model, "gpt-oss:20b");
    }

    #[test]
    fn load_from_file_with_target_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
model = "llama3.1:8b"
max_iterations = 4

[target]
host = "10.0.0.5"
username = "ops"
identity_file = "/home/ops/.ssh/id_ed25519"
allowed_commands = ["uptime", "df"]

[reasoning]
markers = ["Thought:"]
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.model, "llama3.1:8b");
        assert_eq!(config.max_iterations, 4);
        assert_eq!(config.target.destination().as_deref(), Some("ops@10.0.0.5"));
        assert!(config.target.is_configured());
        assert_eq!(config.target.command_timeout_secs, 60);
        assert_eq!(config.reasoning.markers, vec!["Thought:".to_string()]);
        // Unset list falls back to its defaults
        assert!(config.reasoning.intent_phrases.contains(&"let me check".to_string()));
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_iterations = \"many\"").unwrap();
        assert!(matches!(
            AppConfig::load_from(file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn env_overrides_take_priority() {
        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config
            .apply_env_overrides(env(&[
                ("SYSREACT_API_KEY", "sk-env"),
                ("SYSREACT_PROVIDER", "openai"),
                ("SYSREACT_MODEL", "gpt-4o"),
                ("SYSREACT_MAX_ITERATIONS", "25"),
            ]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-env"));
        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.max_iterations, 25);
    }

    #[test]
    fn openai_key_only_fills_missing_key() {
        let mut config = AppConfig::default();
        config
            .apply_env_overrides(env(&[("OPENAI_API_KEY", "sk-openai")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("sk-openai"));

        let mut config = AppConfig {
            api_key: Some("from-file".into()),
            ..AppConfig::default()
        };
        config
            .apply_env_overrides(env(&[("OPENAI_API_KEY", "sk-openai")]))
            .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn bad_env_values_are_rejected() {
        let mut config = AppConfig::default();
        assert!(config
            .apply_env_overrides(env(&[("SYSREACT_MAX_ITERATIONS", "lots")]))
            .is_err());
        assert!(config
            .apply_env_overrides(env(&[("SYSREACT_PROVIDER", "bedrock")]))
            .is_err());
    }

    #[test]
    fn unconfigured_ssh_target() {
        let target = TargetConfig::default();
        assert!(!target.is_configured());
        let local = TargetConfig {
            mode: TargetMode::Local,
            ..TargetConfig::default()
        };
        assert!(local.is_configured());
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("gpt-oss:20b"));
        assert!(toml_str.contains("[target]"));
        assert!(toml_str.contains("Next action:"));
    }
}
