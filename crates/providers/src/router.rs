//! Provider selection: builds the configured LLM gateway.
//!
//! In `auto` mode the model name decides: open-weight models are served by a
//! local Ollama instance, everything else goes to the OpenAI API.

use std::sync::Arc;
use std::time::Duration;
use sysreact_config::{AppConfig, ProviderKind};
use sysreact_core::error::ProviderError;
use sysreact_core::provider::Provider;
use tracing::info;
use crate::openai_compat::OpenAiCompatProvider;

/// Model name fragments served by a local Ollama instance.
const LOCAL_MODEL_HINTS: [&str; 5] = ["gpt-oss", "llama", "mixtral", "codellama", "iteasy-gpt"];

/// Whether `auto` mode sends `model` to Ollama.
pub fn is_local_model(model: &str) -> bool {
    let model = model.to_ascii_lowercase();
    LOCAL_MODEL_HINTS.iter().any(|hint| model.contains(hint))
}

/// The concrete backend `auto` resolves to.
pub fn resolve_kind(kind: ProviderKind, model: &str) -> ProviderKind {
    match kind {
        ProviderKind::Auto if is_local_model(model) => ProviderKind::Ollama,
        ProviderKind::Auto => ProviderKind::OpenAi,
        other => other,
    }
}

/// Build the provider described by `config`.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn Provider>, ProviderError> {
    let timeout = Duration::from_secs(config.request_timeout_secs);
    let kind = resolve_kind(config.provider, &config.model);

    let provider = match kind {
        ProviderKind::Ollama => OpenAiCompatProvider::ollama(&config.endpoint, timeout)?,
        ProviderKind::OpenAi => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                ProviderError::NotConfigured(format!(
                    "model '{}' needs the OpenAI API; set api_key or SYSREACT_API_KEY",
                    config.model
                ))
            })?;
            OpenAiCompatProvider::openai(api_key, timeout)?
        }
        ProviderKind::OpenAiCompat | ProviderKind::Auto => OpenAiCompatProvider::new(
            "openai_compat",
            &config.endpoint,
            config.api_key.clone().unwrap_or_default(),
            timeout,
        )?,
    };

    info!(
        provider = %kind,
        base_url = provider.base_url(),
        model = %config.model,
        "Gateway configured"
    );
    Ok(Arc::new(provider.with_model(&config.model)))
}
