pub mod onboard;
pub mod run;
pub mod status;
pub mod tools;

use sysreact_agent::ReactAgent;
use sysreact_config::AppConfig;
use tracing::warn;

/// Build the agent described by `config`: gateway, tools and settings.
pub fn build_agent(config: &AppConfig) -> sysreact_core::Result<ReactAgent> {
    config.validate()?;
    if !config.target.is_configured() {
        warn!("No target host configured; tool calls will fail until [target] is set");
    }

    let provider = sysreact_providers::build_from_config(config)?;
    let tools = sysreact_tools::default_registry(&config.target);
    Ok(ReactAgent::from_config(provider, tools, config))
}

/// Where the tools run, for display.
pub fn describe_target(config: &AppConfig) -> String {
    match config.target.mode {
        sysreact_config::TargetMode::Local => "localhost".into(),
        sysreact_config::TargetMode::Ssh => match config.target.destination() {
            Some(dest) => format!("{dest}:{} (ssh)", config.target.port),
            None => "(not configured)".into(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_settings_are_a_config_error() {
        let config = AppConfig {
            max_iterations: 0,
            ..AppConfig::default()
        };
        let err = build_agent(&config).err().unwrap();
        assert!(matches!(err, sysreact_core::Error::Config { .. }));
        assert!(err.to_string().contains("max_iterations"));
    }

    #[test]
    fn missing_api_key_is_a_provider_error() {
        let config = AppConfig {
            provider: sysreact_config::ProviderKind::OpenAi,
            model: "gpt-4o".into(),
            api_key: None,
            ..AppConfig::default()
        };
        let err = build_agent(&config).err().unwrap();
        assert!(matches!(err, sysreact_core::Error::Provider(_)));
    }

    #[test]
    fn default_settings_build_an_agent() {
        let agent = build_agent(&AppConfig::default()).unwrap();
        assert_eq!(agent.tools().list_tools().len(), 5);
    }
}
