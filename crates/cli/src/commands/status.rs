//! `sysreact status`: Gateway health, tools, and configuration.

use sysreact_config::AppConfig;
use super::{build_agent, describe_target};

pub async fn run(config: AppConfig, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let agent = build_agent(&config)?;
    let health = agent.health_check().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&health)?);
        return Ok(());
    }

    let gateway = &health.gateway;
    println!("sysreact Status");
    println!("===============");
    println!("  Config file:    {}", AppConfig::config_path().display());
    println!("  Provider:       {}", health.configuration.provider);
    println!(
        "  Endpoint:       {}",
        health.configuration.endpoint.as_deref().unwrap_or("(none)")
    );
    println!("  Model:          {}", health.configuration.model);
    println!("  Temperature:    {}", health.configuration.temperature);
    println!("  Max iterations: {}", health.configuration.max_iterations);
    println!("  Target:         {}", describe_target(&config));
    println!("  API key:        {}", if config.has_api_key() { "set" } else { "not set" });

    println!();
    if gateway.reachable {
        let ms = gateway.response_time_ms.map(|ms| format!(" in {ms} ms")).unwrap_or_default();
        println!("  Gateway reachable{ms} ({})", gateway.detail);
    } else {
        println!("  Gateway unreachable: {}", gateway.detail);
    }

    println!("  Tools ({}): {}", health.tools.count, health.tools.names.join(", "));

    if !AppConfig::config_path().exists() {
        println!("\n  No config file — run `sysreact onboard` first");
    }
    Ok(())
}
