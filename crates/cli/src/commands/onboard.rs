//! `sysreact onboard`: Write the default configuration.

use sysreact_config::AppConfig;

pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = AppConfig::config_path();

    println!("sysreact — First-Time Setup");
    println!("===========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("  Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() && !force {
        println!("\n  Config already exists at: {}", config_path.display());
        println!("  Edit it manually, or re-run with --force to overwrite.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("  Wrote config.toml at: {}", config_path.display());
    println!("\n  Next steps:");
    println!("   1. Set [target] host (or mode = \"local\") in {}", config_path.display());
    println!("   2. Pick a model; hosted models also need api_key or SYSREACT_API_KEY");
    println!("   3. Run: sysreact status");
    println!("   4. Run: sysreact run -m \"check the system\"\n");

    Ok(())
}
