//! `sysreact tools`: List the registered tools.

use sysreact_config::AppConfig;

pub fn run(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let registry = sysreact_tools::default_registry(&config.target);

    println!("Registered tools ({})", registry.len());
    println!("=====================");
    for descriptor in registry.descriptors() {
        println!("\n  {}", descriptor.name());
        println!("    {}", descriptor.description());
        let fields = descriptor.parameters().fields();
        if fields.is_empty() {
            println!("    parameters: none");
        }
        for field in fields {
            let required = if field.required { "required" } else { "optional" };
            println!(
                "    - {} ({}, {required}): {}",
                field.name,
                field.kind.as_str(),
                field.description
            );
        }
    }
    println!();
    Ok(())
}
