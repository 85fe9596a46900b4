//! `sysreact run`: Single-request or interactive diagnosis.

use std::io::Write;
use std::sync::Arc;
use sysreact_agent::{RunOutcome, RunReport};
use sysreact_config::AppConfig;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tracing::info;
use crate::console::ConsoleCallback;
use super::{build_agent, describe_target};

pub async fn run(
    mut config: AppConfig,
    message: Option<String>,
    max_iterations: Option<u32>,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(max) = max_iterations {
        config.max_iterations = max;
    }

    // JSON output keeps stdout machine-readable
    let callback = Arc::new(ConsoleCallback::new(json));
    let mut agent = build_agent(&config)?.with_callback(callback);

    if let Some(msg) = message {
        let report = agent.run(&msg).await;
        print_report(&report, json)?;
        if !report.success {
            return Err(report.error.unwrap_or_else(|| "run failed".into()).into());
        }
        return Ok(());
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║      sysreact — Interactive Diagnostics      ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Target:    {}", describe_target(&config));
    println!("  Tools:     {}", agent.tools().list_tools().join(", "));
    println!("  Budget:    {} iterations", agent.max_iterations());
    println!();
    println!("  Type a request and press Enter.");
    println!("  'reset' starts a new session; 'exit' or 'quit' leaves.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    loop {
        print!("  You > ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else { break };
        let line = line.trim();
        match line {
            "" => continue,
            "exit" | "quit" => break,
            "reset" => {
                agent.reset();
                info!("Session reset");
                println!("  Session cleared.\n");
                continue;
            }
            request => {
                let report = agent.run(request).await;
                print_report(&report, json)?;
            }
        }
    }

    println!("\n  Goodbye!\n");
    Ok(())
}

fn print_report(report: &RunReport, json: bool) -> sysreact_core::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!();
    match report.outcome {
        RunOutcome::Final => println!("  ── Answer ──"),
        RunOutcome::Partial => println!("  ── Partial conclusion ──"),
        RunOutcome::Fatal => println!("  ── Failed ──"),
    }
    for line in report.text().lines() {
        println!("  {line}");
    }

    let usage = &report.token_usage;
    println!();
    println!(
        "  {} iteration(s), {:.2}s, {} tool call(s), {} tokens{}",
        report.iterations,
        report.execution_time,
        report.tools_used.len(),
        usage.total_tokens,
        if usage.estimated { " (estimated)" } else { "" }
    );
    println!();
    Ok(())
}
