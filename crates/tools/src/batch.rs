//! Sectioned batches: several diagnostic commands in one remote call.
//!
//! Each command is wrapped between `SECTION_START:<title>` and
//! `SECTION_END:<exit code>` marker lines. Commands are separated by
//! newlines so one failing section never stops the ones after it.

use std::collections::HashMap;
use sysreact_core::error::ToolError;
use tracing::debug;
use crate::runner::CommandRunner;

const START: &str = "SECTION_START:";
const END: &str = "SECTION_END:";
const RULE_WIDTH: usize = 60;

/// A titled command inside a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    pub command: &'static str,
}

impl Section {
    pub const fn new(title: &'static str, command: &'static str) -> Self {
        Self { title, command }
    }
}

/// Output of one section as parsed back from the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionOutput {
    pub output: String,
    /// Missing or unparsable end marker counts as failure (1)
    pub exit_code: i32,
}

/// Render `sections` as one shell script.
pub fn build_batch(sections: &[Section]) -> String {
    sections
        .iter()
        .map(|s| format!("echo '{START}{}'\n({}) 2>&1\necho \"{END}$?\"", s.title, s.command))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split batch output back into sections, keyed by title.
pub fn parse_batch(output: &str) -> HashMap<String, SectionOutput> {
    let mut sections = HashMap::new();
    let mut current: Option<String> = None;
    let mut lines: Vec<&str> = Vec::new();

    for line in output.lines() {
        if let Some(title) = line.strip_prefix(START) {
            if let Some(prev) = current.take() {
                sections.insert(prev, SectionOutput { output: lines.join("\n"), exit_code: 1 });
            }
            current = Some(title.trim().to_string());
            lines.clear();
        } else if let Some(code) = line.strip_prefix(END) {
            if let Some(title) = current.take() {
                let exit_code = code.trim().parse().unwrap_or(1);
                sections.insert(title, SectionOutput { output: lines.join("\n"), exit_code });
            }
            lines.clear();
        } else if current.is_some() {
            lines.push(line);
        }
    }

    // Output cut short before the end marker
    if let Some(title) = current {
        sections.insert(title, SectionOutput { output: lines.join("\n"), exit_code: 1 });
    }
    sections
}

/// Render a sectioned report in definition order.
pub fn render_report(heading: &str, sections: &[Section], parsed: &HashMap<String, SectionOutput>) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let mut out = vec![rule.clone(), format!("     {heading}"), rule];

    for section in sections {
        out.push(String::new());
        out.push(format!("[{}]", section.title));
        out.push("-".repeat(40));
        match parsed.get(section.title) {
            Some(s) if s.exit_code == 0 && !s.output.trim().is_empty() => {
                out.push(s.output.trim().to_string());
            }
            Some(s) if !s.output.trim().is_empty() => {
                out.push(format!("(exit code {})", s.exit_code));
                out.push(s.output.trim().to_string());
            }
            _ => out.push("command failed or produced no output".into()),
        }
    }
    out.join("\n")
}

/// Run `sections` in one call and return the parsed sections.
pub async fn run_batch(
    runner: &dyn CommandRunner,
    tool_name: &str,
    sections: &[Section],
) -> Result<HashMap<String, SectionOutput>, ToolError> {
    let script = build_batch(sections);
    debug!(tool = tool_name, sections = sections.len(), "Running batch");
    let output = runner
        .run(&script)
        .await
        .map_err(|e| e.into_tool_error(tool_name))?;
    Ok(parse_batch(&output.stdout))
}

/// Run `sections` and render the report.
pub async fn run_sections(
    runner: &dyn CommandRunner,
    tool_name: &str,
    heading: &str,
    sections: &[Section],
) -> Result<String, ToolError> {
    let parsed = run_batch(runner, tool_name, sections).await?;
    Ok(render_report(&format!("{heading} ({})", runner.target()), sections, &parsed))
}
