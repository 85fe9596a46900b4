//! Best-effort conclusion when the iteration budget runs out.
//!
//! Assembled deterministically from what the run already has. No extra
//! gateway call is made.

use sysreact_core::{Message, Role};
use crate::record::{IterationRecord, ReasoningEntry};

/// Leads every partial conclusion, so callers can tell it from an answer.
pub const PARTIAL_MARKER: &str = "Maximum iterations reached";

pub const INSUFFICIENT_DATA: &str = "Not enough data was collected for an analysis. \
    Simplify the request or ask a more specific question and try again.";

const MAX_INSIGHTS: usize = 5;
const MIN_INSIGHT_CHARS: usize = 50;
const INSIGHT_PREVIEW: usize = 200;

const RECENT_REASONING: usize = 3;
const MIN_REASONING_CHARS: usize = 30;
const REASONING_PREVIEW: usize = 150;
const REASONING_KEYWORDS: [&str; 9] = [
    "analy", "found", "problem", "issue", "resolve", "improve", "recommend", "conclusion", "important",
];

const MAX_FINDINGS: usize = 3;
const FINDING_PREVIEW: usize = 200;
const FINDING_INDICATORS: [&str; 5] = [
    "i found", "confirmed", "analysis result", "recommendation", "solution",
];

/// First `max` characters of `text`, with `...` when cut.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let mut cut: String = text.chars().take(max).collect();
        cut.push_str("...");
        cut
    } else {
        text.to_string()
    }
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let lower = text.to_lowercase();
    needles.iter().any(|n| lower.contains(n))
}

pub fn synthesize(
    max_iterations: u32,
    execution_log: &[IterationRecord],
    reasoning_history: &[ReasoningEntry],
    conversation: &[Message],
) -> String {
    if execution_log.is_empty() && reasoning_history.is_empty() {
        return INSUFFICIENT_DATA.to_string();
    }

    let calls: Vec<_> = execution_log.iter().flat_map(|r| &r.tool_calls).collect();

    let mut succeeded: Vec<&str> = Vec::new();
    let mut success_count = 0;
    let mut failed = Vec::new();
    let mut insights = Vec::new();
    for call in &calls {
        if call.success {
            success_count += 1;
            if !succeeded.contains(&call.tool.as_str()) {
                succeeded.push(&call.tool);
            }
            if call.output.chars().count() > MIN_INSIGHT_CHARS {
                insights.push(format!("• {}: {}", call.tool, preview(&call.output, INSIGHT_PREVIEW)));
            }
        } else {
            let error = call.error.as_deref().unwrap_or("unknown error");
            failed.push(format!("{} ({error})", call.tool));
        }
    }

    let recent_start = reasoning_history.len().saturating_sub(RECENT_REASONING);
    let reasoning: Vec<String> = reasoning_history[recent_start..]
        .iter()
        .map(|e| e.reasoning.as_str())
        .filter(|r| r.chars().count() > MIN_REASONING_CHARS && contains_any(r, &REASONING_KEYWORDS))
        .map(|r| format!("• {}", preview(r, REASONING_PREVIEW)))
        .collect();

    // Skip the system prompt and the first user message
    let findings: Vec<String> = conversation
        .iter()
        .skip(2)
        .filter(|m| m.role == Role::Assistant && !m.content.is_empty())
        .filter(|m| contains_any(&m.content, &FINDING_INDICATORS))
        .take(MAX_FINDINGS)
        .map(|m| format!("• {}", preview(&m.content, FINDING_PREVIEW)))
        .collect();

    let mut out = vec![
        format!("{PARTIAL_MARKER} ({max_iterations}); the analysis stopped before a final answer."),
        String::new(),
        "## Progress so far".to_string(),
    ];

    if calls.is_empty() {
        out.push("No tools were run.".into());
    } else {
        out.push(format!("Tools attempted: {}", calls.len()));
        out.push(format!("- Succeeded: {success_count} ({})", succeeded.join(", ")));
        if !failed.is_empty() {
            out.push(format!("- Failed: {} ({})", failed.len(), failed.join(", ")));
        }
    }

    if !insights.is_empty() {
        out.push(String::new());
        out.push("## Key information collected".into());
        out.extend(insights.into_iter().take(MAX_INSIGHTS));
    }

    if !reasoning.is_empty() {
        out.push(String::new());
        out.push("## Key reasoning".into());
        out.extend(reasoning);
    }

    if !findings.is_empty() {
        out.push(String::new());
        out.push("## Findings".into());
        out.extend(findings);
    }

    out.push(String::new());
    out.push("## Recommendations".into());
    out.push("• Break the request into narrower, more specific sub-tasks and retry".into());
    out.push("• Focus on one area at a time and work through it step by step".into());
    out.push(format!("• Increase max_iterations to {} or more and retry", max_iterations + 5));
    if success_count > 0 {
        out.push("• Build the next step on the results that succeeded".into());
    }
    if !failed.is_empty() {
        out.push("• Review the failed tools individually".into());
    }

    out.join("\n")
}
