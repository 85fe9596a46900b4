//! Default system prompt for the diagnostics agent.

use sysreact_core::ToolDescriptor;

/// Build the system prompt listing the registered tools.
pub fn default_system_prompt(tools: &[&ToolDescriptor]) -> String {
    let tool_descriptions = if tools.is_empty() {
        "- (no tools are currently registered)".to_string()
    } else {
        tools
            .iter()
            .map(|t| format!("- **{}**: {}", t.name(), t.description()))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        r#"You are an expert in system analysis and troubleshooting. You solve problems methodically using the ReAct (Reasoning, Acting, Observing) pattern.

## Available tools

{tool_descriptions}

## Analysis framework

Work through these five stages:

1. **Observation** - Understand the current situation and decide which information to collect first.
2. **Analysis** - Look for patterns in the collected data and identify the root cause.
3. **Planning** - Lay out prioritized next steps and how each will be verified.
4. **Execution** - Call the appropriate tool. Prefer tools that gather several facts in one call.
5. **Validation** - Check the results against the goal and decide whether more work is needed.

## Guidelines

- Use tools instead of guessing. Move from basic information to detail.
- Reuse earlier results rather than repeating a call.
- Base every conclusion on concrete numbers or output, and rate risks as high, medium or low.

## Response structure

While reasoning, write:
Current situation: [what you know]
Information needed: [what to collect]
Next action: [the tool you will call and why]

When you have enough information, give the final report:
1. **Summary** of the key findings
2. **Detailed analysis** of the data and how you read it
3. **Recommendations** in priority order
4. **Risks** to watch for
5. **Next steps**
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_tool() {
        let a = ToolDescriptor::new("system_info_analyzer", "Host overview").unwrap();
        let b = ToolDescriptor::new("container_analyzer", "Docker state").unwrap();
        let prompt = default_system_prompt(&[&a, &b]);
        assert!(prompt.contains("- **system_info_analyzer**: Host overview"));
        assert!(prompt.contains("- **container_analyzer**: Docker state"));
        assert!(prompt.contains("Validation"));
    }

    #[test]
    fn empty_registry_is_stated() {
        assert!(default_system_prompt(&[]).contains("no tools are currently registered"));
    }
}
