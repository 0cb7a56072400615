//! System instruction for the advisor model.
//!
//! Layers (in order):
//! 1. Role (career advisor)
//! 2. Tool usage guidance, listing the tools actually registered

use crate::tools::ToolDescriptor;
use tracing::debug;

const ROLE: &str = r#"
# Role

You are a career advisor. You help people plan realistic moves into new roles.
Ground your advice in the career database context and in tool results.
Never invent job listings, salaries or statistics that no tool returned.
"#;

const TOOL_GUIDANCE: &str = r#"
# Tools

Call tools when they would make the advice more concrete. If a tool reports
an error, fix the arguments and try again, or continue without it.
When you have enough information, answer in Markdown without calling tools.
"#;

/// Build the system prompt for an advice request.
pub fn build_system_prompt(tools: &[ToolDescriptor]) -> String {
    let mut prompt = String::with_capacity(1024);

    prompt.push_str(ROLE);
    prompt.push('\n');

    if !tools.is_empty() {
        prompt.push_str(TOOL_GUIDANCE);
        prompt.push('\n');
        for tool in tools {
            prompt.push_str(&format!("- `{}`: {}\n", tool.name, tool.description));
        }
    }

    debug!("System prompt: {} chars", prompt.len());
    prompt
}
