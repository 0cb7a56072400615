//! Prompt/context builder for an advice request.
//!
//! Assembles the first user turn: the retrieved career records (verbatim,
//! in retrieval order), then the question, then a fixed instruction asking
//! for a four-part answer.

use crate::types::*;
use tracing::debug;

/// Header of the career context block.
pub const CONTEXT_HEADER: &str = "CAREER DATABASE CONTEXT:";

/// Instruction appended to every prompt.
pub const ANSWER_INSTRUCTION: &str = "\
Provide personalized career advice. Include:
1. Recommended roles
2. Required skills
3. Timeline
4. Next steps";

fn or_na(value: &str) -> &str {
    if value.trim().is_empty() {
        "N/A"
    } else {
        value
    }
}

/// Render retrieved career records. Empty input renders as an empty string.
pub fn format_context_block(records: &[CareerRecord]) -> String {
    if records.is_empty() {
        return String::new();
    }

    let mut block = String::new();
    block.push_str(CONTEXT_HEADER);
    block.push('\n');
    block.push_str(&format!("({} entries)\n\n", records.len()));

    for (idx, record) in records.iter().enumerate() {
        let skills = record.required_skills.join(", ");
        block.push_str(&format!("[{}] {}\n", idx + 1, record.title));
        block.push_str(&format!("    Description: {}\n", or_na(&record.description)));
        block.push_str(&format!("    Required Skills: {}\n", or_na(&skills)));
        block.push_str(&format!("    Learning Timeline: {}\n", or_na(&record.timeline)));
        block.push_str(&format!("    Salary Range: {}\n", or_na(&record.salary_range)));
        block.push_str(&format!("    Job Growth: {}\n\n", or_na(&record.growth_outlook)));
    }

    block
}

/// Build the text of the first user turn.
pub fn build_prompt(question: &str, records: &[CareerRecord]) -> String {
    let mut prompt = String::new();

    let block = format_context_block(records);
    if !block.is_empty() {
        prompt.push_str(&block);
    }

    prompt.push_str(&format!("User Question: \"{}\"\n\n", question.trim()));
    prompt.push_str(ANSWER_INSTRUCTION);

    debug!(
        "Prompt: {} chars, {} context records",
        prompt.len(),
        records.len()
    );
    prompt
}

/// Start a fresh conversation for one advice request.
pub fn build_conversation(
    system_prompt: &str,
    question: &str,
    records: &[CareerRecord],
) -> Conversation {
    Conversation::new(system_prompt, build_prompt(question, records))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, skills: &[&str]) -> CareerRecord {
        CareerRecord {
            title: title.into(),
            required_skills: skills.iter().map(|s| s.to_string()).collect(),
            ..CareerRecord::default()
        }
    }

    #[test]
    fn empty_context_has_no_block() {
        let prompt = build_prompt("How do I become a DBA?", &[]);
        assert!(!prompt.contains(CONTEXT_HEADER));
        assert!(prompt.starts_with("User Question: \"How do I become a DBA?\""));
        assert!(prompt.ends_with(ANSWER_INSTRUCTION));
    }

    #[test]
    fn records_appear_in_input_order_before_question() {
        let records = vec![
            record("Data Scientist", &["Python", "Statistics", "SQL"]),
            record("ML Engineer", &["Python", "MLOps"]),
            record("Data Analyst", &["SQL"]),
        ];
        let prompt = build_prompt("I know Python", &records);

        let first = prompt.find("[1] Data Scientist").unwrap();
        let second = prompt.find("[2] ML Engineer").unwrap();
        let third = prompt.find("[3] Data Analyst").unwrap();
        let question = prompt.find("User Question").unwrap();
        assert!(first < second && second < third && third < question);
        assert!(prompt.contains("(3 entries)"));
        assert!(prompt.contains("    Required Skills: Python, Statistics, SQL\n"));
    }

    #[test]
    fn missing_fields_render_as_na() {
        let block = format_context_block(&[record("Data Scientist", &[])]);
        assert!(block.contains("    Description: N/A\n"));
        assert!(block.contains("    Required Skills: N/A\n"));
        assert!(block.contains("    Job Growth: N/A\n"));
    }

    #[test]
    fn conversation_starts_with_one_user_turn() {
        let conv = build_conversation("sys", "q", &[]);
        assert_eq!(conv.system, "sys");
        assert_eq!(conv.turns.len(), 1);
        assert!(matches!(&conv.turns[0], Turn::User { text } if text.contains("\"q\"")));
    }
}
