//! `analyze_skill_gap`: compare a person's skills with a role's requirements.

use super::traits::{string_list, ParamSpec, ParamType, Tool, ToolDescriptor, ToolError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub const NAME: &str = "analyze_skill_gap";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGapReport {
    pub current_skills: Vec<String>,
    pub target_skills: Vec<String>,
    pub transferable_skills: Vec<String>,
    pub skill_gaps: Vec<String>,
    pub gap_count: usize,
    pub difficulty_level: &'static str,
    pub summary: String,
}

/// Two skills overlap when either name contains the other, ignoring case.
fn overlaps(a: &str, b: &str) -> bool {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    a.contains(&b) || b.contains(&a)
}

fn difficulty(gap_count: usize) -> &'static str {
    match gap_count {
        0..=2 => "Easy - Transition",
        3..=4 => "Moderate - Achievable",
        5..=6 => "Challenging - Doable",
        _ => "Very Challenging - Long-term",
    }
}

/// Compute which current skills carry over and which target skills are missing.
pub fn analyze(current: &[String], target: &[String]) -> SkillGapReport {
    let transferable: Vec<String> = current
        .iter()
        .filter(|s| target.iter().any(|t| overlaps(s, t)))
        .cloned()
        .collect();

    let gaps: Vec<String> = target
        .iter()
        .filter(|t| !current.iter().any(|c| overlaps(c, t)))
        .cloned()
        .collect();

    SkillGapReport {
        current_skills: current.to_vec(),
        target_skills: target.to_vec(),
        summary: format!(
            "You have {} transferable skills and need to learn {} new skills.",
            transferable.len(),
            gaps.len()
        ),
        gap_count: gaps.len(),
        difficulty_level: difficulty(gaps.len()),
        transferable_skills: transferable,
        skill_gaps: gaps,
    }
}

pub struct SkillGapTool;

#[async_trait]
impl Tool for SkillGapTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            NAME,
            "Analyze the gap between the user's current skills and the skills a target role requires.",
        )
        .param(
            "current_skills",
            ParamSpec::required(ParamType::Array, "Skills the user already has"),
        )
        .param(
            "target_skills",
            ParamSpec::required(ParamType::Array, "Skills required for the target role"),
        )
    }

    async fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let current = string_list(args, "current_skills");
        let target = string_list(args, "target_skills");
        serde_json::to_value(analyze(&current, &target))
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}
