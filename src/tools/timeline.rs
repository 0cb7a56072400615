//! `estimate_learning_timeline`: rough study-time estimate for a skill list.

use super::traits::{string_list, ParamSpec, ParamType, Tool, ToolDescriptor, ToolError};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

pub const NAME: &str = "estimate_learning_timeline";

/// Hours assumed for a skill that is not in the table.
const DEFAULT_SKILL_HOURS: u32 = 100;

/// Approximate study hours per skill (lowercase keys).
const SKILL_HOURS: &[(&str, u32)] = &[
    ("python", 100),
    ("machine learning", 150),
    ("deep learning", 200),
    ("statistics", 80),
    ("sql", 40),
    ("tensorflow", 120),
    ("pytorch", 120),
    ("llms", 100),
    ("transformers", 100),
    ("system design", 150),
    ("mlops", 100),
    ("cloud", 80),
    ("docker", 60),
    ("kubernetes", 120),
    ("data visualization", 60),
    ("pandas", 80),
    ("numpy", 80),
    ("scikit-learn", 90),
    ("spacy", 80),
    ("flask", 60),
    ("django", 100),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillEstimate {
    pub skill: String,
    pub hours_needed: u32,
    pub weeks_needed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEstimate {
    pub hours_per_week: f64,
    pub skills_breakdown: Vec<SkillEstimate>,
    pub total_hours: u32,
    pub total_weeks: u32,
    pub total_months: u32,
    pub realistic_timeline: &'static str,
}

pub fn hours_for(skill: &str) -> u32 {
    let key = skill.trim().to_lowercase();
    SKILL_HOURS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, hours)| *hours)
        .unwrap_or(DEFAULT_SKILL_HOURS)
}

fn weeks(hours: u32, hours_per_week: f64) -> u32 {
    (f64::from(hours) / hours_per_week).ceil() as u32
}

fn realism(months: u32) -> &'static str {
    match months {
        0..=3 => "Very Achievable",
        4..=6 => "Achievable",
        7..=12 => "Challenging but Doable",
        _ => "Long-term Commitment",
    }
}

/// Estimate the timeline for `skills` at `hours_per_week` (must be positive).
pub fn estimate(skills: &[String], hours_per_week: f64) -> TimelineEstimate {
    let breakdown: Vec<SkillEstimate> = skills
        .iter()
        .map(|skill| {
            let hours = hours_for(skill);
            SkillEstimate {
                skill: skill.clone(),
                hours_needed: hours,
                weeks_needed: weeks(hours, hours_per_week),
            }
        })
        .collect();

    let total_hours: u32 = breakdown.iter().map(|e| e.hours_needed).sum();
    let total_weeks = weeks(total_hours, hours_per_week);
    let total_months = total_weeks.div_ceil(4);

    TimelineEstimate {
        hours_per_week,
        skills_breakdown: breakdown,
        total_hours,
        total_weeks,
        total_months,
        realistic_timeline: realism(total_months),
    }
}

pub struct TimelineTool {
    default_hours_per_week: f64,
}

impl TimelineTool {
    pub fn new(default_hours_per_week: f64) -> Self {
        Self {
            default_hours_per_week,
        }
    }
}

impl Default for TimelineTool {
    fn default() -> Self {
        Self::new(10.0)
    }
}

#[async_trait]
impl Tool for TimelineTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(
            NAME,
            "Estimate a realistic timeline to learn a list of skills.",
        )
        .param(
            "skills",
            ParamSpec::required(ParamType::Array, "Skills the user needs to learn"),
        )
        .param(
            "hours_per_week",
            ParamSpec::optional(
                ParamType::Number,
                "Hours per week the user can dedicate. Default: 10",
            ),
        )
    }

    async fn execute(&self, args: &Value) -> Result<Value, ToolError> {
        let skills = string_list(args, "skills");
        let hours_per_week = args
            .get("hours_per_week")
            .and_then(Value::as_f64)
            .unwrap_or(self.default_hours_per_week);

        if !hours_per_week.is_finite() || hours_per_week <= 0.0 {
            return Err(ToolError::InvalidArguments(
                "hours_per_week must be a positive number".into(),
            ));
        }

        serde_json::to_value(estimate(&skills, hours_per_week))
            .map_err(|e| ToolError::Execution(e.to_string()))
    }
}
