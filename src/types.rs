//! Shared types used across the career advisor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// One entry in the per-request conversation.
///
/// A conversation is append-only for the lifetime of a single advice request
/// and is dropped once the request finishes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Text authored by the user (the initial prompt).
    User { text: String },
    /// Final or interim free text from the model.
    Assistant { text: String },
    /// The model asked for one or more tools to be run.
    ToolRequests { calls: Vec<ToolCall> },
    /// Output of a single tool run, correlated by invocation id.
    ToolResult(ToolResult),
}

/// System instruction plus the ordered turns of one advice request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub system: String,
    pub turns: Vec<Turn>,
}

impl Conversation {
    pub fn new(system: impl Into<String>, first_user_turn: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            turns: vec![Turn::User {
                text: first_user_turn.into(),
            }],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Invocation ids requested by the model that have no result yet.
    pub fn unanswered_calls(&self) -> Vec<&str> {
        let mut open: Vec<&str> = Vec::new();
        for turn in &self.turns {
            match turn {
                Turn::ToolRequests { calls } => {
                    open.extend(calls.iter().map(|c| c.id.as_str()));
                }
                Turn::ToolResult(result) => {
                    if let Some(pos) = open.iter().position(|id| *id == result.tool_call_id) {
                        open.remove(pos);
                    }
                }
                _ => {}
            }
        }
        open
    }
}

/// A tool call request from the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Result of executing a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub tool_call_id: String,
    /// JSON text handed back to the model verbatim.
    pub output: String,
    pub success: bool,
}

/// What the model produced for one round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelReply {
    Text {
        text: String,
    },
    ToolCalls {
        /// Optional text the model emitted alongside its tool requests.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        preamble: Option<String>,
        calls: Vec<ToolCall>,
    },
}

/// Response from the model client including token accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub reply: ModelReply,
    pub usage: TokenUsage,
}

impl ModelResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            reply: ModelReply::Text { text: text.into() },
            usage: TokenUsage::default(),
        }
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self {
            reply: ModelReply::ToolCalls {
                preamble: None,
                calls,
            },
            usage: TokenUsage::default(),
        }
    }
}

/// Token usage from an inference call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    pub fn add(&mut self, other: &TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

// ---------------------------------------------------------------------------
// Advice outcome
// ---------------------------------------------------------------------------

/// Terminal state of one advice request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdviceOutcome {
    /// The model produced a final answer.
    Done { answer: String, rounds: u32 },
    /// The round-trip cap was hit without a final answer.
    Exhausted { rounds: u32 },
}

impl AdviceOutcome {
    pub fn rounds(&self) -> u32 {
        match self {
            Self::Done { rounds, .. } | Self::Exhausted { rounds } => *rounds,
        }
    }

    pub fn answer(&self) -> Option<&str> {
        match self {
            Self::Done { answer, .. } => Some(answer),
            Self::Exhausted { .. } => None,
        }
    }

    pub fn status(&self) -> AdviceStatus {
        match self {
            Self::Done { .. } => AdviceStatus::Done,
            Self::Exhausted { .. } => AdviceStatus::Exhausted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceStatus {
    Done,
    Exhausted,
}

impl fmt::Display for AdviceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Done => write!(f, "done"),
            Self::Exhausted => write!(f, "exhausted"),
        }
    }
}

impl std::str::FromStr for AdviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "done" => Ok(Self::Done),
            "exhausted" => Ok(Self::Exhausted),
            other => Err(format!("unknown advice status: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Career records
// ---------------------------------------------------------------------------

/// A retrieved career entry used to ground the model's answer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CareerRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub timeline: String,
    pub salary_range: String,
    #[serde(alias = "jobGrowth")]
    pub growth_outlook: String,
    pub common_transitions: Vec<String>,
}

/// File format accepted by `import-careers`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CareerCatalogFile {
    #[serde(default)]
    pub careers: Vec<CareerRecord>,
}

// ---------------------------------------------------------------------------
// Query history
// ---------------------------------------------------------------------------

/// A recorded advice request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub question: String,
    pub status: AdviceStatus,
    pub answer: Option<String>,
    pub rounds: u32,
    pub careers_used: Vec<String>,
    pub created_at: DateTime<Utc>,
}
