//! Scripted collaborators for exercising the advisor without a network.
#![allow(dead_code)]

use async_trait::async_trait;
use career_advisor::agent::Advisor;
use career_advisor::careers::CareerSearch;
use career_advisor::model::{ModelClient, TransportError};
use career_advisor::tools::{StaticJobCatalog, ToolDescriptor, ToolRegistry};
use career_advisor::types::*;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn data_scientist() -> CareerRecord {
    CareerRecord {
        id: "data-scientist".into(),
        title: "Data Scientist".into(),
        required_skills: strings(&["Python", "Statistics", "SQL"]),
        ..CareerRecord::default()
    }
}

/// What a model saw on one `send`.
#[derive(Debug, Clone)]
pub struct SendSnapshot {
    pub conversation: Conversation,
    pub tool_names: Vec<String>,
    /// Invocation ids with no result at the moment of the call.
    pub unanswered: Vec<String>,
}

/// Replays a fixed list of replies, then fails with `Malformed`.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<ModelResponse, TransportError>>>,
    sends: Mutex<Vec<SendSnapshot>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<ModelResponse>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Ok).collect()),
            sends: Mutex::new(Vec::new()),
        }
    }

    pub fn then_fail(self, err: TransportError) -> Self {
        self.replies.lock().unwrap().push_back(Err(err));
        self
    }

    pub fn sends(&self) -> Vec<SendSnapshot> {
        self.sends.lock().unwrap().clone()
    }

    pub fn send_count(&self) -> usize {
        self.sends.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModel {
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<ModelResponse, TransportError> {
        self.sends.lock().unwrap().push(SendSnapshot {
            conversation: conversation.clone(),
            tool_names: tools.iter().map(|t| t.name.clone()).collect(),
            unanswered: conversation
                .unanswered_calls()
                .into_iter()
                .map(str::to_string)
                .collect(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(TransportError::Malformed("script exhausted".into())))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }

    /// One dollar per thousand tokens.
    fn estimate_cost(&self, usage: &TokenUsage) -> f64 {
        f64::from(usage.total_tokens) / 1000.0
    }
}

/// Requests a timeline estimate on every call and never answers.
#[derive(Default)]
pub struct AlwaysToolModel {
    calls: AtomicU32,
    orphaned_seen: AtomicU32,
}

impl AlwaysToolModel {
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of sends that observed an invocation without a result.
    pub fn orphaned_seen(&self) -> u32 {
        self.orphaned_seen.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for AlwaysToolModel {
    async fn send(
        &self,
        conversation: &Conversation,
        _tools: &[ToolDescriptor],
    ) -> Result<ModelResponse, TransportError> {
        if !conversation.unanswered_calls().is_empty() {
            self.orphaned_seen.fetch_add(1, Ordering::SeqCst);
        }
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(ModelResponse::tool_calls(vec![call(
            &format!("call_{n}"),
            "estimate_learning_timeline",
            json!({ "skills": ["SQL"] }),
        )]))
    }
}

/// Requests a skill-gap analysis until call `fail_on`, which fails.
pub struct FailingModel {
    fail_on: u32,
    calls: AtomicU32,
}

impl FailingModel {
    pub fn new(fail_on: u32) -> Self {
        Self {
            fail_on,
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelClient for FailingModel {
    async fn send(
        &self,
        _conversation: &Conversation,
        _tools: &[ToolDescriptor],
    ) -> Result<ModelResponse, TransportError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n >= self.fail_on {
            return Err(TransportError::Status {
                status: 503,
                body: "upstream unavailable".into(),
            });
        }
        Ok(ModelResponse::tool_calls(vec![call(
            &format!("call_{n}"),
            "analyze_skill_gap",
            json!({ "current_skills": ["Python"], "target_skills": ["SQL"] }),
        )]))
    }
}

/// Returns the same records for every question.
pub struct FixedCareers(pub Vec<CareerRecord>);

#[async_trait]
impl CareerSearch for FixedCareers {
    async fn search(&self, _query: &str) -> anyhow::Result<Vec<CareerRecord>> {
        Ok(self.0.clone())
    }
}

pub struct BrokenCareers;

#[async_trait]
impl CareerSearch for BrokenCareers {
    async fn search(&self, _query: &str) -> anyhow::Result<Vec<CareerRecord>> {
        anyhow::bail!("career store offline")
    }
}

pub fn career_registry() -> ToolRegistry {
    ToolRegistry::career_tools(Arc::new(StaticJobCatalog::sample()), 10.0)
}

pub fn advisor_with(model: Arc<dyn ModelClient>, careers: Vec<CareerRecord>) -> Advisor {
    Advisor::new(model, career_registry(), Arc::new(FixedCareers(careers)))
}
