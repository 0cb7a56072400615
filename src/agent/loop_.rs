//! Tool dispatch loop: Ask → Act → Observe, bounded.
//!
//! For one advice request the loop:
//! 1. Sends the conversation and tool schemas to the model
//! 2. Stops if the reply is plain text
//! 3. Otherwise runs every requested tool (concurrently), appends one
//!    result per invocation in request order, and goes back to 1
//! 4. Gives up with `Exhausted` once the round cap is reached

use crate::agent::{context, system_prompt};
use crate::careers::CareerSearch;
use crate::model::{ModelClient, TransportError};
use crate::tools::ToolRegistry;
use crate::types::*;
use chrono::Utc;
use futures_util::future::join_all;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Default cap on model round-trips per request.
pub const DEFAULT_MAX_ROUNDS: u32 = 10;

/// Everything a caller learns from one advice request.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceReport {
    pub outcome: AdviceOutcome,
    /// Titles of the career records placed in the prompt.
    pub careers_used: Vec<String>,
    pub usage: TokenUsage,
    /// Estimated USD cost reported by the model client.
    pub cost_usd: f64,
}

impl AdviceReport {
    /// History entry for this request.
    pub fn to_query_record(&self, question: &str) -> QueryRecord {
        QueryRecord {
            id: ulid::Ulid::new().to_string(),
            question: question.to_string(),
            status: self.outcome.status(),
            answer: self.outcome.answer().map(str::to_string),
            rounds: self.outcome.rounds(),
            careers_used: self.careers_used.clone(),
            created_at: Utc::now(),
        }
    }
}

/// The advisor: one model client, one tool registry, one context provider.
///
/// Variants of the advisor (mock jobs, live jobs, no tools) differ only in
/// the registry passed in.
#[derive(Clone)]
pub struct Advisor {
    model: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    careers: Arc<dyn CareerSearch>,
    max_rounds: u32,
}

impl Advisor {
    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: ToolRegistry,
        careers: Arc<dyn CareerSearch>,
    ) -> Self {
        Self {
            model,
            tools,
            careers,
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }

    /// Set the round cap. Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn max_rounds(&self) -> u32 {
        self.max_rounds
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn model_name(&self) -> &str {
        self.model.model_name()
    }

    /// Answer a career question.
    ///
    /// Only transport failures (or cancellation) are errors. Tool failures
    /// are fed back to the model, and running out of rounds is reported as
    /// [`AdviceOutcome::Exhausted`].
    pub async fn get_advice(
        &self,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<AdviceReport, TransportError> {
        info!("Advice request: {}", truncate(question, 80));

        let records = match self.careers.search(question).await {
            Ok(records) => records,
            Err(e) => {
                warn!("Career search failed, continuing without context: {:#}", e);
                Vec::new()
            }
        };

        let schemas = self.tools.list_schemas();
        let system = system_prompt::build_system_prompt(&schemas);
        let mut conversation = context::build_conversation(&system, question, &records);

        let (outcome, usage) = self.run(&mut conversation, cancel).await?;

        let cost = self.model.estimate_cost(&usage);
        info!(
            "Advice {} after {} round(s): {} tokens, ~${:.4}",
            outcome.status(),
            outcome.rounds(),
            usage.total_tokens,
            cost
        );

        Ok(AdviceReport {
            outcome,
            careers_used: records.into_iter().map(|r| r.title).collect(),
            usage,
            cost_usd: cost,
        })
    }

    /// Drive an existing conversation to a final answer or the round cap.
    pub async fn run(
        &self,
        conversation: &mut Conversation,
        cancel: &CancellationToken,
    ) -> Result<(AdviceOutcome, TokenUsage), TransportError> {
        let schemas = self.tools.list_schemas();
        let mut usage = TokenUsage::default();

        for round in 1..=self.max_rounds {
            let response = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                response = self.model.send(conversation, &schemas) => response,
            };

            let response = match response {
                Ok(resp) => resp,
                Err(e) => {
                    error!("[Round {}] Model call failed: {}", round, e);
                    return Err(e);
                }
            };
            usage.add(&response.usage);

            let (preamble, calls) = match response.reply {
                ModelReply::Text { text } => {
                    info!("[Round {}] Final answer: {} chars", round, text.len());
                    conversation.push(Turn::Assistant { text: text.clone() });
                    return Ok((
                        AdviceOutcome::Done {
                            answer: text,
                            rounds: round,
                        },
                        usage,
                    ));
                }
                ModelReply::ToolCalls { preamble, calls } if calls.is_empty() => {
                    // A tool-call reply with no calls is a final answer.
                    let text = preamble.unwrap_or_default();
                    conversation.push(Turn::Assistant { text: text.clone() });
                    return Ok((
                        AdviceOutcome::Done {
                            answer: text,
                            rounds: round,
                        },
                        usage,
                    ));
                }
                ModelReply::ToolCalls { preamble, calls } => (preamble, calls),
            };

            if let Some(text) = preamble {
                conversation.push(Turn::Assistant { text });
            }

            for tc in &calls {
                info!("[Round {}] Tool: {}({})", round, tc.name, tc.arguments);
            }
            conversation.push(Turn::ToolRequests {
                calls: calls.clone(),
            });

            let executions = join_all(calls.iter().map(|tc| async move {
                let mut result = self.tools.invoke(&tc.name, &tc.arguments).await;
                result.tool_call_id = tc.id.clone();
                result
            }));

            let results = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransportError::Cancelled),
                results = executions => results,
            };

            // join_all yields results in input order, so each result lands
            // right where its invocation was requested.
            for result in results {
                if result.success {
                    info!(
                        "[Round {}] Tool result: {} chars",
                        round,
                        result.output.len()
                    );
                } else {
                    warn!("[Round {}] Tool error: {}", round, result.output);
                }
                conversation.push(Turn::ToolResult(result));
            }
        }

        warn!(
            "Round cap of {} reached without a final answer",
            self.max_rounds
        );
        Ok((
            AdviceOutcome::Exhausted {
                rounds: self.max_rounds,
            },
            usage,
        ))
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
