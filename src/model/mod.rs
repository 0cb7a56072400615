//! Model client interface.
//!
//! The dispatch loop only sees [`ModelClient`]: it hands over the whole
//! conversation plus the tool schemas and gets back either text or a batch
//! of tool invocations. Vendor request/response shapes stay behind the trait.

pub mod inference;

pub use inference::InferenceClient;

use crate::tools::ToolDescriptor;
use crate::types::{Conversation, ModelResponse, TokenUsage};
use async_trait::async_trait;
use thiserror::Error;

/// Any failure talking to the hosted model. Fatal to the current request.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed model response: {0}")]
    Malformed(String),

    #[error("model call timed out after {0}s")]
    Timeout(u64),

    #[error("request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Whether the request was stopped by its caller rather than by a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

#[async_trait]
pub trait ModelClient: Send + Sync {
    /// One round-trip: send the conversation and tool schemas, receive a reply.
    async fn send(
        &self,
        conversation: &Conversation,
        tools: &[ToolDescriptor],
    ) -> Result<ModelResponse, TransportError>;

    /// Model identifier, used for logging.
    fn model_name(&self) -> &str {
        "unknown"
    }

    /// Estimated USD cost of `usage` on this model. Unpriced clients report 0.
    fn estimate_cost(&self, _usage: &TokenUsage) -> f64 {
        0.0
    }
}
