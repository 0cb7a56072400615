use super::errors::ApiError;
use super::AppState;
use crate::format::format_answer;
use crate::types::{AdviceOutcome, QueryRecord};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

const DEFAULT_HISTORY_LIMIT: usize = 20;
const MAX_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct AdviceRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

/// GET /health
pub async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "career-advisor"
    }))
}

/// POST /api/career-advice
pub async fn career_advice_handler(
    State(state): State<AppState>,
    Json(request): Json<AdviceRequest>,
) -> Result<Json<Value>, ApiError> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(ApiError::Validation("Question required".into()));
    }

    let cancel = state.shutdown.child_token();
    let report = state.advisor.get_advice(question, &cancel).await?;

    {
        let db = state.db.lock().await;
        if let Err(e) = db.save_query(&report.to_query_record(question)) {
            warn!("Failed to record query: {:#}", e);
        }
    }

    let body = match &report.outcome {
        AdviceOutcome::Done { answer, rounds } => json!({
            "success": true,
            "status": report.outcome.status(),
            "answer": answer,
            "lines": format_answer(answer),
            "rounds": rounds,
            "careers": report.careers_used,
        }),
        AdviceOutcome::Exhausted { rounds } => json!({
            "success": false,
            "status": report.outcome.status(),
            "message": format!(
                "Could not complete the advice within {} rounds. Try a more specific question.",
                rounds
            ),
            "rounds": rounds,
            "careers": report.careers_used,
        }),
    };

    info!(
        "Answered career question ({}, {} tokens)",
        report.outcome.status(),
        report.usage.total_tokens
    );
    Ok(Json(body))
}

/// GET /api/stats
pub async fn stats_handler(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let (careers, queries) = {
        let db = state.db.lock().await;
        (db.career_count()?, db.query_count()?)
    };
    Ok(Json(json!({
        "careers": careers,
        "queries": queries,
        "model": state.advisor.model_name(),
        "tools": state.advisor.tools().len(),
    })))
}

/// GET /api/history?limit=N
pub async fn history_handler(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<QueryRecord>>, ApiError> {
    let limit = params
        .limit
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .min(MAX_HISTORY_LIMIT);
    let queries = {
        let db = state.db.lock().await;
        db.recent_queries(limit)?
    };
    Ok(Json(queries))
}
