mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use career_advisor::careers::import_careers;
use career_advisor::model::{ModelClient, TransportError};
use career_advisor::server::{build_router, AppState};
use career_advisor::state::Database;
use career_advisor::types::ModelResponse;
use common::*;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;

fn app(model: Arc<dyn ModelClient>) -> (Router, Arc<Mutex<Database>>) {
    let db = Database::open_memory().unwrap();
    import_careers(&db, &[data_scientist()]).unwrap();
    let db = Arc::new(Mutex::new(db));
    let state = AppState::new(advisor_with(model, vec![data_scientist()]), db.clone());
    (build_router(state), db)
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn ask(question: &str) -> Request<Body> {
    Request::post("/api/career-advice")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "question": question }).to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_ok() {
    let (router, _) = app(Arc::new(ScriptedModel::default()));
    let (status, body) = send(router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn advice_returns_answer_and_formatted_lines() {
    let model = Arc::new(ScriptedModel::new(vec![ModelResponse::text(
        "## Recommended Roles\n- Data Scientist\n\n**Start with Statistics**",
    )]));
    let (router, db) = app(model);

    let (status, body) = send(router, ask("I know Python, want to become a Data Scientist")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["status"], "done");
    assert_eq!(body["rounds"], 1);
    assert_eq!(body["careers"], json!(["Data Scientist"]));

    let lines = body["lines"].as_array().unwrap();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], json!({ "kind": "heading", "level": 2, "text": "Recommended Roles" }));
    assert_eq!(lines[1]["kind"], "list_item");
    assert_eq!(lines[2]["kind"], "blank");
    assert_eq!(lines[3]["kind"], "emphasis");

    let db = db.lock().await;
    assert_eq!(db.query_count().unwrap(), 1);
    let saved = db.recent_queries(1).unwrap();
    assert_eq!(saved[0].question, "I know Python, want to become a Data Scientist");
}

#[tokio::test]
async fn empty_question_is_rejected() {
    let model = Arc::new(ScriptedModel::default());
    let (router, _) = app(model.clone());

    let (status, body) = send(router, ask("   ")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(model.send_count(), 0);
}

#[tokio::test]
async fn transport_failure_maps_to_bad_gateway() {
    let model = Arc::new(ScriptedModel::default().then_fail(TransportError::Status {
        status: 401,
        body: "invalid api key".into(),
    }));
    let (router, db) = app(model);

    let (status, body) = send(router, ask("Help me")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "MODEL_UNAVAILABLE");
    assert_eq!(db.lock().await.query_count().unwrap(), 0);
}

#[tokio::test]
async fn exhausted_is_not_an_error_status() {
    let (router, db) = app(Arc::new(AlwaysToolModel::default()));

    let (status, body) = send(router, ask("Never ending")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["status"], "exhausted");
    assert_eq!(body["rounds"], 10);
    assert!(body["message"].as_str().unwrap().contains("10 rounds"));

    let saved = db.lock().await.recent_queries(1).unwrap();
    assert_eq!(saved[0].answer, None);
}

#[tokio::test]
async fn stats_and_history() {
    let model = Arc::new(ScriptedModel::new(vec![ModelResponse::text("Learn SQL.")]));
    let (router, _) = app(model);

    let (status, _) = send(router.clone(), ask("What next?")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, stats) = send(router.clone(), get("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["careers"], 1);
    assert_eq!(stats["queries"], 1);
    assert_eq!(stats["tools"], 3);

    let (status, history) = send(router, get("/api/history?limit=5")).await;
    assert_eq!(status, StatusCode::OK);
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["question"], "What next?");
    assert_eq!(entries[0]["status"], "done");
    assert_eq!(entries[0]["answer"], "Learn SQL.");
}
