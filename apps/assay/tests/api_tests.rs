//! Integration tests for the HTTP API.
//!
//! Drives the router in-process with axum-test.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use assay::api::{ErrorResponse, HealthResponse, router};
use assay::config::EngineConfig;
use assay::engine::Engine;
use assay::source::SimulatedSource;
use assay_core::{Answerability, DecisionCategory, DecisionResult};
use axum_test::TestServer;
use serde_json::json;
use std::sync::Arc;

fn server() -> TestServer {
    let engine = Engine::new(EngineConfig::default(), Arc::new(SimulatedSource::new()));
    TestServer::new(router(Arc::new(engine))).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = server().get("/health").await;

    response.assert_status_ok();
    let body: HealthResponse = response.json();
    assert_eq!(body.status, "ok");
    assert!(!body.version.is_empty());
}

#[tokio::test]
async fn test_execute_returns_decision() {
    let response = server()
        .post("/execute")
        .json(&json!({ "query": "What is quantum computing?" }))
        .await;

    response.assert_status_ok();
    let result: DecisionResult = response.json();
    assert_eq!(result.query, "What is quantum computing?");
    assert_eq!(result.intent.category, DecisionCategory::Factual);
    assert!(result.confidence > 0.7);
    assert_eq!(result.hypotheses.surviving, 3);
}

#[tokio::test]
async fn test_execute_without_strategies() {
    let response = server()
        .post("/execute")
        .json(&json!({ "query": "Tell me a story" }))
        .await;

    response.assert_status_ok();
    let result: DecisionResult = response.json();
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.metadata.failure_reason.as_deref(), Some("no_strategies"));
}

#[tokio::test]
async fn test_execute_greeting_is_answered_locally() {
    let response = server()
        .post("/execute")
        .json(&json!({ "query": "hello" }))
        .await;

    response.assert_status_ok();
    let result: DecisionResult = response.json();
    assert_eq!(result.confidence, 1.0);
    assert!(result.metadata.failure_reason.is_none());
    assert_eq!(result.metadata.synthesis_method, "local_response");
}

#[tokio::test]
async fn test_execute_rejects_empty_query() {
    let response = server()
        .post("/execute")
        .json(&json!({ "query": "  " }))
        .expect_failure()
        .await;

    response.assert_status_bad_request();
    let body: ErrorResponse = response.json();
    assert_eq!(body.error, "query must not be empty");
}

#[tokio::test]
async fn test_can_answer() {
    let response = server()
        .post("/can-answer")
        .json(&json!({ "query": "What is quantum computing?" }))
        .await;

    response.assert_status_ok();
    let assessment: Answerability = response.json();
    assert!(assessment.answerable);
    assert_eq!(assessment.strategies.len(), 3);
}

#[tokio::test]
async fn test_can_answer_rejects_empty_query() {
    let response = server()
        .post("/can-answer")
        .json(&json!({ "query": "" }))
        .expect_failure()
        .await;

    response.assert_status_bad_request();
}
