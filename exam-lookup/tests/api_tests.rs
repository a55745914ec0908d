//! Integration tests for exam-lookup HTTP endpoints
//!
//! Tests cover:
//! - Health endpoint with cohort counts
//! - Identifier queries with non-ASCII digits
//! - Name queries across cohorts with pagination via /api/more
//! - Secret-gated dataset updates
//! - Welcome text and usage statistics

use std::path::PathBuf;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use exam_common::config::TomlConfig;
use exam_lookup::{build_router, AppState, LookupService};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

const SECRET: &str = "s3cret";

/// Test helper: write cohort files and build the app over them
fn setup_app(files: &[(&str, &str)]) -> (TempDir, axum::Router) {
    let dir = tempfile::tempdir().unwrap();
    let mut config = TomlConfig {
        data_dir: dir.path().to_path_buf(),
        update_secret: Some(SECRET.to_string()),
        batch_size: 2,
        ..TomlConfig::default()
    };
    config.cohorts.clear();
    for (key, csv) in files {
        let file = format!("results_{}.csv", key);
        std::fs::write(dir.path().join(&file), csv).unwrap();
        config.cohorts.insert(key.to_string(), PathBuf::from(file));
    }

    let service = LookupService::load(&config).expect("Should load cohorts");
    (dir, build_router(AppState::new(service)))
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn update_request(cohort: &str, secret: &str, csv: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(format!("/api/update/{}", cohort))
        .header("x-update-secret", secret)
        .header("content-type", "text/csv")
        .body(Body::from(csv.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

async fn send(app: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, extract_json(response.into_body()).await)
}

fn texts(reply: &Value) -> Vec<String> {
    reply["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["kind"] == "text")
        .map(|m| m["text"].as_str().unwrap().to_string())
        .collect()
}

fn documents(reply: &Value) -> Vec<&Value> {
    reply["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|m| m["kind"] == "document")
        .collect()
}

const COHORT_2025: &str = "Number,Name,العربي,المجموع\n٠٥١٢٣٤,Ahmad,88,88\n52000,Sara,45,45\n";
const COHORT_2021: &str = "Number,Name,العربي,المجموع\n41000,Ahmed Ali,70,70\n";

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let (status, body) = send(&app, get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "exam-lookup");
    assert_eq!(body["build"]["version"], env!("CARGO_PKG_VERSION"));
    assert!(!body["build"]["revision"].as_str().unwrap().is_empty());
    assert_eq!(body["cohorts"]["configured"], 1);
    assert_eq!(body["cohorts"]["loaded"], 1);
    assert_eq!(body["cohorts"]["records"], 2);
}

#[tokio::test]
async fn test_health_reports_missing_cohort_file() {
    let (dir, _) = setup_app(&[("2025", COHORT_2025)]);
    let mut config = TomlConfig {
        data_dir: dir.path().to_path_buf(),
        ..TomlConfig::default()
    };
    config.cohorts.clear();
    config
        .cohorts
        .insert("2025".to_string(), PathBuf::from("results_2025.csv"));
    config
        .cohorts
        .insert("2024".to_string(), PathBuf::from("missing.csv"));
    let app = build_router(AppState::new(LookupService::load(&config).unwrap()));

    let (status, body) = send(&app, get_request("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["cohorts"]["configured"], 2);
    assert_eq!(body["cohorts"]["loaded"], 1);
}

// =============================================================================
// Queries
// =============================================================================

#[tokio::test]
async fn test_identifier_query_with_arabic_digits() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);

    // Stored as ٠٥١٢٣٤, normalizes to 51234; query has a trailing zero
    let (status, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "512340"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let found = texts(&reply);
    assert_eq!(found.len(), 1);
    assert!(found[0].contains("Ahmad"));
    assert!(found[0].contains("2025"));

    let docs = documents(&reply);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["file_name"], "result_51234.html");
    assert!(docs[0]["content"].as_str().unwrap().contains("Arabic Language"));
}

#[tokio::test]
async fn test_unroutable_identifier_reply() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let (status, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "91234"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(texts(&reply), vec![exam_lookup::vocab::UNROUTABLE.to_string()]);
}

#[tokio::test]
async fn test_empty_query_reply() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let (_, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "   "})),
    )
    .await;
    assert_eq!(texts(&reply), vec![exam_lookup::vocab::EMPTY_QUERY.to_string()]);
}

#[tokio::test]
async fn test_name_query_across_cohorts_then_more() {
    let (_dir, app) = setup_app(&[("2021", COHORT_2021), ("2025", COHORT_2025)]);

    let (_, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "ahm"})),
    )
    .await;

    // Count line, then one result from each cohort
    let texts_first = texts(&reply);
    assert_eq!(texts_first.len(), 3);
    assert!(texts_first[0].contains('2'));
    assert!(texts_first[1].contains("Ahmed Ali"));
    assert!(texts_first[2].contains("Ahmad"));
    assert_eq!(documents(&reply).len(), 2);

    let (_, more) = send(&app, json_request("/api/more", json!({"requester_id": "u1"}))).await;
    assert_eq!(texts(&more), vec![exam_lookup::vocab::NO_MORE_RESULTS.to_string()]);
}

#[tokio::test]
async fn test_more_without_session() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let (_, reply) = send(&app, json_request("/api/more", json!({"requester_id": "u9"}))).await;
    assert_eq!(texts(&reply), vec![exam_lookup::vocab::NOTHING_TO_CONTINUE.to_string()]);
}

#[tokio::test]
async fn test_name_not_found_reply() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let (_, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "zzz"})),
    )
    .await;
    assert_eq!(texts(&reply), vec![exam_lookup::vocab::NAME_NOT_FOUND.to_string()]);
}

// =============================================================================
// Updates
// =============================================================================

#[tokio::test]
async fn test_update_with_wrong_secret_leaves_file_untouched() {
    let (dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let path = dir.path().join("results_2025.csv");
    let before = std::fs::read(&path).unwrap();

    let (status, body) = send(&app, update_request("2025", "wrong", "Number,Name\n59,X\n")).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "UNAUTHORIZED");
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_update_unknown_cohort() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let (status, body) = send(&app, update_request("1999", SECRET, "Number,Name\n1,X\n")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "UNKNOWN_COHORT");
}

#[tokio::test]
async fn test_update_malformed_upload() {
    let (dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let path = dir.path().join("results_2025.csv");
    let before = std::fs::read(&path).unwrap();

    let (status, body) = send(&app, update_request("2025", SECRET, "")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MALFORMED_SOURCE");
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[tokio::test]
async fn test_update_with_unreadable_source_leaves_file_untouched() {
    let (dir, app) = setup_app(&[("2025", COHORT_2025)]);
    let path = dir.path().join("results_2025.csv");
    let corrupt: &[u8] = b"Number,Name\n51,\xff\n";
    std::fs::write(&path, corrupt).unwrap();

    let (status, body) = send(&app, update_request("2025", SECRET, "Number,Name\n52,Omar\n")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "MALFORMED_SOURCE");
    assert_eq!(std::fs::read(&path).unwrap(), corrupt);
}

#[tokio::test]
async fn test_update_reports_collapsed_identifiers() {
    let (_dir, app) = setup_app(&[("2025", "Number,Name\n5100,Ahmad\n52,Sara\n")]);

    let (status, report) = send(&app, update_request("2025", SECRET, "Number,Name\n51,Omar\n")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["total_rows"], 2);
    assert_eq!(report["collapsed"], json!([{"kept": "51", "replaced": "5100"}]));
}

#[tokio::test]
async fn test_update_merges_and_is_searchable() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);

    let upload = "Number,Name,العربي,المجموع\n52000,Sara,75,75\n53000,Omar,90,90\n";
    let (status, report) = send(&app, update_request("2025", SECRET, upload)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["cohort"], "2025");
    assert_eq!(report["rows_received"], 2);
    // Ahmad + updated Sara + Omar
    assert_eq!(report["total_rows"], 3);
    assert_eq!(report["collapsed"], json!([]));

    let (_, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "52"})),
    )
    .await;
    let found = texts(&reply);
    assert!(found[0].contains("Sara"));
    assert!(found[0].contains("75"));

    let (_, reply) = send(
        &app,
        json_request("/api/query", json!({"requester_id": "u1", "text": "53"})),
    )
    .await;
    assert!(texts(&reply)[0].contains("Omar"));
}

// =============================================================================
// Welcome and statistics
// =============================================================================

#[tokio::test]
async fn test_welcome_lists_cohorts() {
    let (_dir, app) = setup_app(&[("2021", COHORT_2021), ("2025", COHORT_2025)]);
    let (status, body) = send(&app, get_request("/api/welcome")).await;

    assert_eq!(status, StatusCode::OK);
    let text = body["text"].as_str().unwrap();
    assert!(text.contains("2021: 1"));
    assert!(text.contains("2025: 2"));
}

#[tokio::test]
async fn test_stats_count_queries_and_users() {
    let (_dir, app) = setup_app(&[("2025", COHORT_2025)]);

    for (user, text) in [("u1", "51234"), ("u1", "ahmad"), ("u2", "sara")] {
        send(
            &app,
            json_request("/api/query", json!({"requester_id": user, "text": text})),
        )
        .await;
    }

    let (status, stats) = send(&app, get_request("/api/stats")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["users"], 2);
    assert_eq!(stats["total_queries"], 3);
}
