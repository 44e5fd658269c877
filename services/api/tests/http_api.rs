//! End-to-end tests of the HTTP router against an in-memory database and a
//! scripted summarizer.

use api_lib::{
    adapters::DbAdapter,
    config::Config,
    web::{self, state::AppState},
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use saily_core::ports::{PortError, PortResult, SummarizationService};
use serde_json::{json, Value};
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use tower::ServiceExt;

/// Summarizer that records its input and answers with a fixed result.
struct StubSummarizer {
    calls: AtomicUsize,
    last_tasks: Mutex<Vec<String>>,
    reply: Option<String>,
}

impl StubSummarizer {
    fn answering(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_tasks: Mutex::new(Vec::new()),
            reply: Some(reply.to_string()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_tasks: Mutex::new(Vec::new()),
            reply: None,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SummarizationService for StubSummarizer {
    async fn summarize_tasks(&self, tasks: &[String]) -> PortResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_tasks.lock().unwrap() = tasks.to_vec();
        self.reply
            .clone()
            .ok_or_else(|| PortError::Unexpected("upstream returned 503".into()))
    }
}

async fn app(summarizer: Arc<StubSummarizer>) -> Router {
    let config = Config::from_lookup(|key| match key {
        "DATABASE_URL" => Some("sqlite::memory:".to_string()),
        "TIME_ZONE" => Some("UTC".to_string()),
        _ => None,
    })
    .unwrap();
    let db = DbAdapter::connect(&config.database_url, 1).await.unwrap();
    db.run_migrations().await.unwrap();
    let state = AppState::with_database(Arc::new(db), summarizer, Arc::new(config));
    web::router(Arc::new(state))
}

fn request(method: Method, uri: &str, user: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user);
    }
    match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, req).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn summarize_returns_generated_text() {
    let summarizer = StubSummarizer::answering("Reviewed the quarterly report.");
    let app = app(summarizer.clone()).await;

    let (status, body) = send_json(
        &app,
        request(
            Method::POST,
            "/summarize",
            None,
            Some(json!({ "tasks": ["review report", "email team"] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "summary": "Reviewed the quarterly report." }));
    assert_eq!(summarizer.calls(), 1);
    assert_eq!(
        *summarizer.last_tasks.lock().unwrap(),
        vec!["review report".to_string(), "email team".to_string()]
    );
}

#[tokio::test]
async fn summarize_rejects_other_methods_without_calling_upstream() {
    let summarizer = StubSummarizer::answering("unused");
    let app = app(summarizer.clone()).await;

    for method in [Method::GET, Method::PUT, Method::DELETE] {
        let (status, body) = send(&app, request(method, "/summarize", None, None)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body, b"Method Not Allowed");
    }
    assert_eq!(summarizer.calls(), 0);
}

#[tokio::test]
async fn summarize_rejects_bad_shapes_without_calling_upstream() {
    let summarizer = StubSummarizer::answering("unused");
    let app = app(summarizer.clone()).await;

    for body in [
        json!({ "tasks": "write tests" }),
        json!({ "items": ["write tests"] }),
        json!({ "tasks": [1, 2] }),
    ] {
        let (status, _) = send(&app, request(Method::POST, "/summarize", None, Some(body))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
    assert_eq!(summarizer.calls(), 0);
}

#[tokio::test]
async fn summarize_maps_upstream_failure_to_500() {
    let summarizer = StubSummarizer::failing();
    let app = app(summarizer.clone()).await;

    let (status, body) = send(
        &app,
        request(
            Method::POST,
            "/summarize",
            None,
            Some(json!({ "tasks": ["one"] })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, b"Failed to summarize tasks.");
    assert_eq!(summarizer.calls(), 1);
}

#[tokio::test]
async fn protected_routes_require_the_user_header() {
    let app = app(StubSummarizer::answering("unused")).await;

    let (status, _) = send(&app, request(Method::GET, "/groups", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, request(Method::GET, "/groups", Some("  "), None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, request(Method::GET, "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn groups_are_sorted_and_scoped_to_the_caller() {
    let app = app(StubSummarizer::answering("unused")).await;

    for name in ["Writing", "Admin"] {
        let (status, _) = send(
            &app,
            request(Method::POST, "/groups", Some("alice"), Some(json!({ "name": name }))),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }
    send(
        &app,
        request(Method::POST, "/groups", Some("bob"), Some(json!({ "name": "Bob's" }))),
    )
    .await;

    let (status, body) = send_json(&app, request(Method::GET, "/groups", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Admin", "Writing"]);

    let (status, _) = send(
        &app,
        request(Method::POST, "/groups", Some("alice"), Some(json!({ "name": "   " }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn time_entry_lifecycle_feeds_history_and_generated_summaries() {
    let summarizer = StubSummarizer::answering("Drafted the chapter.");
    let app = app(summarizer.clone()).await;

    let (_, created) = send_json(
        &app,
        request(Method::POST, "/groups", Some("alice"), Some(json!({ "name": "Writing" }))),
    )
    .await;
    let group_id = created["id"].as_str().unwrap().to_string();

    let (status, started) = send_json(
        &app,
        request(
            Method::POST,
            "/times",
            Some("alice"),
            Some(json!({
                "group_id": group_id,
                "date": "2025-03-10",
                "start_time": "2025-03-10T09:00:00Z"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let entry_id = started["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            Method::PUT,
            &format!("/times/{}", entry_id),
            Some("alice"),
            Some(json!({
                "description": "draft chapter",
                "start_time": "2025-03-10T09:00:00Z",
                "end_time": "2025-03-10T10:30:00Z"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Another user cannot touch the entry.
    let (status, _) = send(
        &app,
        request(Method::DELETE, &format!("/times/{}", entry_id), Some("bob"), None),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, day) = send_json(
        &app,
        request(Method::GET, "/times?date=2025-03-10", Some("alice"), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(day.as_array().unwrap().len(), 1);
    assert_eq!(day[0]["duration_minutes"], json!(90));

    let (status, history) = send_json(
        &app,
        request(
            Method::GET,
            "/history?start=2025-03-01&end=2025-03-31",
            Some("alice"),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(history[0]["day"], json!("2025-03-10"));
    assert_eq!(history[0]["total_minutes"], json!(90));
    assert_eq!(history[0]["groups"][0]["group_name"], json!("Writing"));

    let (status, summary) = send_json(
        &app,
        request(
            Method::POST,
            "/summaries/generate",
            Some("alice"),
            Some(json!({ "start_date": "2025-03-10", "end_date": "2025-03-10" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(summary["summary"], json!("Drafted the chapter."));
    assert_eq!(summary["range_label"], json!("Mar 10, 2025"));
    assert_eq!(
        *summarizer.last_tasks.lock().unwrap(),
        vec!["[Writing] draft chapter (1h 30m)".to_string()]
    );

    let (_, listed) = send_json(&app, request(Method::GET, "/summaries", Some("alice"), None)).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn generating_a_summary_for_an_empty_range_is_rejected() {
    let summarizer = StubSummarizer::answering("unused");
    let app = app(summarizer.clone()).await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/summaries/generate",
            Some("alice"),
            Some(json!({ "start_date": "2025-03-01", "end_date": "2025-03-07" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(summarizer.calls(), 0);
}

#[tokio::test]
async fn settings_are_created_then_patched() {
    let app = app(StubSummarizer::answering("unused")).await;

    let (status, _) = send(&app, request(Method::GET, "/settings", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(Method::PATCH, "/settings", Some("alice"), Some(json!({ "theme": "dark" }))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        request(Method::POST, "/settings", Some("alice"), Some(json!({ "theme": "light" }))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        request(Method::PATCH, "/settings", Some("alice"), Some(json!({ "theme": "neon" }))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    send(
        &app,
        request(Method::PATCH, "/settings", Some("alice"), Some(json!({ "theme": "dark" }))),
    )
    .await;
    let (status, body) = send_json(&app, request(Method::GET, "/settings", Some("alice"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["theme"], json!("dark"));
}

#[tokio::test]
async fn word_of_the_day_is_404_until_one_is_stored() {
    let app = app(StubSummarizer::answering("unused")).await;
    let (status, _) = send(&app, request(Method::GET, "/word-of-the-day", None, None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn create_group(app: &Router, user: &str, name: &str) -> String {
    let (status, body) = send_json(
        app,
        request(Method::POST, "/groups", Some(user), Some(json!({ "name": name }))),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn start_day_must_match_the_start_time() {
    let app = app(StubSummarizer::answering("unused")).await;
    let group_id = create_group(&app, "alice", "Writing").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/times",
            Some("alice"),
            Some(json!({
                "group_id": group_id,
                "date": "2025-03-10",
                "start_time": "2025-06-01T09:00:00Z"
            })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, day) = send_json(
        &app,
        request(Method::GET, "/times?date=2025-03-10", Some("alice"), None),
    )
    .await;
    assert!(day.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn start_on_a_past_day_uses_the_current_time_of_day() {
    let app = app(StubSummarizer::answering("unused")).await;
    let group_id = create_group(&app, "alice", "Writing").await;

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            "/times",
            Some("alice"),
            Some(json!({ "group_id": group_id, "date": "2025-03-10" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, day) = send_json(
        &app,
        request(Method::GET, "/times?date=2025-03-10", Some("alice"), None),
    )
    .await;
    assert_eq!(day.as_array().unwrap().len(), 1);
    assert_eq!(day[0]["start_date"], json!("2025-03-10"));
    assert!(day[0]["start_time"].as_str().unwrap().starts_with("2025-03-10T"));
}

#[tokio::test]
async fn sessions_cannot_be_started_in_someone_elses_group() {
    let app = app(StubSummarizer::answering("unused")).await;
    let alices_group = create_group(&app, "alice", "Writing").await;

    for group_id in [alices_group, uuid::Uuid::nil().to_string()] {
        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/times",
                Some("bob"),
                Some(json!({ "group_id": group_id, "start_time": "2025-03-10T09:00:00Z" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let (_, day) = send_json(
        &app,
        request(Method::GET, "/times?date=2025-03-10", Some("bob"), None),
    )
    .await;
    assert!(day.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ending_before_the_start_is_rejected() {
    let app = app(StubSummarizer::answering("unused")).await;
    let group_id = create_group(&app, "alice", "Writing").await;
    let (_, started) = send_json(
        &app,
        request(
            Method::POST,
            "/times",
            Some("alice"),
            Some(json!({ "group_id": group_id, "start_time": "2025-06-01T09:00:00Z" })),
        ),
    )
    .await;
    let entry_id = started["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/times/{}/end", entry_id),
            Some("alice"),
            Some(json!({ "end_time": "2025-01-01T00:00:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, day) = send_json(
        &app,
        request(Method::GET, "/times?date=2025-06-01", Some("alice"), None),
    )
    .await;
    assert_eq!(day[0]["end_time"], Value::Null);

    let (status, _) = send(
        &app,
        request(
            Method::POST,
            &format!("/times/{}/end", entry_id),
            Some("alice"),
            Some(json!({ "end_time": "2025-06-01T10:15:00Z" })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, day) = send_json(
        &app,
        request(Method::GET, "/times?date=2025-06-01", Some("alice"), None),
    )
    .await;
    assert_eq!(day[0]["duration_minutes"], json!(75));
}
