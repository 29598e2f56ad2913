use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use notesapi_engine::{CounterService, IncrementMode, NoWindow, RecordService};
use notesapi_harness::{BarrierWindow, TestDb};
use notesapi_server::{AppState, create_router};
use notesapi_storage::{CounterStore, SqliteStorage};
use serde_json::{Value, json};
use tower::ServiceExt;

type TestResult = Result<(), Box<dyn std::error::Error>>;

struct Reply {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl Reply {
    fn json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

fn app(db: &TestDb, mode: IncrementMode) -> Router {
    create_router(AppState::new(db.counter(mode), db.records()))
}

async fn send(app: &Router, request: Request<Body>) -> Result<Reply, Box<dyn std::error::Error>> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await?.to_bytes().to_vec();
    Ok(Reply { status, headers, body })
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("valid request")
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("valid request")
}

// ============================================================================
// Health and counter
// ============================================================================

#[tokio::test]
async fn health_reports_running() -> TestResult {
    let db = TestDb::new()?;
    let reply = send(&app(&db, IncrementMode::Atomic), get("/health")).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, b"API is running!");
    Ok(())
}

#[tokio::test]
async fn fresh_counter_is_zero_with_no_history() -> TestResult {
    let db = TestDb::new()?;
    let reply = send(&app(&db, IncrementMode::Atomic), get("/counter")).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()?, json!({ "value": 0, "history": [] }));
    Ok(())
}

#[tokio::test]
async fn increment_then_read_back() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);

    let reply = send(&app, post_json("/counter/increment", json!({ "who": "alice" }))).await?;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.json()?, json!({ "value": 1, "who": "alice" }));

    let state = send(&app, get("/counter")).await?.json()?;
    assert_eq!(state["value"], 1);
    assert_eq!(state["history"][0]["who"], "alice");
    assert_eq!(state["history"][0]["value"], 1);
    assert!(state["history"][0]["createdUtc"].is_string());
    Ok(())
}

#[tokio::test]
async fn blank_who_is_a_client_error() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Racy);

    for body in [json!({ "who": "" }), json!({ "who": "   " }), json!({})] {
        let reply = send(&app, post_json("/counter/increment", body)).await?;
        assert_eq!(reply.status, StatusCode::BAD_REQUEST);
        assert!(reply.json()?["error"].is_string());
    }

    assert_eq!(db.storage.read_value()?, 0);
    assert_eq!(db.storage.history_count()?, 0);
    Ok(())
}

#[tokio::test]
async fn null_or_mistyped_who_is_a_client_error() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);

    let reply = send(&app, post_json("/counter/increment", json!({ "who": null }))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert_eq!(reply.json()?, json!({ "error": "who must not be empty" }));

    let reply = send(&app, post_json("/counter/increment", json!({ "who": 5 }))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()?["error"].is_string());

    let malformed = Request::post("/counter/increment")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))?;
    let reply = send(&app, malformed).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    assert!(reply.json()?["error"].is_string());

    assert_eq!(db.storage.read_value()?, 0);
    assert_eq!(db.storage.history_count()?, 0);
    Ok(())
}

#[tokio::test]
async fn history_is_capped_at_twenty() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);
    for i in 0..23 {
        send(&app, post_json("/counter/increment", json!({ "who": format!("w{i}") }))).await?;
    }

    let state = send(&app, get("/counter")).await?.json()?;
    assert_eq!(state["value"], 23);
    let history = state["history"].as_array().ok_or("history is not an array")?;
    assert_eq!(history.len(), 20);
    assert_eq!(history[0]["who"], "w22");
    Ok(())
}

#[tokio::test]
async fn racy_mode_loses_an_update_over_http() -> TestResult {
    let db = TestDb::new()?;
    let counter = db
        .counter(IncrementMode::Racy)
        .with_window(Arc::new(BarrierWindow::new(2)));
    let app = create_router(AppState::new(counter, db.records()));

    let (a, b) = tokio::join!(
        send(&app, post_json("/counter/increment", json!({ "who": "a" }))),
        send(&app, post_json("/counter/increment", json!({ "who": "b" }))),
    );
    assert_eq!(a?.json()?["value"], 1);
    assert_eq!(b?.json()?["value"], 1);

    let state = send(&app, get("/counter")).await?.json()?;
    assert_eq!(state["value"], 1);
    assert_eq!(state["history"].as_array().map(Vec::len), Some(2));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn atomic_mode_counts_every_request() -> TestResult {
    const N: usize = 30;
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);

    let mut tasks = tokio::task::JoinSet::new();
    for i in 0..N {
        let app = app.clone();
        tasks.spawn(async move {
            let request = post_json("/counter/increment", json!({ "who": format!("caller-{i}") }));
            send(&app, request).await.map(|r| r.status).map_err(|e| e.to_string())
        });
    }
    while let Some(joined) = tasks.join_next().await {
        assert_eq!(joined??, StatusCode::OK);
    }

    assert_eq!(db.storage.read_value()?, N as i64);
    assert_eq!(db.storage.history_count()?, N as u64);
    Ok(())
}

#[tokio::test]
async fn unavailable_storage_is_a_problem_response() -> TestResult {
    let dir = tempfile::tempdir()?;
    let storage = Arc::new(SqliteStorage::open(dir.path().join("gone.db"))?);
    let counter = CounterService::new(Arc::clone(&storage)).with_window(Arc::new(NoWindow));
    let app = create_router(AppState::new(counter, RecordService::new(storage)));
    drop(dir);

    for request in [get("/counter"), post_json("/counter/increment", json!({ "who": "x" }))] {
        let reply = send(&app, request).await?;
        assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            reply.headers.get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
            Some(&b"application/problem+json"[..])
        );
        let body = reply.json()?;
        assert_eq!(body["status"], 500);
        assert!(body["detail"].as_str().is_some_and(|d| d.starts_with("Error:")));
    }
    Ok(())
}

// ============================================================================
// Notes, todos, users
// ============================================================================

#[tokio::test]
async fn create_note_returns_location() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);

    let request = post_json("/notes", json!({ "title": "Shopping", "body": "eggs" }));
    let reply = send(&app, request).await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    let created = reply.json()?;
    let id = created["id"].as_i64().ok_or("id is not an integer")?;
    assert_eq!(created["title"], "Shopping");
    assert_eq!(
        reply.headers.get(header::LOCATION).and_then(|v| v.to_str().ok()),
        Some(format!("/notes/{id}").as_str())
    );

    let notes = send(&app, get("/notes")).await?.json()?;
    assert_eq!(notes[0]["body"], "eggs");
    assert!(notes[0]["createdUtc"].is_string());
    Ok(())
}

#[tokio::test]
async fn invalid_note_carries_details() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);

    let reply = send(&app, post_json("/notes", json!({ "title": "", "body": "x" }))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json()?;
    assert_eq!(body["error"], "invalid input");
    assert!(body["details"].is_string());

    let reply = send(&app, post_json("/notes", json!({ "title": null, "body": "x" }))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
    let body = reply.json()?;
    assert_eq!(body["error"], "invalid input");
    assert!(body["details"].is_string());

    assert_eq!(send(&app, get("/notes")).await?.json()?, json!([]));
    Ok(())
}

#[tokio::test]
async fn todos_round_trip() -> TestResult {
    let db = TestDb::new()?;
    let app = app(&db, IncrementMode::Atomic);

    let request = post_json("/todos", json!({ "task": "laundry", "isCompleted": true }));
    let reply = send(&app, request).await?;
    assert_eq!(reply.status, StatusCode::CREATED);
    assert_eq!(reply.json()?["task"], "laundry");

    let reply = send(&app, post_json("/todos", json!({ "task": " " }))).await?;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);

    let todos = send(&app, get("/todos")).await?.json()?;
    assert_eq!(todos.as_array().map(Vec::len), Some(1));
    assert_eq!(todos[0]["isCompleted"], true);
    Ok(())
}

#[tokio::test]
async fn user_endpoints() -> TestResult {
    let db = TestDb::new()?;
    let records = db.records();
    for (email, country) in [
        ("user1@gmail.com", "NO"),
        ("user2@gmail.com", "NO"),
        ("someone@example.com", "SE"),
    ] {
        records.add_user(email, country)?;
    }
    let app = app(&db, IncrementMode::Atomic);

    let all = send(&app, get("/users?skip=1&take=1")).await?.json()?;
    assert_eq!(all.as_array().map(Vec::len), Some(1));
    assert_eq!(all[0]["email"], "user2@gmail.com");

    let exact = send(&app, get("/users/search/email?q=someone%40example.com")).await?.json()?;
    assert_eq!(exact.as_array().map(Vec::len), Some(1));

    let prefix = send(&app, get("/users/search/email-prefix?q=user")).await?.json()?;
    assert_eq!(prefix.as_array().map(Vec::len), Some(2));

    let contains = send(&app, get("/users/search/email-contains?q=gmail")).await?.json()?;
    assert_eq!(contains.as_array().map(Vec::len), Some(2));

    let norway = send(&app, get("/users/country/NO")).await?.json()?;
    assert_eq!(norway.as_array().map(Vec::len), Some(2));

    let stats = send(&app, get("/users/stats")).await?.json()?;
    assert_eq!(stats[0], json!({ "country": "NO", "count": 2 }));

    let missing_q = send(&app, get("/users/search/email")).await?;
    assert_eq!(missing_q.status, StatusCode::BAD_REQUEST);
    Ok(())
}
