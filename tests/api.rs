//! HTTP API integration tests

use std::{sync::Arc, time::Duration};

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use timer_keeper::{
    create_router,
    services::{ExportSettings, EXPORT_FILE_NAME},
    state::{AppState, HistoryEntry, TimerStore},
    storage::{FileStore, KeyValueStore},
};

struct TestApp {
    router: Router,
    state: Arc<AppState>,
    export_dir: TempDir,
    data_dir: TempDir,
}

impl TestApp {
    fn new() -> Self {
        let data_dir = TempDir::new().unwrap();
        let export_dir = TempDir::new().unwrap();
        Self::with_dirs(data_dir, export_dir)
    }

    fn with_dirs(data_dir: TempDir, export_dir: TempDir) -> Self {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(data_dir.path()).unwrap());
        let store = Arc::new(TimerStore::open(storage, Duration::from_secs(1)));
        let state = Arc::new(AppState::new(
            store,
            "127.0.0.1".into(),
            20560,
            ExportSettings {
                dir: export_dir.path().to_path_buf(),
                share_command: None,
            },
        ));

        Self {
            router: create_router(Arc::clone(&state)),
            state,
            export_dir,
            data_dir,
        }
    }

    async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn add(&self, name: &str, duration: Value) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/timers",
                Some(json!({ "name": name, "duration": duration, "category": "Study", "halfwayAlert": true })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["timer"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn add_timer_returns_paused_record() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/timers",
            Some(json!({ "name": "Study", "duration": "10", "category": "Study" })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    let timer = &body["timer"];
    assert_eq!(timer["name"], "Study");
    assert_eq!(timer["duration"], 10);
    assert_eq!(timer["remaining"], 10);
    assert_eq!(timer["status"], "Paused");
    assert_eq!(timer["halfwayAlert"], false);
    assert_eq!(timer["progress"], 1.0);

    let (_, list) = app.send(Method::GET, "/timers", None).await;
    assert_eq!(list["count"], 1);
}

#[tokio::test]
async fn invalid_input_is_reported_and_not_committed() {
    let app = TestApp::new();

    for payload in [
        json!({ "name": "", "duration": 10 }),
        json!({ "duration": 10 }),
        json!({ "name": "Study", "duration": "ten" }),
        json!({ "name": "Study", "duration": 0 }),
        json!({ "name": "Study" }),
        json!({ "name": "Study", "duration": 1.5 }),
        json!({ "name": "Study", "duration": true }),
        json!({ "name": "Study", "duration": null }),
        json!({ "name": "Study", "duration": 1e3 }),
        json!({ "name": "Study", "duration": 10, "category": "Nap" }),
        json!("Study"),
    ] {
        let (status, body) = app.send(Method::POST, "/timers", Some(payload.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        assert_eq!(body["status"], "error");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/timers")
                .header("content-type", "application/json")
                .body(Body::from("{\"name\": \"Study\", "))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "error");

    let (_, list) = app.send(Method::GET, "/timers", None).await;
    assert_eq!(list["count"], 0);
}

#[tokio::test]
async fn lifecycle_through_the_api() {
    let app = TestApp::new();
    let id = app.add("Study", json!(4)).await;

    let (status, body) = app.send(Method::POST, &format!("/timers/{id}/start"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timer"]["status"], "Running");

    app.state.store.tick().unwrap();
    let (_, body) = app.send(Method::POST, &format!("/timers/{id}/pause"), None).await;
    assert_eq!(body["timer"]["status"], "Paused");
    assert_eq!(body["timer"]["remaining"], 3);

    app.send(Method::POST, &format!("/timers/{id}/start"), None).await;
    for _ in 0..3 {
        app.state.store.tick().unwrap();
    }

    let (_, completed) = app.send(Method::GET, "/timers/completed", None).await;
    assert_eq!(completed["count"], 1);
    assert_eq!(completed["timers"][0]["remaining"], 0);

    let (_, history) = app.send(Method::GET, "/history", None).await;
    assert_eq!(history["count"], 1);
    assert_eq!(history["entries"][0]["name"], "Study");
    assert!(history["entries"][0]["line"]
        .as_str()
        .unwrap()
        .starts_with("Study completed at "));

    let (_, body) = app.send(Method::POST, &format!("/timers/{id}/reset"), None).await;
    assert_eq!(body["timer"]["status"], "Paused");
    assert_eq!(body["timer"]["remaining"], 4);
}

#[tokio::test]
async fn unknown_or_malformed_ids() {
    let app = TestApp::new();

    let missing = uuid::Uuid::new_v4();
    let (status, body) = app
        .send(Method::POST, &format!("/timers/{missing}/start"), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/timers/not-a-uuid/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_requires_history() {
    let app = TestApp::new();

    let (status, body) = app.send(Method::POST, "/history/export", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No history to export");
    assert!(!app.export_dir.path().join(EXPORT_FILE_NAME).exists());
}

#[tokio::test]
async fn export_writes_history_file() {
    let app = TestApp::new();
    let id = app.add("Stretch", json!("1")).await;
    app.send(Method::POST, &format!("/timers/{id}/start"), None).await;
    app.state.store.tick().unwrap();

    let (status, body) = app.send(Method::POST, "/history/export", None).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["entries"], 1);
    assert_eq!(body["shared"], false);

    let path = app.export_dir.path().join(EXPORT_FILE_NAME);
    let exported: Vec<HistoryEntry> =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(exported, app.state.store.history().unwrap());
}

#[tokio::test]
async fn state_survives_a_restart() {
    let app = TestApp::new();
    let id = app.add("Tea", json!(2)).await;
    app.send(Method::POST, &format!("/timers/{id}/start"), None).await;
    app.state.store.tick().unwrap();

    let TestApp {
        data_dir,
        export_dir,
        ..
    } = app;
    let restarted = TestApp::with_dirs(data_dir, export_dir);

    let (_, list) = restarted.send(Method::GET, "/timers", None).await;
    assert_eq!(list["timers"][0]["id"], id.as_str());
    assert_eq!(list["timers"][0]["remaining"], 1);
    assert_eq!(list["timers"][0]["status"], "Running");
}

#[tokio::test]
async fn status_and_health() {
    let app = TestApp::new();
    let id = app.add("Study", json!(10)).await;
    app.send(Method::POST, &format!("/timers/{id}/start"), None).await;

    let (status, body) = app.send(Method::GET, "/status", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["timers"], 1);
    assert_eq!(body["running"], 1);
    assert_eq!(body["history_entries"], 0);
    assert_eq!(body["last_action"], "start");
    assert_eq!(body["ticker_running"], false);
    assert_eq!(body["errors"], json!([]));

    let (status, body) = app.send(Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
