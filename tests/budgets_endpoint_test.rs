use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::Arc;
use tempfile::TempDir;
use tower::util::ServiceExt;
use wattwise::api;
use wattwise::config::Config;
use wattwise::db::init_db;
use wattwise::Repository;

struct TestApp {
    app: axum::Router,
    _temp: TempDir,
}

async fn setup_test_app() -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir
        .path()
        .join("test.db")
        .to_string_lossy()
        .to_string();
    let pool = init_db(&db_path).await.expect("init_db failed");
    let repo = Arc::new(Repository::new(pool));

    let config = Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        database_path: db_path,
        seed_defaults: false,
        simulation_seed: Some(11),
        retention_days: 7,
    };

    let state = api::AppState::new(repo, &config);
    TestApp {
        app: api::create_router(state),
        _temp: temp_dir,
    }
}

async fn request(
    app: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_set_user_budget_creates_then_overwrites() {
    let t = setup_test_app().await;

    let (status, _) = request(&t.app, "GET", "/api/budgets/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, created) = request(&t.app, "POST", "/api/budgets/alice?budget=10.5", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["userId"], "alice");
    assert_eq!(created["dailyBudgetKwh"], 10.5);

    let (status, updated) = request(&t.app, "POST", "/api/budgets/alice?budget=8", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["dailyBudgetKwh"], 8.0);

    let (status, fetched) = request(&t.app, "GET", "/api/budgets/alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, updated);
}

#[tokio::test]
async fn test_set_budget_requires_numeric_query() {
    let t = setup_test_app().await;
    let (status, _) = request(&t.app, "POST", "/api/budgets/alice", None).await;
    assert!(status.is_client_error());

    let (status, _) = request(&t.app, "POST", "/api/budgets/alice?budget=lots", None).await;
    assert!(status.is_client_error());

    let (status, _) = request(&t.app, "POST", "/api/budgets/alice?budget=-2", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_replace_budget() {
    let t = setup_test_app().await;
    let (_, created) = request(&t.app, "POST", "/api/budgets/alice?budget=10", None).await;
    let id = created["id"].as_i64().unwrap();

    let (status, replaced) = request(
        &t.app,
        "PUT",
        &format!("/api/budgets/{}", id),
        Some(serde_json::json!({"userId": "alice", "dailyBudgetKwh": 12.0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["id"], id);
    assert_eq!(replaced["dailyBudgetKwh"], 12.0);

    let (status, _) = request(
        &t.app,
        "PUT",
        "/api/budgets/9999",
        Some(serde_json::json!({"userId": "nobody", "dailyBudgetKwh": 1.0})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_replace_budget_into_taken_user_conflicts() {
    let t = setup_test_app().await;
    request(&t.app, "POST", "/api/budgets/alice?budget=10", None).await;
    let (_, bob) = request(&t.app, "POST", "/api/budgets/bob?budget=5", None).await;

    let (status, body) = request(
        &t.app,
        "PUT",
        &format!("/api/budgets/{}", bob["id"]),
        Some(serde_json::json!({"userId": "alice", "dailyBudgetKwh": 5.0})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_delete_budget() {
    let t = setup_test_app().await;
    let (_, created) = request(&t.app, "POST", "/api/budgets/alice?budget=10", None).await;

    let (status, _) = request(
        &t.app,
        "DELETE",
        &format!("/api/budgets/{}", created["id"]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = request(&t.app, "GET", "/api/budgets/alice", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = request(&t.app, "DELETE", "/api/budgets/31337", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
