use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use chrono::NaiveDate;
use clap::Parser;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use birthday_manager::config::Cli;
use birthday_manager::domain::{hash_password, FixedClock};
use birthday_manager::storage::{DbConnection, InMemoryStore, KeyValueStore};
use birthday_manager::{create_router, AppConfig, AppState};

const PASSWORD: &str = "let-me-in";

fn config(database_url: &str) -> AppConfig {
    let hash = hash_password(PASSWORD);
    let cli = Cli::try_parse_from([
        "birthday-manager",
        "--admin-password-hash",
        hash.as_str(),
        "--session-secret",
        "integration-test-secret-0123456789abcdef",
        "--database-url",
        database_url,
        "--timezone",
        "Asia/Shanghai",
    ])
    .unwrap();
    AppConfig::from_args(cli.server).unwrap()
}

fn app_on(store: Arc<dyn KeyValueStore>, date: NaiveDate) -> Router {
    let config = config("memory");
    let state = AppState::new(store, Arc::new(FixedClock::on(date)), &config);
    create_router(state, &config)
}

fn request(method: Method, uri: &str, cookie: Option<&str>, body: Body) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(body).unwrap()
}

fn json_body(value: Value) -> Body {
    Body::from(value.to_string())
}

async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(body.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

async fn login(app: &Router) -> String {
    let login = Request::builder()
        .method(Method::POST)
        .uri("/api/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(json!({ "password": PASSWORD })))
        .unwrap();
    let response = send(app, login).await;
    assert_eq!(response.status(), StatusCode::OK);

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_admin_and_public_flow() {
    // Mid-Autumn 2024: solar 09-17, lunar 8/15
    let app = app_on(Arc::new(InMemoryStore::new()), NaiveDate::from_ymd_opt(2024, 9, 17).unwrap());

    let response = send(&app, request(Method::GET, "/api/birthdays", None, Body::empty())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login(&app).await;
    let cookie = Some(cookie.as_str());

    let text = "Alice-1990-9-17-a-Sales\nBob-8-15-b-Ops\nCarol-12-1-a-Sales\nDave-1985-3-3-b";
    let response = send(&app, request(Method::PUT, "/api/birthdays", cookie, Body::from(text))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request(Method::GET, "/api/departments", cookie, Body::empty())).await;
    assert_eq!(
        body_json(response).await,
        json!({ "departments": [
            { "name": "Sales", "count": 2 },
            { "name": "Ops", "count": 1 }
        ]})
    );

    let response = send(&app, request(Method::GET, "/api/today", cookie, Body::empty())).await;
    let today = body_json(response).await;
    assert_eq!(today["date"], "2024-09-17");
    assert_eq!(today["lunar"], json!({ "year": 2024, "month": 8, "day": 15, "isLeap": false }));
    assert_eq!(
        today["today"],
        json!([
            { "name": "Alice", "type": "a", "department": "Sales", "isLunar": false },
            { "name": "Bob", "type": "b", "department": "Ops", "isLunar": true }
        ])
    );

    // Export is closed until a key exists
    let response = send(&app, request(Method::GET, "/api/public/birthdays?m=abcdEFGH12345678", None, Body::empty())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let generate = Request::builder()
        .method(Method::POST)
        .uri("/api/api-key")
        .header(header::COOKIE, cookie.unwrap())
        .header(header::CONTENT_TYPE, "application/json")
        .body(json_body(json!({})))
        .unwrap();
    let generated = body_json(send(&app, generate).await).await;
    let endpoint = generated["endpoint"].as_str().unwrap().to_string();
    assert!(endpoint.starts_with("/api/public/birthdays?m="));

    let response = send(&app, request(Method::GET, &endpoint, None, Body::empty())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CACHE_CONTROL], "no-cache");
    assert_eq!(body_text(response).await, text);

    let response = send(&app, request(Method::DELETE, "/api/departments?name=Sales", cookie, Body::empty())).await;
    assert_eq!(body_json(response).await, json!({ "success": true, "removed": 2 }));

    let response = send(&app, request(Method::GET, &endpoint, None, Body::empty())).await;
    assert_eq!(body_text(response).await, "Bob-8-15-b-Ops\nDave-1985-3-3-b");

    let response = send(&app, request(Method::DELETE, "/api/api-key", cookie, Body::empty())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, request(Method::GET, &endpoint, None, Body::empty())).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let logout = send(&app, request(Method::DELETE, "/api/login", cookie, Body::empty())).await;
    assert_eq!(logout.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_data_survives_restart_with_sqlite() {
    let dir = tempfile::TempDir::new().unwrap();
    let url = format!("sqlite://{}", dir.path().join("birthdays.db").display());
    let date = NaiveDate::from_ymd_opt(2024, 5, 20).unwrap();

    {
        let store = Arc::new(DbConnection::new(&url).await.unwrap());
        let app = app_on(store, date);
        let cookie = login(&app).await;

        let response = send(
            &app,
            request(Method::PUT, "/api/birthdays", Some(&cookie), Body::from("Alice-5-20-a")),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let store = Arc::new(DbConnection::new(&url).await.unwrap());
    let app = app_on(store, date);
    let cookie = login(&app).await;

    let response = send(&app, request(Method::GET, "/api/today", Some(&cookie), Body::empty())).await;
    let today = body_json(response).await;
    assert_eq!(today["today"][0]["name"], "Alice");
}
