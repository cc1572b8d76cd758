//! Router-level tests. Requests that are rejected before touching the
//! database run against a lazily connected pool; the rest use `#[sqlx::test]`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use lost_paws::app::build_router;
use lost_paws::config::{AppEnv, Config};
use lost_paws::state::AppState;
use serde_json::{Value, json};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://lost_paws@localhost/unused".to_string(),
        database_max_connections: 1,
        run_migrations: false,
        request_timeout_secs: 30,
        body_limit_bytes: lost_paws::config::DEFAULT_BODY_LIMIT_BYTES,
        app_env: AppEnv::Development,
        cors_allowed_origins: Vec::new(),
    }
}

fn app_with(pool: PgPool) -> Router {
    build_router(AppState::new(pool), &test_config())
}

fn app_without_db() -> Router {
    let pool = PgPoolOptions::new()
        .connect_lazy(&test_config().database_url)
        .unwrap();
    app_with(pool)
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };

    let response = app.oneshot(req.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn new_animal() -> Value {
    json!({
        "animalProfileId": "5d0c8f5e-6a43-4f0b-b1b4-3c2a0d9e7f10",
        "animalColor": " Orange ",
        "animalDate": "2024-07-04 21:30:00",
        "animalDescription": "Orange tabby, scared of fireworks",
        "animalGender": "Female",
        "animalImageUrl": "https://img.example.com/tabby.jpg",
        "animalLocation": "Old Town plaza",
        "animalName": "MARMALADE",
        "animalSpecies": "Cat",
        "animalStatus": "Lost"
    })
}

#[tokio::test]
async fn health_returns_ok() {
    let (status, body) = send(app_without_db(), Method::GET, "/api/v1/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn responses_carry_request_id_and_security_headers() {
    let response = app_without_db()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert_eq!(response.headers()["cache-control"], "no-store");
}

#[tokio::test]
async fn create_rejects_lowercase_gender() {
    let mut body = new_animal();
    body["animalGender"] = json!("female");

    let (status, body) = send(app_without_db(), Method::POST, "/api/v1/animals", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn create_rejects_overlong_description() {
    let mut body = new_animal();
    body["animalDescription"] = json!("d".repeat(251));

    let (status, body) = send(app_without_db(), Method::POST, "/api/v1/animals", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "OUT_OF_RANGE");
}

#[tokio::test]
async fn create_rejects_date_the_store_cannot_hold() {
    let mut body = new_animal();
    body["animalDate"] = json!("-100000-01-01 00:00:00");

    let (status, body) = send(app_without_db(), Method::POST, "/api/v1/animals", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn malformed_animal_id_is_bad_request() {
    let (status, body) = send(app_without_db(), Method::GET, "/api/v1/animals/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_ID");
}

#[tokio::test]
async fn unknown_search_field_is_bad_request() {
    let (status, body) = send(
        app_without_db(),
        Method::GET,
        "/api/v1/animals/search/animalName/Rex",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "UNKNOWN_SEARCH_FIELD");
}

#[tokio::test]
async fn empty_patch_is_bad_request() {
    let (status, _) = send(
        app_without_db(),
        Method::PATCH,
        "/api/v1/animals/0f9e7c1c-1111-4aaa-8bbb-123456789abc",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
async fn posting_lifecycle(pool: PgPool) {
    let app = app_with(pool);

    let (status, created) = send(app.clone(), Method::POST, "/api/v1/animals", Some(new_animal())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["animalColor"], "Orange");
    assert_eq!(created["animalName"], "Marmalade");
    assert!(created["animalDate"].is_i64());
    let id = created["animalId"].as_str().unwrap().to_string();

    let (status, fetched) = send(app.clone(), Method::GET, &format!("/api/v1/animals/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (status, hits) = send(
        app.clone(),
        Method::GET,
        "/api/v1/animals/search/animalStatus/Lost",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(hits.as_array().unwrap().len(), 1);

    let (status, patched) = send(
        app.clone(),
        Method::PATCH,
        &format!("/api/v1/animals/{id}"),
        Some(json!({ "animalStatus": "Reunited" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["animalStatus"], "Reunited");

    let (_, active) = send(app.clone(), Method::GET, "/api/v1/animals", None).await;
    assert!(active.as_array().unwrap().is_empty());

    let (status, mine) = send(
        app.clone(),
        Method::GET,
        "/api/v1/profiles/5d0c8f5e-6a43-4f0b-b1b4-3c2a0d9e7f10/animals",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(mine.as_array().unwrap().len(), 1);

    let (status, _) = send(app.clone(), Method::DELETE, &format!("/api/v1/animals/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(app.clone(), Method::DELETE, &format!("/api/v1/animals/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(app, Method::GET, &format!("/api/v1/animals/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
async fn duplicate_id_is_a_conflict(pool: PgPool) {
    let app = app_with(pool);
    let mut body = new_animal();
    body["animalId"] = json!("0f9e7c1c-1111-4aaa-8bbb-123456789abc");

    let (status, _) = send(app.clone(), Method::POST, "/api/v1/animals", Some(body.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, err) = send(app, Method::POST, "/api/v1/animals", Some(body)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(err["error"]["code"], "CONFLICT");
}

#[sqlx::test(migrations = "./migrations")]
async fn search_results_are_newest_first(pool: PgPool) {
    let app = app_with(pool);

    for date in ["2024-01-10 08:00:00", "2024-03-01 08:00:00", "2024-02-05 08:00:00"] {
        let mut body = new_animal();
        body["animalDate"] = json!(date);
        let (status, _) = send(app.clone(), Method::POST, "/api/v1/animals", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, hits) = send(app, Method::GET, "/api/v1/animals/search/species/Cat", None).await;
    assert_eq!(status, StatusCode::OK);

    let dates: Vec<i64> = hits
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["animalDate"].as_i64().unwrap())
        .collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates.len(), 3);
    assert_eq!(dates, sorted);
}

#[sqlx::test(migrations = "./migrations")]
async fn replace_of_missing_animal_is_not_found(pool: PgPool) {
    let app = app_with(pool);
    let mut body = new_animal();
    body.as_object_mut().unwrap().remove("animalId");

    let (status, _) = send(
        app,
        Method::PUT,
        "/api/v1/animals/0f9e7c1c-1111-4aaa-8bbb-123456789abc",
        Some(body),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
