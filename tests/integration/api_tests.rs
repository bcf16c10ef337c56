//! API integration tests

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use bookshelf_server::{
    api,
    config::DatabaseConfig,
    repository,
    services::Services,
    AppState,
};

struct TestApp {
    base_url: String,
    client: Client,
    author_id: i64,
    _dir: Option<TempDir>,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn create(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/books"))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Serve the router on an ephemeral port over the given store
async fn spawn_app(database: DatabaseConfig, dir: Option<TempDir>) -> TestApp {
    let store = repository::connect(&database)
        .await
        .expect("Failed to connect to database");
    store.ensure_schema().await.expect("Failed to create tables");
    store
        .seed_authors(&["J. R. R. Tolkien".to_string()])
        .await
        .expect("Failed to seed authors");

    let state = AppState {
        services: Arc::new(Services::new(store)),
    };
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: Client::new(),
        author_id: 1,
        _dir: dir,
    }
}

async fn spawn_sqlite_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let database = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("books.db").display()),
        ..Default::default()
    };
    spawn_app(database, Some(dir)).await
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_sqlite_app().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");

    let response = app.get("/ready").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_hobbit_scenario() {
    let app = spawn_sqlite_app().await;
    let hobbit = json!({
        "id": 1,
        "title": "The Hobbit",
        "author_id": 1,
        "published": 1937
    });

    let response = app
        .create(json!({ "title": "The Hobbit", "author_id": 1, "published": 1937 }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, hobbit);

    let response = app.get("/books/1").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, hobbit);

    let response = app
        .client
        .delete(app.url("/books/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    let response = app.get("/books/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "NotFound");
}

#[tokio::test]
async fn test_create_then_get_ignores_payload_id() {
    let app = spawn_sqlite_app().await;

    let response = app
        .create(json!({
            "id": 500,
            "title": "The Silmarillion",
            "author_id": app.author_id,
            "published": 1977
        }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().expect("No book ID");
    assert_ne!(id, 500);

    let fetched: Value = app.get(&format!("/books/{}", id)).await.json().await.unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched["title"], "The Silmarillion");
    assert_eq!(fetched["author_id"], app.author_id);
    assert_eq!(fetched["published"], 1977);
}

#[tokio::test]
async fn test_list_contains_each_created_book_once() {
    let app = spawn_sqlite_app().await;

    let response = app.get("/books").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!([]));

    let mut ids = Vec::new();
    for title in ["The Hobbit", "The Fellowship of the Ring", "The Two Towers"] {
        let created: Value = app
            .create(json!({ "title": title, "author_id": app.author_id, "published": 1954 }))
            .await
            .json()
            .await
            .unwrap();
        ids.push(created["id"].as_i64().unwrap());
    }

    let books: Vec<Value> = app.get("/books").await.json().await.unwrap();
    assert!(books.len() >= ids.len());
    for id in ids {
        let matches = books.iter().filter(|b| b["id"].as_i64() == Some(id)).count();
        assert_eq!(matches, 1, "book {} listed {} times", id, matches);
    }
}

#[tokio::test]
async fn test_update_replaces_fields_and_echoes_body() {
    let app = spawn_sqlite_app().await;

    let created: Value = app
        .create(json!({ "title": "Hobbit", "author_id": app.author_id, "published": 1936 }))
        .await
        .json()
        .await
        .unwrap();
    let id = created["id"].as_i64().unwrap();

    let response = app
        .client
        .put(app.url(&format!("/books/{}", id)))
        .json(&json!({ "title": "The Hobbit", "author_id": app.author_id, "published": 1937 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let echoed: Value = response.json().await.unwrap();
    // The response is the submitted body: its id defaults to 0, not the path id
    assert_eq!(echoed["id"], 0);
    assert_eq!(echoed["title"], "The Hobbit");

    let fetched: Value = app.get(&format!("/books/{}", id)).await.json().await.unwrap();
    assert_eq!(fetched["id"], id);
    assert_eq!(fetched["title"], "The Hobbit");
    assert_eq!(fetched["published"], 1937);
}

#[tokio::test]
async fn test_unknown_author_is_rejected() {
    let app = spawn_sqlite_app().await;

    let response = app
        .create(json!({ "title": "Orphan", "author_id": 9999, "published": 2000 }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "ConstraintViolation");

    // A missing author_id decodes to 0, which references no author
    let response = app.create(json!({ "title": "Anonymous" })).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let books: Vec<Value> = app.get("/books").await.json().await.unwrap();
    assert!(books.is_empty());
}

#[tokio::test]
async fn test_bad_requests_keep_server_alive() {
    let app = spawn_sqlite_app().await;

    let response = app.get("/books/not-a-number").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "InvalidInput");

    let response = app
        .client
        .post(app.url("/books"))
        .header("content-type", "application/json")
        .body("{\"title\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .client
        .put(app.url("/books/1"))
        .json(&json!({ "title": 12 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/books/42").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(app.get("/health").await.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_delete_missing_book_is_no_content() {
    let app = spawn_sqlite_app().await;

    let response = app
        .client
        .delete(app.url("/books/77"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_openapi_document() {
    let app = spawn_sqlite_app().await;

    let response = app.get("/api-docs/openapi.json").await;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert!(body["paths"]["/books/{id}"].is_object());
}

#[tokio::test]
async fn test_body_decoded_without_content_type() {
    let app = spawn_sqlite_app().await;

    let response = app
        .client
        .post(app.url("/books"))
        .body(r#"{"title":"The Hobbit","author_id":1,"published":1937}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await.unwrap();
    assert_eq!(created["id"], 1);
    assert_eq!(created["title"], "The Hobbit");

    let response = app
        .client
        .put(app.url("/books/1"))
        .header("content-type", "text/plain")
        .body(r#"{"id":1,"title":"The Hobbit","author_id":1,"published":1951}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fetched: Value = app.get("/books/1").await.json().await.unwrap();
    assert_eq!(fetched["published"], 1951);

    // Malformed bodies are still rejected
    let response = app
        .client
        .post(app.url("/books"))
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore] // Run with: DATABASE_URL=postgres://... cargo test -- --ignored
async fn test_postgres_book_lifecycle() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let mut app = spawn_app(
        DatabaseConfig {
            url: url.clone(),
            ..Default::default()
        },
        None,
    )
    .await;

    // Authors may predate this run
    let pool = sqlx::PgPool::connect(&url).await.unwrap();
    let author_id: i32 = sqlx::query_scalar("INSERT INTO authors (name) VALUES ($1) RETURNING id")
        .bind("Mary Shelley")
        .fetch_one(&pool)
        .await
        .unwrap();
    app.author_id = author_id as i64;

    let response = app
        .create(json!({ "title": "Frankenstein", "author_id": app.author_id }))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let created: Value = response.json().await.unwrap();
    let id = created["id"].as_i64().unwrap();
    // The basic schema has no publication year
    assert!(created.get("published").is_none());

    let fetched: Value = app.get(&format!("/books/{}", id)).await.json().await.unwrap();
    assert_eq!(fetched, created);

    let response = app
        .create(json!({ "title": "Orphan", "author_id": -1 }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .client
        .delete(app.url(&format!("/books/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(
        app.get(&format!("/books/{}", id)).await.status(),
        StatusCode::NOT_FOUND
    );
}
