use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use axum::Router;
use chrono::{Duration, TimeZone, Utc};
use http_body_util::BodyExt;
use serde_json::Value;
use todo_server::{app, ErrorBody, FixedClock, Todo, TodoStore};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn error_message(response: axum::response::Response) -> String {
    body_json::<ErrorBody>(response).await.error
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

async fn send(app: &Router, request: Request<String>) -> axum::response::Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn create(app: &Router, title: &str) -> Todo {
    let body = serde_json::json!({ "title": title }).to_string();
    let resp = send(app, json_request("POST", "/todos", &body)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
}

// --- health / schema ---

#[tokio::test]
async fn health_returns_ok() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("GET", "/health")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({"status": "ok"}));
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("GET", "/openapi.json")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body["openapi"], "3.0.0");
    assert!(body["paths"]["/todos"]["post"].is_object());
}

// --- list ---

#[tokio::test]
async fn list_todos_empty() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("GET", "/todos")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}

#[tokio::test]
async fn list_todos_in_creation_order() {
    let app = app(TodoStore::new());
    create(&app, "A").await;
    create(&app, "B").await;

    let resp = send(&app, empty_request("GET", "/todos")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, ["A", "B"]);
}

// --- create ---

#[tokio::test]
async fn create_todo_returns_201() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"  Buy milk  "}"#)).await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert_eq!(todo.id, 1);
    assert_eq!(todo.title, "Buy milk");
    assert!(!todo.completed);
    assert_eq!(todo.created_at, todo.updated_at);
}

#[tokio::test]
async fn create_todo_ignores_client_completed_flag() {
    let app = app(TodoStore::new());
    let resp = send(
        &app,
        json_request("POST", "/todos", r#"{"title":"Already done","completed":true}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    let todo: Todo = body_json(resp).await;
    assert!(!todo.completed);
}

#[tokio::test]
async fn create_todo_whitespace_title_returns_400() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"  "}"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title must be a non-empty string.");
}

#[tokio::test]
async fn create_todo_missing_title_returns_400() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("POST", "/todos", "{}")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title is required.");
}

#[tokio::test]
async fn create_todo_empty_body_is_missing_title() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("POST", "/todos")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Title is required.");
}

#[tokio::test]
async fn create_todo_malformed_json_returns_400_and_stores_nothing() {
    let store = TodoStore::new();
    let app = app(store.clone());
    let resp = send(&app, json_request("POST", "/todos", r#"{"title":"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid JSON body.");
    assert!(store.is_empty().await);

    // later requests are unaffected
    assert_eq!(create(&app, "after").await.id, 1);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let app = app(TodoStore::new());
    let first = create(&app, "first").await;
    assert_eq!(first.id, 1);

    let resp = send(&app, empty_request("DELETE", "/todos/1")).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    assert_eq!(create(&app, "second").await.id, 2);
}

// --- get ---

#[tokio::test]
async fn get_todo_round_trips() {
    let app = app(TodoStore::new());
    let created = create(&app, "Round trip").await;

    let resp = send(&app, empty_request("GET", &format!("/todos/{}", created.id))).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_todo_not_found() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("GET", "/todos/1")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Todo not found.");
}

#[tokio::test]
async fn get_todo_bad_id_returns_400() {
    let app = app(TodoStore::new());
    for uri in ["/todos/abc", "/todos/0", "/todos/-3", "/todos/1.5"] {
        let resp = send(&app, empty_request("GET", uri)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(error_message(resp).await, "Invalid todo id.");
    }
}

#[tokio::test]
async fn extra_path_segments_are_404() {
    let app = app(TodoStore::new());
    create(&app, "exists").await;

    for uri in ["/todos/1/extra", "/todos/abc/extra"] {
        let resp = send(&app, empty_request("GET", uri)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(error_message(resp).await, "Not Found");
    }
}

// --- update ---

#[tokio::test]
async fn update_todo_not_found() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("PATCH", "/todos/999", r#"{"completed":true}"#)).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(error_message(resp).await, "Todo not found.");
}

#[tokio::test]
async fn update_todo_bad_id_returns_400() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("PATCH", "/todos/abc", r#"{"completed":true}"#)).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_message(resp).await, "Invalid todo id.");
}

#[tokio::test]
async fn update_todo_invalid_bodies_return_400() {
    let app = app(TodoStore::new());
    let created = create(&app, "Keep me").await;
    let uri = format!("/todos/{}", created.id);

    for (body, message) in [
        ("", "Provide a title or completed value to update."),
        ("{}", "Provide a title or completed value to update."),
        (r#"{"completed":"yes"}"#, "Completed must be a boolean."),
        (r#"{"title":""}"#, "Title must be a non-empty string."),
        ("[1,2]", "Request body must be a JSON object."),
        ("{nope", "Invalid JSON body."),
        ("  ", "Invalid JSON body."),
    ] {
        let resp = send(&app, json_request("PATCH", &uri, body)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(error_message(resp).await, message, "{body}");
    }

    let resp = send(&app, empty_request("GET", &uri)).await;
    let unchanged: Todo = body_json(resp).await;
    assert_eq!(unchanged, created);
}

#[tokio::test]
async fn update_completed_keeps_title_and_refreshes_updated_at() {
    let start = Utc.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap();
    let clock = Arc::new(FixedClock::new(start));
    let app = app(TodoStore::with_clock(clock.clone()));
    let created = create(&app, "Walk dog").await;

    clock.advance(Duration::minutes(5));
    let resp = send(
        &app,
        json_request("PATCH", &format!("/todos/{}", created.id), r#"{"completed":true}"#),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Walk dog");
    assert!(updated.completed);
    assert_eq!(updated.created_at, start);
    assert_eq!(updated.updated_at, start + Duration::minutes(5));
}

// --- delete ---

#[tokio::test]
async fn delete_todo_not_found() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("DELETE", "/todos/1")).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_todo_bad_id_returns_400() {
    let app = app(TodoStore::new());
    let resp = send(&app, empty_request("DELETE", "/todos/abc")).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_then_get_is_404() {
    let app = app(TodoStore::new());
    let created = create(&app, "Short lived").await;
    let uri = format!("/todos/{}", created.id);

    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&app, empty_request("GET", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&app, empty_request("DELETE", &uri)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- method / route fallbacks ---

#[tokio::test]
async fn unsupported_method_on_collection_is_405() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("PUT", "/todos", "{}")).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[http::header::ALLOW], "GET, POST");
    assert_eq!(error_message(resp).await, "Method Not Allowed");

    for method in ["HEAD", "OPTIONS", "DELETE"] {
        let resp = send(&app, empty_request(method, "/todos")).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(resp.headers()[http::header::ALLOW], "GET, POST", "{method}");
    }
}

#[tokio::test]
async fn unsupported_method_on_item_is_405() {
    let app = app(TodoStore::new());
    let resp = send(&app, json_request("PUT", "/todos/1", r#"{"title":"x"}"#)).await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(resp.headers()[http::header::ALLOW], "GET, PATCH, DELETE");

    // HEAD never reaches the store lookup, existing todo or not.
    create(&app, "exists").await;
    for uri in ["/todos/1", "/todos/999"] {
        let resp = send(&app, empty_request("HEAD", uri)).await;
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED, "{uri}");
        assert_eq!(resp.headers()[http::header::ALLOW], "GET, PATCH, DELETE", "{uri}");
    }
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let app = app(TodoStore::new());
    for (method, uri) in [("GET", "/"), ("GET", "/nope"), ("POST", "/health"), ("GET", "/todos/")] {
        let resp = send(&app, empty_request(method, uri)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
        assert_eq!(error_message(resp).await, "Not Found");
    }

    // HEAD responses carry no body, so only the status and headers are checked.
    for uri in ["/health", "/openapi.json", "/nope"] {
        let resp = send(&app, empty_request("HEAD", uri)).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "HEAD {uri}");
        assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/json");
    }
}

// --- store injection ---

#[tokio::test]
async fn reset_store_isolates_runs() {
    let store = TodoStore::new();
    let app = app(store.clone());
    create(&app, "A").await;
    create(&app, "B").await;

    store.reset().await;

    let resp = send(&app, empty_request("GET", "/todos")).await;
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
    assert_eq!(create(&app, "C").await.id, 1);
}

// --- full CRUD lifecycle ---

#[tokio::test]
async fn crud_lifecycle() {
    use tower::Service;

    let mut app = app(TodoStore::new()).into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/todos", r#"{"title":"Write tests"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Todo = body_json(resp).await;
    let id = created.id;

    // get
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Todo = body_json(resp).await;
    assert_eq!(fetched, created);

    // update title only
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PATCH",
            &format!("/todos/{id}"),
            r#"{"title":"Write more tests"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Todo = body_json(resp).await;
    assert_eq!(updated.title, "Write more tests");
    assert!(!updated.completed);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/todos/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // list after delete — empty
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/todos"))
        .await
        .unwrap();
    let todos: Vec<Todo> = body_json(resp).await;
    assert!(todos.is_empty());
}
