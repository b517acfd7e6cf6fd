//! Maps `(method, path)` to handlers.
//!
//! # Design
//! - Handlers hold no state of their own; everything lives in the
//!   `TodoStore` passed as router state.
//! - Bodies are taken as raw `Bytes` and run through `validate`, so empty
//!   bodies, malformed JSON and wrong shapes each get their own error.
//! - The body is fully read before any store call, so a bad body can never
//!   leave a half-applied mutation behind.
//! - `/todos` and `/todos/{id}` answer unsupported methods with 405 and an
//!   `Allow` header. Everything else unmatched is a JSON 404, including
//!   extra segments such as `/todos/1/x`.
//! - `get` would also answer HEAD, so every route registers HEAD
//!   explicitly and sends it down the same path as other unsupported methods.

use axum::{
    body::Bytes,
    extract::{rejection::PathRejection, DefaultBodyLimit, Path, State},
    http::{header, HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::Value;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::openapi;
use crate::store::TodoStore;
use crate::types::{Health, Todo, TodoId};
use crate::validate;

const TODOS_ALLOW: &str = "GET, POST";
const TODO_ALLOW: &str = "GET, PATCH, DELETE";

pub fn app(store: TodoStore) -> Router {
    Router::new()
        .route(
            "/health",
            get(health).head(route_not_found).fallback(route_not_found),
        )
        .route(
            "/openapi.json",
            get(openapi_document)
                .head(route_not_found)
                .fallback(route_not_found),
        )
        .route(
            "/todos",
            get(list_todos)
                .post(create_todo)
                .head(todos_method_not_allowed)
                .fallback(todos_method_not_allowed),
        )
        .route(
            "/todos/{id}",
            get(get_todo)
                .patch(update_todo)
                .delete(delete_todo)
                .head(todo_method_not_allowed)
                .fallback(todo_method_not_allowed),
        )
        .fallback(route_not_found)
        .with_state(store)
        .layer(DefaultBodyLimit::disable())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn openapi_document() -> Json<Value> {
    Json(openapi::document())
}

async fn list_todos(State(store): State<TodoStore>) -> Json<Vec<Todo>> {
    Json(store.list().await)
}

async fn create_todo(
    State(store): State<TodoStore>,
    body: Bytes,
) -> Result<(StatusCode, Json<Todo>), ApiError> {
    let input = validate::validate_create(&validate::parse_body(&body)?)?;
    let todo = store.create(input.title).await;
    Ok((StatusCode::CREATED, Json(todo)))
}

async fn get_todo(
    State(store): State<TodoStore>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(id)?;
    store.get(id).await.map(Json).ok_or(ApiError::NotFound)
}

async fn update_todo(
    State(store): State<TodoStore>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> Result<Json<Todo>, ApiError> {
    let id = todo_id(id)?;
    let patch = validate::validate_patch(&validate::parse_body(&body)?)?;
    store.update(id, patch).await.map(Json).ok_or(ApiError::NotFound)
}

async fn delete_todo(
    State(store): State<TodoStore>,
    id: Result<Path<String>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = todo_id(id)?;
    store
        .delete(id)
        .await
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or(ApiError::NotFound)
}

async fn todos_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed { allow: TODOS_ALLOW }
}

async fn todo_method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed { allow: TODO_ALLOW }
}

async fn route_not_found() -> ApiError {
    ApiError::RouteNotFound
}

/// A segment that fails percent-decoding is as invalid as a non-numeric one.
fn todo_id(path: Result<Path<String>, PathRejection>) -> Result<TodoId, ApiError> {
    let Path(segment) = path.map_err(|_| ApiError::InvalidId)?;
    validate::parse_todo_id(&segment)
}
