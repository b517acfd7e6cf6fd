//! In-memory todo API server.
//!
//! # Overview
//! A REST-over-JSON service exposing CRUD on todo items, a health check and
//! a static OpenAPI document. State lives only in process memory.
//!
//! # Design
//! - `TodoStore` is constructed by the caller and injected into `app`, so
//!   the binary and every test own their own instance.
//! - `validate` turns raw bytes and path segments into typed input or an
//!   `ApiError`; `router` only wires validated input to the store.
//! - `ApiError` is the single error type at the request boundary and renders
//!   as `{"error": "..."}`.

pub mod clock;
pub mod config;
pub mod error;
pub mod observability;
pub mod openapi;
pub mod router;
pub mod store;
pub mod types;
pub mod validate;

use std::future::Future;

use tokio::net::TcpListener;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{ApiError, ErrorBody};
pub use router::app;
pub use store::TodoStore;
pub use types::{Health, NewTodo, Todo, TodoId, TodoPatch};

/// Serve `app(store)` on `listener` until `shutdown` resolves. In-flight
/// requests are allowed to finish.
pub async fn run<F>(listener: TcpListener, store: TodoStore, shutdown: F) -> Result<(), std::io::Error>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app(store))
        .with_graceful_shutdown(shutdown)
        .await
}
