//! In-memory todo collection and id allocator.
//!
//! # Design
//! - `TodoStore` is a cheap handle (`Arc` inside) so it can be handed to
//!   axum as router state and kept by tests at the same time.
//! - Entries live in a `BTreeMap` keyed by id. Ids are allocated in
//!   increasing order, so key order equals insertion order.
//! - The id counter only moves forward. Deleting an entry never frees its id;
//!   only `reset` rewinds the counter.
//! - Each operation takes the lock once and does not await while holding
//!   it, so concurrent requests observe mutations one at a time.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::clock::{Clock, SystemClock};
use crate::types::{Todo, TodoId, TodoPatch};

const FIRST_ID: TodoId = 1;

struct Inner {
    todos: BTreeMap<TodoId, Todo>,
    next_id: TodoId,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            todos: BTreeMap::new(),
            next_id: FIRST_ID,
        }
    }
}

#[derive(Clone)]
pub struct TodoStore {
    inner: Arc<RwLock<Inner>>,
    clock: Arc<dyn Clock>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoStore {
    /// An empty store stamping todos with wall-clock time.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner::default())),
            clock,
        }
    }

    /// All todos in insertion order.
    pub async fn list(&self) -> Vec<Todo> {
        self.inner.read().await.todos.values().cloned().collect()
    }

    /// Allocate the next id and insert a fresh, incomplete todo.
    ///
    /// The caller is responsible for passing an already validated title.
    pub async fn create(&self, title: impl Into<String>) -> Todo {
        let mut inner = self.inner.write().await;
        let id = inner.next_id;
        inner.next_id += 1;

        let now = self.clock.now();
        let todo = Todo {
            id,
            title: title.into(),
            completed: false,
            created_at: now,
            updated_at: now,
        };
        inner.todos.insert(id, todo.clone());
        tracing::debug!(id, "todo created");
        todo
    }

    pub async fn get(&self, id: TodoId) -> Option<Todo> {
        self.inner.read().await.todos.get(&id).cloned()
    }

    /// Merge the fields present in `patch` and refresh `updated_at`.
    /// Returns `None` when no todo has this id.
    pub async fn update(&self, id: TodoId, patch: TodoPatch) -> Option<Todo> {
        let mut inner = self.inner.write().await;
        let todo = inner.todos.get_mut(&id)?;
        if let Some(title) = patch.title {
            todo.title = title;
        }
        if let Some(completed) = patch.completed {
            todo.completed = completed;
        }
        todo.updated_at = self.clock.now();
        tracing::debug!(id, completed = todo.completed, "todo updated");
        Some(todo.clone())
    }

    /// Remove a todo, returning it. A second delete of the same id yields `None`.
    pub async fn delete(&self, id: TodoId) -> Option<Todo> {
        let removed = self.inner.write().await.todos.remove(&id);
        if removed.is_some() {
            tracing::debug!(id, "todo deleted");
        }
        removed
    }

    /// Drop every todo and rewind the id counter. Test harnesses only.
    pub async fn reset(&self) {
        *self.inner.write().await = Inner::default();
        tracing::debug!("store reset");
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.todos.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.todos.is_empty()
    }
}
