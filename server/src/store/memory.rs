use async_trait::async_trait;
use bson::oid::ObjectId;
use todo_core::Todo;
use tokio::sync::RwLock;

use super::{next_timestamp, now_millis, parse_id, Readiness, StoreError, TodoStore};

/// In-process store with the same id and timestamp rules as `MongoStore`.
///
/// Starts ready unless built with `disconnected`; while not ready every
/// operation fails with `StoreError::Unavailable`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
    readiness: Readiness,
}

impl MemoryStore {
    pub fn new() -> Self {
        let store = Self::disconnected();
        store.readiness.mark_ready();
        store
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Handle for flipping the connection state from outside.
    pub fn readiness(&self) -> Readiness {
        self.readiness.clone()
    }

    fn ensure_ready(&self) -> Result<(), StoreError> {
        if self.readiness.is_ready() {
            Ok(())
        } else {
            Err(StoreError::Unavailable)
        }
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        self.ensure_ready()?;
        Ok(self.todos.read().await.clone())
    }

    async fn create(&self, text: &str) -> Result<Todo, StoreError> {
        self.ensure_ready()?;
        let now = now_millis();
        let todo = Todo {
            id: ObjectId::new().to_hex(),
            text: text.to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        self.todos.write().await.push(todo.clone());
        Ok(todo)
    }

    async fn update(&self, id: &str, text: &str) -> Result<Option<Todo>, StoreError> {
        self.ensure_ready()?;
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let key = oid.to_hex();
        let mut todos = self.todos.write().await;
        let Some(todo) = todos.iter_mut().find(|t| t.id == key) else {
            return Ok(None);
        };
        todo.text = text.to_string();
        todo.updated_at = next_timestamp(todo.updated_at);
        Ok(Some(todo.clone()))
    }

    async fn delete(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        self.ensure_ready()?;
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let key = oid.to_hex();
        let mut todos = self.todos.write().await;
        let position = todos.iter().position(|t| t.id == key);
        Ok(position.map(|index| todos.remove(index)))
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
