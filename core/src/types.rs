//! Domain DTOs shared by the todo server and its clients.
//!
//! # Design
//! The server serializes these exact types, so the wire shape is defined in
//! one place. Field names follow the JSON contract (`_id`, `createdAt`,
//! `updatedAt`, `__v`) through serde renames; Rust code uses snake_case.
//! Every response body is an envelope object, never a bare array.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted todo item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Todo {
    /// Opaque identifier assigned by the store.
    #[serde(rename = "_id")]
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
    /// Optimistic-lock counter maintained by the store. Never interpreted.
    #[serde(rename = "__v", default)]
    pub version: i64,
}

/// Request payload for creating a new todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTodo {
    pub text: String,
}

/// Request payload for replacing the text of an existing todo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTodo {
    pub text: String,
}

/// `GET /todos` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoList {
    pub todos: Vec<Todo>,
}

/// `POST /todos` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoEnvelope {
    pub todo: Todo,
}

/// `PUT` and `DELETE /todos/{id}` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoMessage {
    pub message: String,
    pub todo: Todo,
}

/// Body of every 4xx/5xx response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// `GET /health` response body.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub const OK: &'static str = "ok";
    pub const DB_NOT_READY: &'static str = "db not ready";

    pub fn is_ok(&self) -> bool {
        self.status == Self::OK
    }
}
