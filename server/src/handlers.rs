//! HTTP handlers for the todo routes.
//!
//! Every handler follows the same path: validate, delegate to the store,
//! then map the outcome onto a status code. Storage faults are logged with
//! the underlying error and answered with a fixed per-route message; the
//! response never carries fault detail.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;
use todo_core::{
    validate_todo, ErrorBody, HealthStatus, TodoEnvelope, TodoInput, TodoList, TodoMessage,
    ValidationError,
};
use tracing::{debug, error};

use crate::body::TodoBody;
use crate::openapi;
use crate::store::{SharedStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
}

#[derive(Debug)]
pub enum HandlerError {
    Invalid(ValidationError),
    BadBody,
    NotFound,
    Storage(&'static str),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            HandlerError::Invalid(err) => (StatusCode::BAD_REQUEST, err.message),
            HandlerError::BadBody => (StatusCode::BAD_REQUEST, "Invalid request body".to_string()),
            HandlerError::NotFound => (StatusCode::NOT_FOUND, "Todo not found".to_string()),
            HandlerError::Storage(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, message.to_string())
            }
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

/// Log a storage fault under `context` and hide it behind `public`.
fn storage_failure(
    context: &'static str,
    public: &'static str,
) -> impl FnOnce(StoreError) -> HandlerError {
    move |err| {
        error!(error = %err, "{context}");
        HandlerError::Storage(public)
    }
}

fn validate(body: &Value) -> Result<TodoInput, HandlerError> {
    validate_todo(body).map_err(|err| {
        debug!(field = %err.field, reason = %err.message, "rejected todo payload");
        HandlerError::Invalid(err)
    })
}

pub async fn list_todos(State(state): State<AppState>) -> Result<Json<TodoList>, HandlerError> {
    let todos = state
        .store
        .list()
        .await
        .map_err(storage_failure("Error fetching todos", "Failed to fetch todos"))?;
    Ok(Json(TodoList { todos }))
}

pub async fn create_todo(
    State(state): State<AppState>,
    TodoBody(body): TodoBody,
) -> Result<(StatusCode, Json<TodoEnvelope>), HandlerError> {
    let input = validate(&body)?;
    let todo = state
        .store
        .create(&input.text)
        .await
        .map_err(storage_failure("Error creating todo", "Failed to create todo"))?;
    Ok((StatusCode::CREATED, Json(TodoEnvelope { todo })))
}

pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    TodoBody(body): TodoBody,
) -> Result<Json<TodoMessage>, HandlerError> {
    let input = validate(&body)?;
    let todo = state
        .store
        .update(&id, &input.text)
        .await
        .map_err(storage_failure("Error updating todo", "Failed to update todo"))?
        .ok_or(HandlerError::NotFound)?;
    Ok(Json(TodoMessage {
        message: "Todo updated".to_string(),
        todo,
    }))
}

pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TodoMessage>, HandlerError> {
    let todo = state
        .store
        .delete(&id)
        .await
        .map_err(storage_failure("Error deleting todo", "Failed to delete todo"))?
        .ok_or(HandlerError::NotFound)?;
    Ok(Json(TodoMessage {
        message: "Todo deleted".to_string(),
        todo,
    }))
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthStatus>) {
    let (code, status) = if state.store.is_ready() {
        (StatusCode::OK, HealthStatus::OK)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, HealthStatus::DB_NOT_READY)
    };
    (
        code,
        Json(HealthStatus {
            status: status.to_string(),
        }),
    )
}

pub async fn api_docs() -> Json<Value> {
    Json(openapi::document())
}
