//! Shared types, validation and client state for the todo service.
//!
//! # Overview
//! The server and every client link this crate, so the wire types and the
//! input rules exist exactly once. The client half builds `HttpRequest`
//! values and parses `HttpResponse` values without touching the network
//! (host-does-IO pattern); the host supplies a `Transport`.
//!
//! # Design
//! - `validation::validate_todo` is the single rule set for todo payloads.
//! - `TodoClient` is stateless; each operation is a `build_*`/`parse_*` pair.
//! - `store::TodoStore` layers an observable todo list, a pending flag and
//!   error reporting on top of the client.
//! - `form::TodoForm` is the add-todo input, gated on the store's state.

pub mod client;
pub mod error;
pub mod form;
pub mod http;
pub mod store;
pub mod types;
pub mod validation;

pub use client::TodoClient;
pub use error::ApiError;
pub use form::TodoForm;
pub use http::{HttpMethod, HttpRequest, HttpResponse, Transport};
pub use store::{ErrorStore, TodoState, TodoStore};
pub use types::{
    CreateTodo, ErrorBody, HealthStatus, Todo, TodoEnvelope, TodoList, TodoMessage, UpdateTodo,
};
pub use validation::{validate_text, validate_todo, TodoInput, ValidationError};
