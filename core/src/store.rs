//! Client-side state for the todo list.
//!
//! # Design
//! `TodoStore` owns the host's `Transport` and a `TodoClient`, and keeps the
//! last known list of todos behind a `Mutex` so every operation takes `&self`.
//! Each operation is one round trip: a pending guard is taken for its
//! duration, the collection is updated only after the server confirms, and
//! any failure is written to the shared `ErrorStore` before being returned.
//! Subscribers receive a `TodoState` snapshot after every change, including
//! pending-flag transitions, which is the hook a view uses to re-render.
//!
//! Concurrent operations are not serialized. Two in-flight mutations race at
//! the network layer and whichever response lands last updates the list.

use std::fmt::Display;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::client::TodoClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, Transport};
use crate::types::{CreateTodo, Todo, UpdateTodo};
use crate::validation::validate_text;

/// Last error surfaced by any client component.
#[derive(Debug, Default)]
pub struct ErrorStore {
    error: Mutex<Option<String>>,
}

impl ErrorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_error(&self, error: &dyn Display) {
        *lock(&self.error) = Some(error.to_string());
    }

    pub fn error(&self) -> Option<String> {
        lock(&self.error).clone()
    }

    pub fn clear_error(&self) {
        *lock(&self.error) = None;
    }
}

/// Point-in-time view of the store handed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoState {
    pub todos: Vec<Todo>,
    pub is_pending: bool,
}

type Listener = Arc<dyn Fn(&TodoState) + Send + Sync>;

#[derive(Default)]
struct Inner {
    todos: Vec<Todo>,
    in_flight: usize,
}

impl Inner {
    fn state(&self) -> TodoState {
        TodoState {
            todos: self.todos.clone(),
            is_pending: self.in_flight > 0,
        }
    }
}

pub struct TodoStore<T> {
    client: TodoClient,
    transport: T,
    inner: Mutex<Inner>,
    errors: Arc<ErrorStore>,
    listeners: Mutex<Vec<Listener>>,
}

impl<T: Transport> TodoStore<T> {
    pub fn new(client: TodoClient, transport: T) -> Self {
        Self::with_errors(client, transport, Arc::new(ErrorStore::new()))
    }

    /// Build a store that reports into an existing, shared `ErrorStore`.
    pub fn with_errors(client: TodoClient, transport: T, errors: Arc<ErrorStore>) -> Self {
        Self {
            client,
            transport,
            inner: Mutex::new(Inner::default()),
            errors,
            listeners: Mutex::new(Vec::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn errors(&self) -> &Arc<ErrorStore> {
        &self.errors
    }

    pub fn todos(&self) -> Vec<Todo> {
        lock(&self.inner).todos.clone()
    }

    pub fn is_pending(&self) -> bool {
        lock(&self.inner).in_flight > 0
    }

    pub fn snapshot(&self) -> TodoState {
        lock(&self.inner).state()
    }

    /// Listeners may call back into the store, including `subscribe`; one
    /// added during a notification first hears the next change.
    pub fn subscribe(&self, listener: impl Fn(&TodoState) + Send + Sync + 'static) {
        lock(&self.listeners).push(Arc::new(listener));
    }

    /// Replace the local collection with the server's list.
    pub fn fetch_todos(&self) -> Result<Vec<Todo>, ApiError> {
        let _pending = self.begin();
        let todos = self.round_trip(
            "fetch todos",
            |client| Ok(client.build_list_todos()),
            TodoClient::parse_list_todos,
        )?;
        self.mutate(|inner| inner.todos = todos.clone());
        Ok(todos)
    }

    /// Validate `text`, create it on the server and append the stored record.
    pub fn add_todo(&self, text: &str) -> Result<Todo, ApiError> {
        let input = validate_text(text).map_err(|err| self.report("add todo", err.into()))?;
        let payload = CreateTodo { text: input.text };
        let _pending = self.begin();
        let todo = self.round_trip(
            "add todo",
            |client| client.build_create_todo(&payload),
            TodoClient::parse_create_todo,
        )?;
        self.mutate(|inner| inner.todos.push(todo.clone()));
        Ok(todo)
    }

    pub fn update_todo(&self, id: &str, text: &str) -> Result<Todo, ApiError> {
        let input = validate_text(text).map_err(|err| self.report("update todo", err.into()))?;
        let payload = UpdateTodo { text: input.text };
        let _pending = self.begin();
        let todo = self.round_trip(
            "update todo",
            |client| client.build_update_todo(id, &payload),
            TodoClient::parse_update_todo,
        )?;
        self.mutate(|inner| {
            if let Some(slot) = inner.todos.iter_mut().find(|t| t.id == todo.id) {
                *slot = todo.clone();
            }
        });
        Ok(todo)
    }

    /// Delete on the server; returns the record as it was before removal.
    pub fn delete_todo(&self, id: &str) -> Result<Todo, ApiError> {
        let _pending = self.begin();
        let todo = self.round_trip(
            "delete todo",
            |client| Ok(client.build_delete_todo(id)),
            TodoClient::parse_delete_todo,
        )?;
        self.mutate(|inner| inner.todos.retain(|t| t.id != todo.id));
        Ok(todo)
    }

    fn round_trip<R>(
        &self,
        action: &'static str,
        build: impl FnOnce(&TodoClient) -> Result<HttpRequest, ApiError>,
        parse: impl FnOnce(&TodoClient, HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        build(&self.client)
            .and_then(|request| self.transport.execute(request))
            .and_then(|response| parse(&self.client, response))
            .map_err(|err| self.report(action, err))
    }

    fn report(&self, action: &'static str, err: ApiError) -> ApiError {
        tracing::warn!(action, error = %err, "todo request failed");
        self.errors.set_error(&err);
        err
    }

    fn begin(&self) -> PendingGuard<'_, T> {
        self.mutate(|inner| inner.in_flight += 1);
        PendingGuard { store: self }
    }

    fn mutate(&self, apply: impl FnOnce(&mut Inner)) {
        let state = {
            let mut inner = lock(&self.inner);
            apply(&mut inner);
            inner.state()
        };
        let listeners = lock(&self.listeners).clone();
        for listener in &listeners {
            listener(&state);
        }
    }
}

/// Clears one unit of the pending count on drop, whether the round trip
/// succeeded or not.
struct PendingGuard<'a, T: Transport> {
    store: &'a TodoStore<T>,
}

impl<T: Transport> Drop for PendingGuard<'_, T> {
    fn drop(&mut self) {
        self.store
            .mutate(|inner| inner.in_flight = inner.in_flight.saturating_sub(1));
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use super::*;
    use crate::http::HttpMethod;

    /// Replays canned responses in order and records every request.
    #[derive(Default)]
    struct Scripted {
        responses: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
        requests: RefCell<Vec<HttpRequest>>,
    }

    impl Scripted {
        fn reply(self, status: u16, body: &str) -> Self {
            self.responses.borrow_mut().push_back(Ok(HttpResponse {
                status,
                headers: Vec::new(),
                body: body.to_string(),
            }));
            self
        }

        fn fail(self, message: &str) -> Self {
            self.responses
                .borrow_mut()
                .push_back(Err(ApiError::Transport(message.to_string())));
            self
        }
    }

    impl Transport for Scripted {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.requests.borrow_mut().push(request);
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected request")
        }
    }

    /// Answers every request with the same 200 body; shareable across threads.
    struct Fixed(String);

    impl Transport for Fixed {
        fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, ApiError> {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: self.0.clone(),
            })
        }
    }

    fn todo_json(id: &str, text: &str) -> String {
        format!(
            r#"{{"_id":"{id}","text":"{text}","completed":false,"createdAt":"2026-02-18T16:05:14.006Z","updatedAt":"2026-02-18T16:05:14.006Z","__v":0}}"#
        )
    }

    fn store(transport: Scripted) -> TodoStore<Scripted> {
        TodoStore::new(TodoClient::new("http://localhost:5000"), transport)
    }

    #[test]
    fn fetch_replaces_collection() {
        let body = format!(r#"{{"todos":[{},{}]}}"#, todo_json("a", "one"), todo_json("b", "two"));
        let store = store(Scripted::default().reply(200, &body));
        let todos = store.fetch_todos().unwrap();
        assert_eq!(todos.len(), 2);
        assert_eq!(
            store.snapshot(),
            TodoState {
                todos,
                is_pending: false,
            }
        );
    }

    #[test]
    fn add_appends_confirmed_record() {
        let created = format!(r#"{{"todo":{}}}"#, todo_json("a", "Buy milk"));
        let store = store(Scripted::default().reply(201, &created));
        let todo = store.add_todo("Buy milk").unwrap();
        assert_eq!(todo.text, "Buy milk");
        assert_eq!(store.todos(), vec![todo]);

        let requests = store.transport.requests.borrow();
        assert_eq!(requests[0].method, HttpMethod::Post);
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"text":"Buy milk"}"#));
    }

    #[test]
    fn add_rejects_empty_text_without_request() {
        let store = store(Scripted::default());
        let err = store.add_todo("").unwrap_err();
        assert!(matches!(err, ApiError::Invalid(_)));
        assert!(store.transport.requests.borrow().is_empty());
        assert_eq!(
            store.errors().error().as_deref(),
            Some("\"text\" is not allowed to be empty")
        );
    }

    #[test]
    fn update_replaces_matching_record() {
        let list = format!(r#"{{"todos":[{},{}]}}"#, todo_json("a", "one"), todo_json("b", "two"));
        let updated = format!(r#"{{"message":"Todo updated","todo":{}}}"#, todo_json("b", "deux"));
        let store = store(Scripted::default().reply(200, &list).reply(200, &updated));
        store.fetch_todos().unwrap();
        store.update_todo("b", "deux").unwrap();
        let texts: Vec<String> = store.todos().into_iter().map(|t| t.text).collect();
        assert_eq!(texts, vec!["one", "deux"]);
    }

    #[test]
    fn delete_removes_record() {
        let list = format!(r#"{{"todos":[{},{}]}}"#, todo_json("a", "one"), todo_json("b", "two"));
        let deleted = format!(r#"{{"message":"Todo deleted","todo":{}}}"#, todo_json("a", "one"));
        let store = store(Scripted::default().reply(200, &list).reply(200, &deleted));
        store.fetch_todos().unwrap();
        let removed = store.delete_todo("a").unwrap();
        assert_eq!(removed.text, "one");
        let ids: Vec<String> = store.todos().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[test]
    fn delete_by_uppercase_id_removes_server_record() {
        let id = "6995e3399ecb6f0efa9b0a09";
        let list = format!(r#"{{"todos":[{}]}}"#, todo_json(id, "one"));
        let deleted = format!(r#"{{"message":"Todo deleted","todo":{}}}"#, todo_json(id, "one"));
        let store = store(Scripted::default().reply(200, &list).reply(200, &deleted));
        store.fetch_todos().unwrap();
        let removed = store.delete_todo(&id.to_uppercase()).unwrap();
        assert_eq!(removed.id, id);
        assert!(store.todos().is_empty());
    }

    #[test]
    fn not_found_is_reported_and_state_kept() {
        let list = format!(r#"{{"todos":[{}]}}"#, todo_json("a", "one"));
        let store = store(
            Scripted::default()
                .reply(200, &list)
                .reply(404, r#"{"error":"Todo not found"}"#),
        );
        store.fetch_todos().unwrap();
        let err = store.delete_todo("zzz").unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
        assert_eq!(store.todos().len(), 1);
        assert_eq!(store.errors().error().as_deref(), Some("Todo not found"));
    }

    #[test]
    fn transport_failure_clears_pending_and_reports() {
        let store = store(Scripted::default().fail("connection refused"));
        let err = store.fetch_todos().unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert!(!store.is_pending());
        assert_eq!(
            store.errors().error().as_deref(),
            Some("transport failed: connection refused")
        );
    }

    #[test]
    fn subscribers_see_pending_transitions() {
        let body = format!(r#"{{"todos":[{}]}}"#, todo_json("a", "one"));
        let store = store(Scripted::default().reply(200, &body));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        store.subscribe(move |state| {
            sink.lock().unwrap().push((state.is_pending, state.todos.len()));
        });

        store.fetch_todos().unwrap();

        // begin, list replaced while pending, guard released
        assert_eq!(*seen.lock().unwrap(), vec![(true, 0), (true, 1), (false, 1)]);
    }

    #[test]
    fn listener_may_subscribe_during_notification() {
        let body = format!(r#"{{"todos":[{}]}}"#, todo_json("a", "one"));
        let store = Arc::new(TodoStore::new(
            TodoClient::new("http://localhost:5000"),
            Fixed(body),
        ));
        let late = Arc::new(Mutex::new(0));
        let weak = Arc::downgrade(&store);
        let counter = Arc::clone(&late);
        store.subscribe(move |_| {
            if let Some(store) = weak.upgrade() {
                let counter = Arc::clone(&counter);
                store.subscribe(move |_| *counter.lock().unwrap() += 1);
            }
        });

        store.fetch_todos().unwrap();

        // added on each of the three notifications, heard by the later ones
        assert_eq!(*late.lock().unwrap(), 3);
    }

    #[test]
    fn error_store_clears() {
        let errors = ErrorStore::new();
        errors.set_error(&"boom");
        assert_eq!(errors.error().as_deref(), Some("boom"));
        errors.clear_error();
        assert!(errors.error().is_none());
    }
}
