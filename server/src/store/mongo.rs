use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bson::oid::ObjectId;
use bson::{doc, Document};
use mongodb::error::ErrorKind;
use mongodb::event::sdam::SdamEvent;
use mongodb::event::EventHandler;
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use todo_core::Todo;
use tracing::{debug, info, warn};

use super::{parse_id, Readiness, StoreError, TodoStore};

const COLLECTION: &str = "todos";
const DEFAULT_DATABASE: &str = "test";
const SERVER_SELECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Stored shape of a todo. `__v` is written as 0 and never bumped by text
/// updates.
#[derive(Debug, Serialize, Deserialize)]
struct TodoDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    text: String,
    #[serde(default)]
    completed: bool,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: bson::DateTime,
    #[serde(rename = "__v", default)]
    version: i32,
}

impl From<TodoDocument> for Todo {
    fn from(doc: TodoDocument) -> Self {
        Todo {
            id: doc.id.to_hex(),
            text: doc.text,
            completed: doc.completed,
            created_at: doc.created_at.to_chrono(),
            updated_at: doc.updated_at.to_chrono(),
            version: i64::from(doc.version),
        }
    }
}

/// Tracks which servers answered their last heartbeat. The store is ready
/// while at least one does.
#[derive(Debug, Default)]
struct ConnectionMonitor {
    readiness: Readiness,
    reachable: Mutex<HashSet<String>>,
}

impl ConnectionMonitor {
    fn observe(&self, event: SdamEvent) {
        match event {
            SdamEvent::ServerHeartbeatSucceeded(event) => {
                self.heartbeat(event.server_address.to_string(), true)
            }
            SdamEvent::ServerHeartbeatFailed(event) => {
                self.heartbeat(event.server_address.to_string(), false)
            }
            SdamEvent::ServerClosed(event) => self.heartbeat(event.address.to_string(), false),
            _ => {}
        }
    }

    fn heartbeat(&self, address: String, succeeded: bool) {
        let any_reachable = {
            let mut reachable = self
                .reachable
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if succeeded {
                reachable.insert(address);
            } else {
                reachable.remove(&address);
            }
            !reachable.is_empty()
        };
        // Compared against the shared flag, not the previous set, so a flag
        // cleared by a failed operation is restored by the next heartbeat.
        match (any_reachable, self.readiness.is_ready()) {
            (true, false) => {
                info!("MongoDB connection ready");
                self.readiness.mark_ready();
            }
            (false, true) => {
                warn!("lost connection to MongoDB");
                self.readiness.mark_lost();
            }
            _ => {}
        }
    }
}

/// `TodoStore` backed by a MongoDB collection.
pub struct MongoStore {
    collection: Collection<TodoDocument>,
    readiness: Readiness,
}

impl MongoStore {
    /// Connect to the URI's default database (or `test`) and ping it.
    pub async fn connect(uri: &str) -> Result<Self, StoreError> {
        let mut options = ClientOptions::parse(uri).await?;
        options
            .app_name
            .get_or_insert_with(|| env!("CARGO_PKG_NAME").to_string());
        options
            .server_selection_timeout
            .get_or_insert(SERVER_SELECTION_TIMEOUT);

        let monitor = Arc::new(ConnectionMonitor::default());
        let readiness = monitor.readiness.clone();
        let observer = Arc::clone(&monitor);
        options.sdam_event_handler = Some(EventHandler::callback(move |event: SdamEvent| {
            observer.observe(event)
        }));

        let client = Client::with_options(options)?;
        let database = client
            .default_database()
            .unwrap_or_else(|| client.database(DEFAULT_DATABASE));
        database.run_command(doc! { "ping": 1 }).await?;
        info!(database = database.name(), "connected to MongoDB");

        readiness.mark_ready();
        Ok(Self {
            collection: database.collection(COLLECTION),
            readiness,
        })
    }

    /// Fold an operation's outcome into the readiness flag, between
    /// heartbeats.
    fn track<T>(&self, result: mongodb::error::Result<T>) -> Result<T, StoreError> {
        match result {
            Ok(value) => {
                self.readiness.mark_ready();
                Ok(value)
            }
            Err(err) => {
                if is_connection_error(&err) && self.readiness.is_ready() {
                    warn!(error = %err, "lost connection to MongoDB");
                    self.readiness.mark_lost();
                }
                Err(err.into())
            }
        }
    }
}

fn is_connection_error(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Io(_) | ErrorKind::ServerSelection { .. }
    )
}

/// Pipeline update that sets the text and moves `updatedAt` forward by at
/// least one millisecond, atomically on the server.
fn text_update(text: &str) -> Vec<Document> {
    let now = bson::DateTime::now();
    vec![doc! {
        "$set": {
            "text": { "$literal": text },
            "updatedAt": { "$max": [now, { "$add": ["$updatedAt", 1_i64] }] },
        }
    }]
}

#[async_trait]
impl TodoStore for MongoStore {
    async fn list(&self) -> Result<Vec<Todo>, StoreError> {
        let mut cursor = self.track(
            self.collection
                .find(doc! {})
                .sort(doc! { "_id": 1 })
                .await,
        )?;
        let mut todos = Vec::new();
        while self.track(cursor.advance().await)? {
            let document = cursor
                .deserialize_current()
                .map_err(|err| StoreError::Decode(err.to_string()))?;
            todos.push(Todo::from(document));
        }
        Ok(todos)
    }

    async fn create(&self, text: &str) -> Result<Todo, StoreError> {
        let now = bson::DateTime::now();
        let document = TodoDocument {
            id: ObjectId::new(),
            text: text.to_string(),
            completed: false,
            created_at: now,
            updated_at: now,
            version: 0,
        };
        self.track(self.collection.insert_one(&document).await)?;
        debug!(id = %document.id, "inserted todo");
        Ok(document.into())
    }

    async fn update(&self, id: &str, text: &str) -> Result<Option<Todo>, StoreError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let updated = self.track(
            self.collection
                .find_one_and_update(doc! { "_id": oid }, text_update(text))
                .return_document(ReturnDocument::After)
                .await,
        )?;
        Ok(updated.map(Todo::from))
    }

    async fn delete(&self, id: &str) -> Result<Option<Todo>, StoreError> {
        let Some(oid) = parse_id(id) else {
            return Ok(None);
        };
        let removed = self.track(
            self.collection
                .find_one_and_delete(doc! { "_id": oid })
                .await,
        )?;
        Ok(removed.map(Todo::from))
    }

    fn is_ready(&self) -> bool {
        self.readiness.is_ready()
    }
}
