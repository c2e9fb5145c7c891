//! Data access for todo documents.
//!
//! # Design
//! Handlers only see the `TodoStore` trait, never a database client. A
//! missing record is `Ok(None)`, not an error, so callers can tell "no such
//! todo" apart from a storage fault. Ids that are not valid document ids
//! resolve to `Ok(None)` the same way.
//!
//! Readiness is a flag the health check reads without a query. The MongoDB
//! store keeps it in step with the driver's server heartbeats and also folds
//! in the outcome of each operation; the memory store toggles it by hand.

mod memory;
mod mongo;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use todo_core::Todo;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

#[async_trait]
pub trait TodoStore: Send + Sync + 'static {
    /// All todos in insertion order.
    async fn list(&self) -> Result<Vec<Todo>, StoreError>;
    async fn create(&self, text: &str) -> Result<Todo, StoreError>;
    /// Replace the text and refresh `updated_at`.
    async fn update(&self, id: &str, text: &str) -> Result<Option<Todo>, StoreError>;
    /// Remove the record and return it as it was before removal.
    async fn delete(&self, id: &str) -> Result<Option<Todo>, StoreError>;
    /// Connection state only; never touches the database.
    fn is_ready(&self) -> bool;
}

pub type SharedStore = Arc<dyn TodoStore>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database connection is not ready")]
    Unavailable,

    #[error("unsupported connection scheme `{0}`")]
    UnsupportedScheme(String),

    #[error(transparent)]
    Backend(#[from] mongodb::error::Error),

    /// A stored document that does not have the todo shape.
    #[error("malformed todo document: {0}")]
    Decode(String),
}

/// Shared connection-state flag.
#[derive(Clone, Debug, Default)]
pub struct Readiness(Arc<AtomicBool>);

impl Readiness {
    pub fn mark_ready(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn mark_lost(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_ready(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Open the store named by `uri`'s scheme. MongoDB connections are pinged
/// before this returns.
pub async fn connect(uri: &str) -> Result<SharedStore, StoreError> {
    let scheme = uri.split_once("://").map_or(uri, |(scheme, _)| scheme);
    match scheme.to_ascii_lowercase().as_str() {
        "mongodb" | "mongodb+srv" => Ok(Arc::new(MongoStore::connect(uri).await?)),
        "memory" => Ok(Arc::new(MemoryStore::new())),
        other => Err(StoreError::UnsupportedScheme(other.to_string())),
    }
}

fn parse_id(id: &str) -> Option<ObjectId> {
    ObjectId::parse_str(id).ok()
}

/// Current time truncated to the millisecond precision documents store.
fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
}

/// A refreshed `updated_at` that is strictly later than `previous`.
fn next_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_millis();
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}
