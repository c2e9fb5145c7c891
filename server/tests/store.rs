//! Behavior every `TodoStore` implementation must share.
//!
//! The MongoDB run is ignored by default; run it with
//! `MONGO_URI=mongodb://localhost:27017/todo-test cargo test -- --ignored`.
//! It only touches the records it creates.

use todo_core::Todo;
use todo_server::{MemoryStore, MongoStore, TodoStore};

const MISSING_ID: &str = "000000000000000000000000";

fn position(todos: &[Todo], id: &str) -> Option<usize> {
    todos.iter().position(|t| t.id == id)
}

async fn check_store(store: &dyn TodoStore) {
    assert!(store.is_ready());

    // create: defaults and equal timestamps
    let first = store.create("Buy milk").await.unwrap();
    let second = store.create("Walk dog").await.unwrap();
    assert!(!first.completed);
    assert_eq!(first.version, 0);
    assert_eq!(first.created_at, first.updated_at);
    assert_ne!(first.id, second.id);
    assert_eq!(first.id.len(), 24);

    // list: insertion order
    let todos = store.list().await.unwrap();
    let (a, b) = (position(&todos, &first.id), position(&todos, &second.id));
    assert!(a.is_some() && b.is_some());
    assert!(a < b);
    assert_eq!(todos[a.unwrap()], first);

    // update: text replaced, updatedAt strictly increasing, createdAt kept
    let updated = store.update(&first.id, "Buy oat milk").await.unwrap().unwrap();
    assert_eq!(updated.id, first.id);
    assert_eq!(updated.text, "Buy oat milk");
    assert_eq!(updated.created_at, first.created_at);
    assert!(updated.updated_at > first.updated_at);
    let again = store.update(&first.id, "Buy oat milk").await.unwrap().unwrap();
    assert!(again.updated_at > updated.updated_at);

    // text that looks like an expression is stored as written
    let literal = store.update(&second.id, "$text").await.unwrap().unwrap();
    assert_eq!(literal.text, "$text");

    // ids are accepted in either case
    let upper = store
        .update(&second.id.to_uppercase(), "Walk cat")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(upper.id, second.id);

    // missing and malformed ids
    assert!(store.update(MISSING_ID, "x").await.unwrap().is_none());
    assert!(store.update("not-an-id", "x").await.unwrap().is_none());
    assert!(store.delete(MISSING_ID).await.unwrap().is_none());
    assert!(store.delete("not-an-id").await.unwrap().is_none());

    // delete: returns the record as it was, then it is gone
    let removed = store.delete(&first.id).await.unwrap().unwrap();
    assert_eq!(removed, again);
    assert!(store.delete(&first.id).await.unwrap().is_none());
    let removed = store.delete(&second.id).await.unwrap().unwrap();
    assert_eq!(removed, upper);

    let todos = store.list().await.unwrap();
    assert!(position(&todos, &first.id).is_none());
    assert!(position(&todos, &second.id).is_none());
}

#[tokio::test]
async fn memory_store_behavior() {
    check_store(&MemoryStore::new()).await;
}

#[tokio::test]
#[ignore = "needs a running MongoDB at MONGO_URI"]
async fn mongo_store_behavior() {
    let uri = std::env::var("MONGO_URI").expect("MONGO_URI must be set");
    let store = MongoStore::connect(&uri).await.unwrap();
    check_store(&store).await;
}
