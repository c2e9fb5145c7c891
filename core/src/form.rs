//! Input form for adding todos.

use crate::error::ApiError;
use crate::http::Transport;
use crate::store::TodoStore;
use crate::types::Todo;

/// Holds the draft text of a new todo and submits it through a `TodoStore`.
pub struct TodoForm<'a, T> {
    store: &'a TodoStore<T>,
    draft: String,
}

impl<'a, T: Transport> TodoForm<'a, T> {
    pub fn new(store: &'a TodoStore<T>) -> Self {
        Self {
            store,
            draft: String::new(),
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Whether the submit affordance should be enabled.
    pub fn can_submit(&self) -> bool {
        !self.store.is_pending() && !self.draft.trim().is_empty()
    }

    /// Submit the trimmed draft.
    ///
    /// A validation failure keeps the draft so the user can correct it. Once a
    /// request has been attempted the draft is cleared whatever the outcome;
    /// failures are already in the store's `ErrorStore`.
    pub fn submit(&mut self) -> Result<Todo, ApiError> {
        let result = self.store.add_todo(self.draft.trim());
        if !matches!(result, Err(ApiError::Invalid(_))) {
            self.draft.clear();
        }
        result
    }
}
