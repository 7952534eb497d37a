//! Client-side stores for todos and categories.
//!
//! Fetches replace the held lists wholesale; mutations patch the lists in
//! place by id match. Todo deletions are staged behind a cancellable timer
//! window (see [`crate::deletion`]).

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, RwLock};
use tokio_util::sync::CancellationToken;

use tickmate_core::category::{Category, CreateCategory, UpdateCategory};
use tickmate_core::todo::{CreateTodo, Todo, TodoGroup, TodoListQuery, UpdateTodo};
use tickmate_core::types::DbId;

use crate::api::{ClientError, TodoApi, TodoListing};
use crate::deletion::{DeletionState, StagedDeletion};

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

/// Snapshot of the todo list state.
#[derive(Debug, Clone, Default)]
pub struct TodosState {
    /// Flat view; empty while a grouped view is held.
    pub items: Vec<Todo>,
    /// Grouped view; `None` while a flat view is held.
    pub grouped: Option<Vec<TodoGroup>>,
    /// Todo loaded by [`TodoStore::fetch_by_id`].
    pub selected: Option<Todo>,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: TodoListQuery,
}

/// Client-side store for the todo list.
pub struct TodoStore<A: TodoApi> {
    api: Arc<A>,
    state: Arc<RwLock<TodosState>>,
}

impl<A: TodoApi> TodoStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(TodosState::default())),
        }
    }

    /// Snapshot of the current state.
    pub async fn snapshot(&self) -> TodosState {
        self.state.read().await.clone()
    }

    /// Replace the filter settings. Callers re-fetch to apply them.
    pub async fn set_filters(&self, filters: TodoListQuery) {
        self.state.write().await.filters = filters;
    }

    /// Clear the surfaced error.
    pub async fn clear_error(&self) {
        self.state.write().await.error = None;
    }

    /// Fetch the list for the current filters, replacing the held view
    /// wholesale. On failure the error is surfaced and the previous view is
    /// kept; calling `fetch` again is the retry.
    pub async fn fetch(&self) {
        let filters = {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
            state.filters
        };

        match self.api.list_todos(&filters).await {
            Ok(TodoListing::Flat(items)) => {
                let mut state = self.state.write().await;
                state.loading = false;
                state.items = items;
                state.grouped = None;
            }
            Ok(TodoListing::Grouped(groups)) => {
                let mut state = self.state.write().await;
                state.loading = false;
                state.grouped = Some(groups);
                state.items = Vec::new();
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.loading = false;
                state.error = Some(err.to_string());
            }
        }
    }

    /// Fetch a single todo into `selected`.
    pub async fn fetch_by_id(&self, id: DbId) -> Result<Todo, ClientError> {
        match self.api.get_todo(id).await {
            Ok(todo) => {
                self.state.write().await.selected = Some(todo.clone());
                Ok(todo)
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Create a todo and prepend it to the flat view.
    pub async fn create(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        match self.api.create_todo(input).await {
            Ok(todo) => {
                self.state.write().await.items.insert(0, todo.clone());
                Ok(todo)
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Replace a todo on the server, patching it in place by id.
    pub async fn update(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, ClientError> {
        match self.api.update_todo(id, input).await {
            Ok(todo) => {
                let mut state = self.state.write().await;
                patch_todo(&mut state, &todo);
                if state.selected.as_ref().is_some_and(|t| t.id == id) {
                    state.selected = Some(todo.clone());
                }
                Ok(todo)
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Toggle completion, patching both the flat and grouped views.
    pub async fn toggle(&self, id: DbId) -> Result<Todo, ClientError> {
        match self.api.toggle_todo(id).await {
            Ok(todo) => {
                let mut state = self.state.write().await;
                patch_todo(&mut state, &todo);
                Ok(todo)
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Soft-remove a todo from the view and start the deferred delete
    /// window. The server call happens only when the window elapses; `undo`
    /// on the returned handle restores the item with no call at all. If the
    /// deferred call fails, the item is restored and the error surfaced.
    ///
    /// Returns `None` when the id is not in the current view.
    pub async fn stage_delete(&self, id: DbId, window: Duration) -> Option<StagedDeletion> {
        let removed = {
            let mut state = self.state.write().await;
            remove_todo(&mut state, id)?
        };

        let (tx, rx) = watch::channel(DeletionState::Staged);
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.state);

        let task = tokio::spawn(async move {
            let outcome = tokio::select! {
                () = token.cancelled() => {
                    let mut state = shared.write().await;
                    reinsert_todo(&mut state, removed);
                    DeletionState::Restored
                }
                () = tokio::time::sleep(window) => {
                    match api.delete_todo(id).await {
                        Ok(()) => DeletionState::Committed,
                        Err(err) => {
                            // The server never performed the delete; put the
                            // item back and surface the failure.
                            let mut state = shared.write().await;
                            reinsert_todo(&mut state, removed);
                            state.error = Some(err.to_string());
                            DeletionState::Restored
                        }
                    }
                }
            };
            tracing::debug!(todo_id = id, ?outcome, "Staged deletion settled");
            let _ = tx.send(outcome);
        });

        Some(StagedDeletion::new(cancel, rx, task))
    }
}

// ---------------------------------------------------------------------------
// View surgery for staged deletions
// ---------------------------------------------------------------------------

/// A todo lifted out of the view, with enough position information to put
/// it back where it was.
#[derive(Debug, Clone)]
struct RemovedTodo {
    todo: Todo,
    item_index: Option<usize>,
    group_slot: Option<GroupSlot>,
}

#[derive(Debug, Clone, Copy)]
struct GroupSlot {
    group_index: usize,
    todo_index: usize,
    /// The removal emptied the bucket, so the bucket itself was pruned.
    group_removed: bool,
}

fn remove_todo(state: &mut TodosState, id: DbId) -> Option<RemovedTodo> {
    let item_index = state.items.iter().position(|t| t.id == id);
    let mut todo = item_index.map(|i| state.items.remove(i));

    let mut group_slot = None;
    if let Some(groups) = state.grouped.as_mut() {
        let found = groups.iter().enumerate().find_map(|(gi, group)| {
            group.todos.iter().position(|t| t.id == id).map(|ti| (gi, ti))
        });
        if let Some((gi, ti)) = found {
            let removed = groups[gi].todos.remove(ti);
            let group_removed = groups[gi].todos.is_empty();
            if group_removed {
                groups.remove(gi);
            }
            group_slot = Some(GroupSlot {
                group_index: gi,
                todo_index: ti,
                group_removed,
            });
            if todo.is_none() {
                todo = Some(removed);
            }
        }
    }

    let todo = todo?;
    if state.selected.as_ref().is_some_and(|t| t.id == id) {
        state.selected = None;
    }
    Some(RemovedTodo {
        todo,
        item_index,
        group_slot,
    })
}

fn reinsert_todo(state: &mut TodosState, removed: RemovedTodo) {
    let RemovedTodo {
        todo,
        item_index,
        group_slot,
    } = removed;

    if let Some(groups) = state.grouped.as_mut() {
        match group_slot {
            Some(slot) if slot.group_removed => {
                let at = slot.group_index.min(groups.len());
                groups.insert(
                    at,
                    TodoGroup {
                        category: todo.category.clone(),
                        todos: vec![todo.clone()],
                    },
                );
            }
            Some(slot) => {
                match groups
                    .iter_mut()
                    .find(|g| g.category.as_ref().map(|c| c.id) == todo.category_id)
                {
                    Some(group) => {
                        let at = slot.todo_index.min(group.todos.len());
                        group.todos.insert(at, todo.clone());
                    }
                    None => insert_group(groups, &todo),
                }
            }
            None => insert_group(groups, &todo),
        }
    }

    if let Some(index) = item_index {
        let at = index.min(state.items.len());
        state.items.insert(at, todo);
    } else if state.grouped.is_none() {
        state.items.push(todo);
    }
}

/// Insert a fresh single-todo bucket, keeping name order and the
/// uncategorized bucket last.
fn insert_group(groups: &mut Vec<TodoGroup>, todo: &Todo) {
    let group = TodoGroup {
        category: todo.category.clone(),
        todos: vec![todo.clone()],
    };
    let at = match &todo.category {
        Some(info) => groups
            .iter()
            .position(|g| match &g.category {
                Some(existing) => existing.name.as_str() > info.name.as_str(),
                None => true,
            })
            .unwrap_or(groups.len()),
        None => groups.len(),
    };
    groups.insert(at, group);
}

fn patch_todo(state: &mut TodosState, todo: &Todo) {
    if let Some(existing) = state.items.iter_mut().find(|t| t.id == todo.id) {
        *existing = todo.clone();
    }
    if let Some(groups) = state.grouped.as_mut() {
        for group in groups {
            if let Some(existing) = group.todos.iter_mut().find(|t| t.id == todo.id) {
                *existing = todo.clone();
                break;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// Snapshot of the category list state.
#[derive(Debug, Clone, Default)]
pub struct CategoriesState {
    pub items: Vec<Category>,
    pub loading: bool,
    pub error: Option<String>,
}

/// Client-side store for the category list.
pub struct CategoryStore<A: TodoApi> {
    api: Arc<A>,
    state: Arc<RwLock<CategoriesState>>,
}

impl<A: TodoApi> CategoryStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(CategoriesState::default())),
        }
    }

    /// Snapshot of the current state.
    pub async fn snapshot(&self) -> CategoriesState {
        self.state.read().await.clone()
    }

    /// Fetch all categories, replacing the held list wholesale.
    pub async fn fetch(&self) {
        {
            let mut state = self.state.write().await;
            state.loading = true;
            state.error = None;
        }
        match self.api.list_categories().await {
            Ok(items) => {
                let mut state = self.state.write().await;
                state.loading = false;
                state.items = items;
            }
            Err(err) => {
                let mut state = self.state.write().await;
                state.loading = false;
                state.error = Some(err.to_string());
            }
        }
    }

    /// Create a category and append it to the held list.
    pub async fn create(&self, input: &CreateCategory) -> Result<Category, ClientError> {
        match self.api.create_category(input).await {
            Ok(category) => {
                self.state.write().await.items.push(category.clone());
                Ok(category)
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Rename a category, patching it in place by id.
    pub async fn update(&self, id: DbId, input: &UpdateCategory) -> Result<Category, ClientError> {
        match self.api.update_category(id, input).await {
            Ok(category) => {
                let mut state = self.state.write().await;
                if let Some(existing) = state.items.iter_mut().find(|c| c.id == id) {
                    *existing = category.clone();
                }
                Ok(category)
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// Delete a category and drop it from the held list.
    pub async fn delete(&self, id: DbId) -> Result<(), ClientError> {
        match self.api.delete_category(id).await {
            Ok(()) => {
                self.state.write().await.items.retain(|c| c.id != id);
                Ok(())
            }
            Err(err) => {
                self.state.write().await.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
