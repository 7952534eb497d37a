//! A scripted in-memory backend for store tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use tickmate_client::api::{ClientError, TodoApi, TodoListing};
use tickmate_core::category::{Category, CategoryInfo, CreateCategory, UpdateCategory};
use tickmate_core::todo::{group_by_category, CreateTodo, Todo, TodoListQuery, UpdateTodo};
use tickmate_core::types::{DbId, Timestamp};

fn at() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
}

/// Build a todo fixture, optionally categorized.
pub fn todo(id: DbId, title: &str, category: Option<(DbId, &str)>) -> Todo {
    Todo {
        id,
        title: title.to_string(),
        description: None,
        due_date: None,
        completed: false,
        category_id: category.map(|(id, _)| id),
        category: category.map(|(id, name)| CategoryInfo {
            id,
            name: name.to_string(),
        }),
        created_at: at(),
        updated_at: at(),
    }
}

fn not_found(message: &str) -> ClientError {
    ClientError::Api {
        code: "NOT_FOUND".to_string(),
        message: message.to_string(),
        details: Vec::new(),
    }
}

fn internal(message: &str) -> ClientError {
    ClientError::Api {
        code: "INTERNAL_ERROR".to_string(),
        message: message.to_string(),
        details: Vec::new(),
    }
}

/// In-memory [`TodoApi`] with failure injection.
pub struct FakeApi {
    todos: Mutex<Vec<Todo>>,
    categories: Mutex<Vec<Category>>,
    next_id: AtomicI64,
    pub fail_list: AtomicBool,
    pub fail_delete: AtomicBool,
    delete_calls: AtomicUsize,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::with_todos(Vec::new())
    }

    pub fn with_todos(todos: Vec<Todo>) -> Self {
        let next = todos.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        Self {
            todos: Mutex::new(todos),
            categories: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(next),
            fail_list: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            delete_calls: AtomicUsize::new(0),
        }
    }

    /// How many times `delete_todo` was called.
    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    /// The backend's current todo list.
    pub fn server_todos(&self) -> Vec<Todo> {
        self.todos.lock().unwrap().clone()
    }

    fn bump_id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl TodoApi for FakeApi {
    async fn list_todos(&self, query: &TodoListQuery) -> Result<TodoListing, ClientError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(internal("list failed"));
        }
        let todos = self.todos.lock().unwrap().clone();
        if query.group_by_category {
            Ok(TodoListing::Grouped(group_by_category(todos)))
        } else {
            Ok(TodoListing::Flat(todos))
        }
    }

    async fn get_todo(&self, id: DbId) -> Result<Todo, ClientError> {
        self.todos
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| not_found("Todo not found"))
    }

    async fn create_todo(&self, input: &CreateTodo) -> Result<Todo, ClientError> {
        let mut created = todo(self.bump_id(), &input.title, None);
        created.description = input.description.clone();
        created.due_date = input.parsed_due_date();
        self.todos.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_todo(&self, id: DbId, input: &UpdateTodo) -> Result<Todo, ClientError> {
        let mut todos = self.todos.lock().unwrap();
        let existing = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Todo not found"))?;
        existing.title = input.title.clone();
        existing.description = input.description.clone();
        existing.due_date = input.parsed_due_date();
        if let Some(completed) = input.completed {
            existing.completed = completed;
        }
        Ok(existing.clone())
    }

    async fn delete_todo(&self, id: DbId) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(internal("delete failed"));
        }
        let mut todos = self.todos.lock().unwrap();
        let before = todos.len();
        todos.retain(|t| t.id != id);
        if todos.len() == before {
            return Err(not_found("Todo not found"));
        }
        Ok(())
    }

    async fn toggle_todo(&self, id: DbId) -> Result<Todo, ClientError> {
        let mut todos = self.todos.lock().unwrap();
        let existing = todos
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| not_found("Todo not found"))?;
        existing.completed = !existing.completed;
        Ok(existing.clone())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        Ok(self.categories.lock().unwrap().clone())
    }

    async fn create_category(&self, input: &CreateCategory) -> Result<Category, ClientError> {
        let category = Category {
            id: self.bump_id(),
            name: input.name.clone(),
            todo_count: 0,
            created_at: at(),
            updated_at: at(),
        };
        self.categories.lock().unwrap().push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: DbId,
        input: &UpdateCategory,
    ) -> Result<Category, ClientError> {
        let mut categories = self.categories.lock().unwrap();
        let existing = categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| not_found("Category not found"))?;
        existing.name = input.name.clone();
        Ok(existing.clone())
    }

    async fn delete_category(&self, id: DbId) -> Result<(), ClientError> {
        let mut categories = self.categories.lock().unwrap();
        let before = categories.len();
        categories.retain(|c| c.id != id);
        if categories.len() == before {
            return Err(not_found("Category not found"));
        }
        Ok(())
    }
}
