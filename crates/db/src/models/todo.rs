//! Todo row model and write payloads.

use sqlx::FromRow;
use tickmate_core::category::CategoryInfo;
use tickmate_core::todo::Todo;
use tickmate_core::types::{DbId, Timestamp};

/// A `todos` row joined with its category name, if any.
#[derive(Debug, Clone, FromRow)]
pub struct TodoRow {
    pub id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub completed: bool,
    pub category_id: Option<DbId>,
    pub category_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        let TodoRow {
            id,
            title,
            description,
            due_date,
            completed,
            category_id,
            category_name,
            created_at,
            updated_at,
        } = row;
        let category = category_id
            .zip(category_name)
            .map(|(id, name)| CategoryInfo { id, name });
        Todo {
            id,
            title,
            description,
            due_date,
            completed,
            category_id,
            category,
            created_at,
            updated_at,
        }
    }
}

/// Write payload for inserting a todo. `completed` always starts false.
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub category_id: Option<DbId>,
}

/// Write payload for the full-replacement todo update.
#[derive(Debug, Clone)]
pub struct TodoChanges {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<Timestamp>,
    pub category_id: Option<DbId>,
    pub completed: bool,
}
