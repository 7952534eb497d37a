//! Category row model.

use sqlx::FromRow;
use tickmate_core::category::Category;
use tickmate_core::types::{DbId, Timestamp};

/// A `categories` row joined with its live todo count.
#[derive(Debug, Clone, FromRow)]
pub struct CategoryRow {
    pub id: DbId,
    pub name: String,
    pub todo_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category {
            id: row.id,
            name: row.name,
            todo_count: row.todo_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
