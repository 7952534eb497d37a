//! Repository for the `todos` table.

use chrono::Utc;
use tickmate_core::todo::{CategoryFilter, SortBy, SortOrder, StatusFilter, TodoListQuery};
use tickmate_core::types::DbId;

use crate::models::todo::{NewTodo, TodoChanges, TodoRow};
use crate::DbPool;

/// Column list shared by todo queries; the category name is joined in so a
/// single fetch produces the full wire shape.
const COLUMNS: &str = "t.id, t.title, t.description, t.due_date, t.completed, t.category_id, \
                       c.name AS category_name, t.created_at, t.updated_at";

/// Provides CRUD operations for todos.
pub struct TodoRepo;

impl TodoRepo {
    fn select() -> String {
        format!("SELECT {COLUMNS} FROM todos t LEFT JOIN categories c ON c.id = t.category_id")
    }

    /// List todos matching the query's conjunctive filters, in its order.
    pub async fn list(pool: &DbPool, query: &TodoListQuery) -> Result<Vec<TodoRow>, sqlx::Error> {
        let mut sql = Self::select();

        let mut clauses: Vec<&str> = Vec::new();
        match query.status {
            StatusFilter::All => {}
            StatusFilter::Active => clauses.push("t.completed = 0"),
            StatusFilter::Completed => clauses.push("t.completed = 1"),
        }
        let mut category_bind = None;
        match query.category {
            None => {}
            Some(CategoryFilter::Uncategorized) => clauses.push("t.category_id IS NULL"),
            Some(CategoryFilter::Category(id)) => {
                clauses.push("t.category_id = ?");
                category_bind = Some(id);
            }
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }

        let column = match query.sort_by {
            SortBy::CreatedAt => "t.created_at",
            SortBy::DueDate => "t.due_date",
        };
        let direction = match query.sort_order {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        };
        sql.push_str(&format!(" ORDER BY {column} {direction}"));

        let mut q = sqlx::query_as::<_, TodoRow>(&sql);
        if let Some(id) = category_bind {
            q = q.bind(id);
        }
        q.fetch_all(pool).await
    }

    /// Find a todo by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<TodoRow>, sqlx::Error> {
        let query = format!("{} WHERE t.id = ?", Self::select());
        sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a todo with `completed = false`, returning the created row.
    pub async fn create(pool: &DbPool, input: &NewTodo) -> Result<TodoRow, sqlx::Error> {
        let now = Utc::now();
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO todos (title, description, due_date, completed, category_id, created_at, updated_at)
             VALUES (?, ?, ?, 0, ?, ?, ?)
             RETURNING id",
        )
        .bind(&input.title)
        .bind(&input.description)
        .bind(input.due_date)
        .bind(input.category_id)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
        Self::fetch_one(pool, id).await
    }

    /// Replace a todo's fields, returning the updated row or `None` if
    /// absent. Optional fields are overwritten with the given values, so a
    /// `None` here clears the stored value.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        changes: &TodoChanges,
    ) -> Result<Option<TodoRow>, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE todos
             SET title = ?, description = ?, due_date = ?, category_id = ?, completed = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(changes.due_date)
        .bind(changes.category_id)
        .bind(changes.completed)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::fetch_one(pool, id).await.map(Some)
    }

    /// Set the completion flag, touching `updated_at`. Returns the updated
    /// row or `None` if absent.
    pub async fn set_completed(
        pool: &DbPool,
        id: DbId,
        completed: bool,
    ) -> Result<Option<TodoRow>, sqlx::Error> {
        let result = sqlx::query("UPDATE todos SET completed = ?, updated_at = ? WHERE id = ?")
            .bind(completed)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::fetch_one(pool, id).await.map(Some)
    }

    /// Delete a todo by ID. Returns `true` if a row was deleted.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_one(pool: &DbPool, id: DbId) -> Result<TodoRow, sqlx::Error> {
        let query = format!("{} WHERE t.id = ?", Self::select());
        sqlx::query_as::<_, TodoRow>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
