//! Repository for the `categories` table.

use chrono::Utc;
use tickmate_core::types::DbId;

use crate::models::category::CategoryRow;
use crate::DbPool;

/// Column list shared by category queries. `todo_count` is aggregated live
/// from the join so a stored counter can never drift.
const COLUMNS: &str = "c.id, c.name, c.created_at, c.updated_at, COUNT(t.id) AS todo_count";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    fn select() -> String {
        format!("SELECT {COLUMNS} FROM categories c LEFT JOIN todos t ON t.category_id = c.id")
    }

    /// List all categories with live todo counts, ordered by name ascending.
    pub async fn list(pool: &DbPool) -> Result<Vec<CategoryRow>, sqlx::Error> {
        let query = format!("{} GROUP BY c.id ORDER BY c.name ASC", Self::select());
        sqlx::query_as::<_, CategoryRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Find a category by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("{} WHERE c.id = ? GROUP BY c.id", Self::select());
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Insert a category, returning the created row. A duplicate name
    /// surfaces as a unique-constraint database error.
    pub async fn create(pool: &DbPool, name: &str) -> Result<CategoryRow, sqlx::Error> {
        let now = Utc::now();
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO categories (name, created_at, updated_at) VALUES (?, ?, ?) RETURNING id",
        )
        .bind(name)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await?;
        Self::fetch_one(pool, id).await
    }

    /// Rename a category, returning the updated row or `None` if absent.
    pub async fn update(
        pool: &DbPool,
        id: DbId,
        name: &str,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let result = sqlx::query("UPDATE categories SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(Utc::now())
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Self::fetch_one(pool, id).await.map(Some)
    }

    /// Delete a category, clearing `category_id` on referencing todos in the
    /// same transaction. The todos themselves are never deleted. Returns
    /// `true` if a row was deleted.
    pub async fn delete(pool: &DbPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let cleared = sqlx::query("UPDATE todos SET category_id = NULL WHERE category_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        if cleared > 0 {
            tracing::debug!(category_id = id, cleared, "Cleared todo references");
        }
        Ok(result.rows_affected() > 0)
    }

    async fn fetch_one(pool: &DbPool, id: DbId) -> Result<CategoryRow, sqlx::Error> {
        let query = format!("{} WHERE c.id = ? GROUP BY c.id", Self::select());
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }
}
