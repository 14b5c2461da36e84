//! Bookshelf repository: the to-read list

use sqlx::PgPool;
use tracing::info;

use crate::error::ApiResult;
use crate::models::ShelfEntry;

/// Bookshelf repository
#[derive(Clone)]
pub struct BookshelfRepository {
    pool: PgPool,
}

impl BookshelfRepository {
    /// Create a new bookshelf repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's shelf, possibly empty
    pub async fn list_by_user(&self, user_id: i32) -> ApiResult<Vec<ShelfEntry>> {
        let entries = sqlx::query_as::<_, ShelfEntry>(
            r#"
            SELECT id, user_id, isbn
            FROM bookshelf
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Add a book to the shelf
    pub async fn add(&self, user_id: i32, isbn: &str) -> ApiResult<ShelfEntry> {
        info!("Adding isbn {} to bookshelf of user {}", isbn, user_id);

        let entry = sqlx::query_as::<_, ShelfEntry>(
            r#"
            INSERT INTO bookshelf (user_id, isbn)
            VALUES ($1, $2)
            RETURNING id, user_id, isbn
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Remove a book from the shelf; a no-op success when absent
    pub async fn remove(&self, user_id: i32, isbn: &str) -> ApiResult<Option<ShelfEntry>> {
        let removed = sqlx::query_as::<_, ShelfEntry>(
            r#"
            DELETE FROM bookshelf
            WHERE user_id = $1 AND isbn = $2
            RETURNING id, user_id, isbn
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(removed)
    }
}
