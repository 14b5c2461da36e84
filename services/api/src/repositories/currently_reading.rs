//! Currently-reading repository: a single slot per user

use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::CurrentlyReading;

/// Currently-reading repository
#[derive(Clone)]
pub struct CurrentlyReadingRepository {
    pool: PgPool,
}

impl CurrentlyReadingRepository {
    /// Create a new currently-reading repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the slot; 404 when the user is not reading anything
    pub async fn get(&self, user_id: i32) -> ApiResult<CurrentlyReading> {
        sqlx::query_as::<_, CurrentlyReading>(
            r#"
            SELECT id, user_id, isbn
            FROM currentlyreading
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))
    }

    /// Set the slot, atomically replacing any existing row for the user.
    ///
    /// Also removes the isbn from the user's shelf in the same transaction,
    /// since starting a shelved book takes it off the to-read list.
    pub async fn set(&self, user_id: i32, isbn: &str) -> ApiResult<CurrentlyReading> {
        info!("Setting currently-reading slot of user {} to {}", user_id, isbn);

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bookshelf WHERE user_id = $1 AND isbn = $2")
            .bind(user_id)
            .bind(isbn)
            .execute(&mut *tx)
            .await?;

        let slot = sqlx::query_as::<_, CurrentlyReading>(
            r#"
            INSERT INTO currentlyreading (user_id, isbn)
            VALUES ($1, $2)
            ON CONFLICT (user_id) DO UPDATE SET isbn = EXCLUDED.isbn
            RETURNING id, user_id, isbn
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(slot)
    }

    /// Clear the slot; a no-op success when absent
    pub async fn remove(&self, user_id: i32) -> ApiResult<Option<CurrentlyReading>> {
        let removed = sqlx::query_as::<_, CurrentlyReading>(
            r#"
            DELETE FROM currentlyreading
            WHERE user_id = $1
            RETURNING id, user_id, isbn
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(removed)
    }
}
