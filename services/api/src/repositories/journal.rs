//! Journal repository: the completed-reading log

use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::{JournalEntry, JournalUpdate};
use crate::validation::validate_rating;

/// Journal repository
#[derive(Clone)]
pub struct JournalRepository {
    pool: PgPool,
}

impl JournalRepository {
    /// Create a new journal repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's journal, most recently read first
    pub async fn list_by_user(&self, user_id: i32) -> ApiResult<Vec<JournalEntry>> {
        let entries = sqlx::query_as::<_, JournalEntry>(
            r#"
            SELECT id, user_id, isbn, date_read, review, rating
            FROM booksjournal
            WHERE user_id = $1
            ORDER BY date_read DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Insert a journal entry directly; date_read defaults to today
    pub async fn add(
        &self,
        user_id: i32,
        isbn: &str,
        rating: Option<f32>,
        review: Option<&str>,
    ) -> ApiResult<JournalEntry> {
        info!("Adding isbn {} to journal of user {}", isbn, user_id);

        validate_rating(rating).map_err(ApiError::BadRequest)?;

        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            INSERT INTO booksjournal (user_id, isbn, rating, review)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, isbn, date_read, review, rating
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .bind(rating)
        .bind(review)
        .fetch_one(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Patch rating/review/date_read for one entry, keyed by user and isbn
    pub async fn update_fields(
        &self,
        user_id: i32,
        isbn: &str,
        update: &JournalUpdate,
    ) -> ApiResult<JournalEntry> {
        validate_rating(update.rating).map_err(ApiError::BadRequest)?;

        sqlx::query_as::<_, JournalEntry>(
            r#"
            UPDATE booksjournal
            SET rating = COALESCE($3, rating),
                review = COALESCE($4, review),
                date_read = COALESCE($5, date_read)
            WHERE user_id = $1 AND isbn = $2
            RETURNING id, user_id, isbn, date_read, review, rating
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .bind(update.rating)
        .bind(&update.review)
        .bind(update.date_read)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("Book not found".to_string()))
    }

    /// Remove an entry; a no-op success when absent
    pub async fn remove(&self, user_id: i32, isbn: &str) -> ApiResult<Option<JournalEntry>> {
        let removed = sqlx::query_as::<_, JournalEntry>(
            r#"
            DELETE FROM booksjournal
            WHERE user_id = $1 AND isbn = $2
            RETURNING id, user_id, isbn, date_read, review, rating
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_optional(&self.pool)
        .await?;

        Ok(removed)
    }
}
