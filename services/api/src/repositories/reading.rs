//! Reading-transition service
//!
//! Moves a book's representation between shelves. A book is exactly one of
//! {on bookshelf, currently reading, in journal} per user, so every move is
//! a single transaction: the delete and the insert commit together or not
//! at all.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::models::JournalEntry;
use crate::validation::validate_rating;

/// Reading-transition service
#[derive(Clone)]
pub struct ReadingTransitionService {
    pool: PgPool,
}

impl ReadingTransitionService {
    /// Create a new reading-transition service
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_journal_entry(
        tx: &mut Transaction<'_, Postgres>,
        user_id: i32,
        isbn: &str,
        rating: Option<f32>,
        review: Option<&str>,
    ) -> ApiResult<JournalEntry> {
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
        .fetch_one(&mut **tx)
        .await?;

        Ok(entry)
    }

    /// Move a book from the shelf to the journal.
    ///
    /// The shelf row must exist; if it does not, the transaction rolls back
    /// and no journal row is created.
    pub async fn move_bookshelf_to_journal(
        &self,
        user_id: i32,
        isbn: &str,
        rating: Option<f32>,
        review: Option<&str>,
    ) -> ApiResult<JournalEntry> {
        info!("Moving isbn {} from shelf to journal for user {}", isbn, user_id);

        validate_rating(rating).map_err(ApiError::BadRequest)?;

        let mut tx = self.pool.begin().await?;

        let removed: Option<i32> = sqlx::query_scalar(
            r#"
            DELETE FROM bookshelf
            WHERE user_id = $1 AND isbn = $2
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_optional(&mut *tx)
        .await?;

        if removed.is_none() {
            tx.rollback().await?;
            return Err(ApiError::NotFound("Book not found".to_string()));
        }

        let entry = Self::insert_journal_entry(&mut tx, user_id, isbn, rating, review).await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Log a book as read whether or not it was ever shelved.
    ///
    /// If a shelf row exists it is consumed, otherwise the journal entry is
    /// inserted directly; both branches share one transaction so the book
    /// can never end up in both places.
    pub async fn log_as_read(
        &self,
        user_id: i32,
        isbn: &str,
        rating: Option<f32>,
        review: Option<&str>,
    ) -> ApiResult<JournalEntry> {
        info!("Logging isbn {} as read for user {}", isbn, user_id);

        validate_rating(rating).map_err(ApiError::BadRequest)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM bookshelf WHERE user_id = $1 AND isbn = $2")
            .bind(user_id)
            .bind(isbn)
            .execute(&mut *tx)
            .await?;

        let entry = Self::insert_journal_entry(&mut tx, user_id, isbn, rating, review).await?;

        tx.commit().await?;
        Ok(entry)
    }

    /// Finish the currently-reading book, moving it to the journal.
    ///
    /// The slot's isbn must match the requested one; a mismatch is rejected
    /// rather than silently clearing unrelated reading state.
    pub async fn move_currently_reading_to_journal(
        &self,
        user_id: i32,
        isbn: &str,
        rating: Option<f32>,
        review: Option<&str>,
    ) -> ApiResult<JournalEntry> {
        info!("Finishing isbn {} for user {}", isbn, user_id);

        validate_rating(rating).map_err(ApiError::BadRequest)?;

        let mut tx = self.pool.begin().await?;

        let removed: Option<i32> = sqlx::query_scalar(
            r#"
            DELETE FROM currentlyreading
            WHERE user_id = $1 AND isbn = $2
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_optional(&mut *tx)
        .await?;

        if removed.is_none() {
            tx.rollback().await?;
            return Err(ApiError::NotFound("Book not found".to_string()));
        }

        let entry = Self::insert_journal_entry(&mut tx, user_id, isbn, rating, review).await?;

        tx.commit().await?;
        Ok(entry)
    }
}
