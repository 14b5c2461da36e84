//! Favourites repository: at most three books per user

use sqlx::PgPool;
use tracing::info;

use crate::error::{ALREADY_EXISTS_MSG, ApiError, ApiResult, is_unique_violation};
use crate::models::FavouriteEntry;

/// How many favourites a user may hold
const FAVOURITES_QUOTA: i64 = 3;

/// Favourites repository
#[derive(Clone)]
pub struct FavouritesRepository {
    pool: PgPool,
}

impl FavouritesRepository {
    /// Create a new favourites repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List a user's favourites
    pub async fn list_by_user(&self, user_id: i32) -> ApiResult<Vec<FavouriteEntry>> {
        let entries = sqlx::query_as::<_, FavouriteEntry>(
            r#"
            SELECT id, user_id, isbn
            FROM favourites
            WHERE user_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Add a favourite, enforcing the quota before insert.
    ///
    /// The count-then-insert is a known check-then-act race; concurrent adds
    /// can overshoot the quota. The (user_id, isbn) unique constraint still
    /// rejects duplicates at the store.
    pub async fn add(&self, user_id: i32, isbn: &str) -> ApiResult<FavouriteEntry> {
        info!("Adding favourite isbn {} for user {}", isbn, user_id);

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM favourites WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?;

        if count >= FAVOURITES_QUOTA {
            return Err(ApiError::BadRequest(
                "User can only have 3 favorite books".to_string(),
            ));
        }

        let entry = sqlx::query_as::<_, FavouriteEntry>(
            r#"
            INSERT INTO favourites (user_id, isbn)
            VALUES ($1, $2)
            RETURNING id, user_id, isbn
            "#,
        )
        .bind(user_id)
        .bind(isbn)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict(ALREADY_EXISTS_MSG.to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(entry)
    }

    /// Remove a favourite; a no-op success when absent
    pub async fn remove(&self, user_id: i32, isbn: &str) -> ApiResult<Option<FavouriteEntry>> {
        let removed = sqlx::query_as::<_, FavouriteEntry>(
            r#"
            DELETE FROM favourites
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
