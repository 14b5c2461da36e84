//! Friendship repository: the pending/accepted relation between users
//!
//! A friendship is one row per unordered pair. `user_id` records who sent
//! the request; once accepted the relation is symmetric. The store backs
//! pair-uniqueness with a unique index over (LEAST, GREATEST) of the two
//! ids, so concurrent duplicate requests fail fast at the database.

use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::models::{FriendSummary, Friendship, FriendshipStatus};

/// Friendship repository
#[derive(Clone)]
pub struct FriendshipRepository {
    pool: PgPool,
}

impl FriendshipRepository {
    /// Create a new friendship repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Send a friend request, creating a pending row.
    ///
    /// Any existing row for the pair, in either direction and any status,
    /// conflicts: a request A->B and one B->A are the same relationship.
    pub async fn send_request(&self, requester_id: i32, target_id: i32) -> ApiResult<Friendship> {
        info!("Friend request from {} to {}", requester_id, target_id);

        if requester_id == target_id {
            return Err(ApiError::BadRequest(
                "Cannot send a friend request to yourself".to_string(),
            ));
        }

        let existing: Option<i32> = sqlx::query_scalar(
            r#"
            SELECT id FROM friendships
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(requester_id)
        .bind(target_id)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            return Err(ApiError::Conflict(
                "Friend request already exists.".to_string(),
            ));
        }

        let friendship = sqlx::query_as::<_, Friendship>(
            r#"
            INSERT INTO friendships (user_id, friend_id, status)
            VALUES ($1, $2, 'pending')
            RETURNING id, user_id, friend_id, status, created_at
            "#,
        )
        .bind(requester_id)
        .bind(target_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Lost a race against a concurrent request for the same pair.
            if is_unique_violation(&e) {
                ApiError::Conflict("Friend request already exists.".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(friendship)
    }

    /// Accept a pending request between the two users.
    ///
    /// The pair matches in either direction; only a pending row flips to
    /// accepted.
    pub async fn accept(&self, acting_user_id: i32, counterpart_id: i32) -> ApiResult<Friendship> {
        info!(
            "User {} accepting friend request from {}",
            acting_user_id, counterpart_id
        );

        sqlx::query_as::<_, Friendship>(
            r#"
            UPDATE friendships
            SET status = 'accepted'
            WHERE ((user_id = $1 AND friend_id = $2)
                OR (user_id = $2 AND friend_id = $1))
              AND status = 'pending'
            RETURNING id, user_id, friend_id, status, created_at
            "#,
        )
        .bind(acting_user_id)
        .bind(counterpart_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            ApiError::BadRequest("No pending friend request to accept.".to_string())
        })
    }

    /// Delete the pair row, either direction, any status; no-op when absent
    pub async fn remove(&self, user_id: i32, friend_id: i32) -> ApiResult<()> {
        sqlx::query(
            r#"
            DELETE FROM friendships
            WHERE (user_id = $1 AND friend_id = $2)
               OR (user_id = $2 AND friend_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// List accepted friends, both directions, excluding the user themself
    pub async fn list_friends(&self, user_id: i32) -> ApiResult<Vec<FriendSummary>> {
        let friends = sqlx::query_as::<_, FriendSummary>(
            r#"
            SELECT u.id, u.username, u.avatar, f.status
            FROM friendships f
            JOIN users u ON u.id = f.friend_id
            WHERE f.user_id = $1 AND f.status = $2
            UNION
            SELECT u.id, u.username, u.avatar, f.status
            FROM friendships f
            JOIN users u ON u.id = f.user_id
            WHERE f.friend_id = $1 AND f.status = $2
            ORDER BY username ASC
            "#,
        )
        .bind(user_id)
        .bind(FriendshipStatus::Accepted.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(friends)
    }

    /// List incoming pending requests: rows where the user is the recipient.
    ///
    /// Deliberately directional. A symmetric join here would show a
    /// requester their own outgoing request as pending.
    pub async fn list_pending(&self, user_id: i32) -> ApiResult<Vec<FriendSummary>> {
        let pending = sqlx::query_as::<_, FriendSummary>(
            r#"
            SELECT u.id, u.username, u.avatar, f.status
            FROM friendships f
            JOIN users u ON u.id = f.user_id
            WHERE f.friend_id = $1 AND f.status = $2
            ORDER BY f.created_at DESC
            "#,
        )
        .bind(user_id)
        .bind(FriendshipStatus::Pending.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(pending)
    }
}
