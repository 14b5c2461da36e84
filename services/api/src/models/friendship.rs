//! Friendship relation and its state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Status of a friendship row.
///
/// A pair transitions none -> pending -> accepted; `declined` and `blocked`
/// exist in the schema but have no exposed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendshipStatus {
    Pending,
    Accepted,
    Declined,
    Blocked,
}

impl FriendshipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FriendshipStatus::Pending => "pending",
            FriendshipStatus::Accepted => "accepted",
            FriendshipStatus::Declined => "declined",
            FriendshipStatus::Blocked => "blocked",
        }
    }
}

/// A friendship row; `user_id` is the requester, `friend_id` the recipient
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Friendship {
    pub id: i32,
    pub user_id: i32,
    pub friend_id: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// What friend lists return about the counterpart user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FriendSummary {
    pub id: i32,
    pub username: String,
    pub avatar: String,
    pub status: String,
}
