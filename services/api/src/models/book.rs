//! Book collection entities: bookshelf, journal, favourites, currently reading

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A book on the to-read shelf
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct ShelfEntry {
    pub id: i32,
    pub user_id: i32,
    pub isbn: String,
}

/// A completed book in the reading journal
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct JournalEntry {
    pub id: i32,
    pub user_id: i32,
    pub isbn: String,
    pub date_read: NaiveDate,
    pub review: Option<String>,
    pub rating: Option<f32>,
}

/// A favourite book, at most three per user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct FavouriteEntry {
    pub id: i32,
    pub user_id: i32,
    pub isbn: String,
}

/// The single currently-reading slot for a user
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CurrentlyReading {
    pub id: i32,
    pub user_id: i32,
    pub isbn: String,
}

/// Incoming book payload for shelf, journal, and favourite inserts
#[derive(Debug, Clone, Deserialize)]
pub struct NewBook {
    pub isbn: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review: Option<String>,
}

/// Partial journal update; fields are independently settable
#[derive(Debug, Clone, Deserialize, Default)]
pub struct JournalUpdate {
    pub rating: Option<f32>,
    pub review: Option<String>,
    pub date_read: Option<NaiveDate>,
}
