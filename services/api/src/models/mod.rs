//! API service models

pub mod book;
pub mod friendship;
pub mod user;

// Re-export for convenience
pub use book::{
    CurrentlyReading, FavouriteEntry, JournalEntry, JournalUpdate, NewBook, ShelfEntry,
};
pub use friendship::{FriendSummary, Friendship, FriendshipStatus};
pub use user::{Credentials, NewUser, UpdateUser, User, UserProfile, UserSummary};
