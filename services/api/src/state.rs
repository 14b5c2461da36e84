//! Application state shared across handlers

use sqlx::PgPool;

use crate::repositories::{
    BookshelfRepository, CurrentlyReadingRepository, FavouritesRepository, FriendshipRepository,
    JournalRepository, ReadingTransitionService, UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub user_repository: UserRepository,
    pub bookshelf_repository: BookshelfRepository,
    pub journal_repository: JournalRepository,
    pub favourites_repository: FavouritesRepository,
    pub currently_reading_repository: CurrentlyReadingRepository,
    pub friendship_repository: FriendshipRepository,
    pub reading_transitions: ReadingTransitionService,
}

impl AppState {
    /// Build the state, handing each repository its own pool handle
    pub fn new(pool: PgPool) -> Self {
        AppState {
            user_repository: UserRepository::new(pool.clone()),
            bookshelf_repository: BookshelfRepository::new(pool.clone()),
            journal_repository: JournalRepository::new(pool.clone()),
            favourites_repository: FavouritesRepository::new(pool.clone()),
            currently_reading_repository: CurrentlyReadingRepository::new(pool.clone()),
            friendship_repository: FriendshipRepository::new(pool.clone()),
            reading_transitions: ReadingTransitionService::new(pool.clone()),
            db_pool: pool,
        }
    }
}
