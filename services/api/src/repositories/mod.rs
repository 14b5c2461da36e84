//! Repositories for database operations

pub mod bookshelf;
pub mod currently_reading;
pub mod favourites;
pub mod friendship;
pub mod journal;
pub mod reading;
pub mod user;

pub use bookshelf::BookshelfRepository;
pub use currently_reading::CurrentlyReadingRepository;
pub use favourites::FavouritesRepository;
pub use friendship::FriendshipRepository;
pub use journal::JournalRepository;
pub use reading::ReadingTransitionService;
pub use user::UserRepository;
