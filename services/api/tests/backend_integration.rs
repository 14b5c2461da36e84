//! Integration tests for the reading-tracker backend
//!
//! These run against a live PostgreSQL instance named by DATABASE_URL and
//! are skipped when it is not set. Each test starts from a truncated
//! schema, so they are serialized.

use serial_test::serial;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use api::error::ApiError;
use api::models::{NewUser, UserProfile};
use api::repositories::{
    BookshelfRepository, CurrentlyReadingRepository, FavouritesRepository, FriendshipRepository,
    JournalRepository, ReadingTransitionService, UserRepository,
};

async fn setup() -> Option<PgPool> {
    let url = match std::env::var("DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("DATABASE_URL not set, skipping integration test");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to apply migrations");

    sqlx::query("TRUNCATE users RESTART IDENTITY CASCADE")
        .execute(&pool)
        .await
        .expect("failed to truncate tables");

    Some(pool)
}

async fn create_user(pool: &PgPool, name: &str, username: &str, password: &str) -> UserProfile {
    let repo = UserRepository::new(pool.clone());
    repo.create(&NewUser {
        name: name.to_string(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: password.to_string(),
    })
    .await
    .expect("failed to create user")
}

#[tokio::test]
#[serial]
async fn signup_then_login_round_trip() {
    let Some(pool) = setup().await else { return };
    let users = UserRepository::new(pool.clone());

    let profile = create_user(&pool, "Bob Smith", "bob_smith", "Secure#5678").await;
    assert_eq!(profile.username, "bob_smith");

    // Correct password returns the profile; the digest is never the plaintext.
    let user = users
        .verify_credentials("bob_smith", "Secure#5678")
        .await
        .expect("login with correct password failed");
    assert_eq!(user.id, profile.id);

    let stored_digest: String =
        sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
            .bind("bob_smith")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_ne!(stored_digest, "Secure#5678");

    let err = users
        .verify_credentials("bob_smith", "notthepassword")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials(msg) if msg == "Invalid password"));

    let err = users
        .verify_credentials("nobody", "whatever")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials(msg) if msg == "User not found"));
}

#[tokio::test]
#[serial]
async fn password_rotation_replaces_the_digest() {
    let Some(pool) = setup().await else { return };
    let users = UserRepository::new(pool.clone());

    let profile = create_user(&pool, "Bob Smith", "bob_smith", "Old#1234").await;

    users
        .update_password(profile.id, "New#5678")
        .await
        .expect("password rotation failed");

    // The old plaintext no longer verifies; the new one does.
    let err = users
        .verify_credentials("bob_smith", "Old#1234")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidCredentials(msg) if msg == "Invalid password"));

    let user = users
        .verify_credentials("bob_smith", "New#5678")
        .await
        .expect("login with rotated password failed");
    assert_eq!(user.id, profile.id);

    let stored_digest: String =
        sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
            .bind("bob_smith")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_ne!(stored_digest, "Old#1234");
    assert_ne!(stored_digest, "New#5678");
}

#[tokio::test]
#[serial]
async fn duplicate_username_is_conflict() {
    let Some(pool) = setup().await else { return };
    let users = UserRepository::new(pool.clone());

    create_user(&pool, "Bob Smith", "bob_smith", "Secure#5678").await;

    let err = users
        .create(&NewUser {
            name: "Other Bob".to_string(),
            username: "bob_smith".to_string(),
            email: "other@example.com".to_string(),
            password: "Another#1234".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(msg) if msg == "Username already exists!"));
}

#[tokio::test]
#[serial]
async fn friend_request_is_unique_per_pair() {
    let Some(pool) = setup().await else { return };
    let friendships = FriendshipRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    let bob = create_user(&pool, "Bob", "bob_smith", "Pass#1234").await;

    friendships
        .send_request(alice.id, bob.id)
        .await
        .expect("first request failed");

    // Same direction conflicts.
    let err = friendships.send_request(alice.id, bob.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(msg) if msg == "Friend request already exists."));

    // Opposite direction is the same logical relationship.
    let err = friendships.send_request(bob.id, alice.id).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(msg) if msg == "Friend request already exists."));

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM friendships")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[serial]
async fn accepted_friendship_is_symmetric() {
    let Some(pool) = setup().await else { return };
    let friendships = FriendshipRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    let bob = create_user(&pool, "Bob", "bob_smith", "Pass#1234").await;

    friendships.send_request(alice.id, bob.id).await.unwrap();
    friendships.accept(bob.id, alice.id).await.unwrap();

    let alices_friends = friendships.list_friends(alice.id).await.unwrap();
    assert_eq!(alices_friends.len(), 1);
    assert_eq!(alices_friends[0].id, bob.id);
    assert_eq!(alices_friends[0].status, "accepted");

    let bobs_friends = friendships.list_friends(bob.id).await.unwrap();
    assert_eq!(bobs_friends.len(), 1);
    assert_eq!(bobs_friends[0].id, alice.id);
    assert_eq!(bobs_friends[0].status, "accepted");
}

#[tokio::test]
#[serial]
async fn pending_list_is_directional() {
    let Some(pool) = setup().await else { return };
    let friendships = FriendshipRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    let bob = create_user(&pool, "Bob", "bob_smith", "Pass#1234").await;

    friendships.send_request(alice.id, bob.id).await.unwrap();

    // The recipient sees the request; the requester does not see their own.
    let bobs_pending = friendships.list_pending(bob.id).await.unwrap();
    assert_eq!(bobs_pending.len(), 1);
    assert_eq!(bobs_pending[0].id, alice.id);
    assert_eq!(bobs_pending[0].status, "pending");

    let alices_pending = friendships.list_pending(alice.id).await.unwrap();
    assert!(alices_pending.is_empty());
}

#[tokio::test]
#[serial]
async fn accept_without_pending_request_fails() {
    let Some(pool) = setup().await else { return };
    let friendships = FriendshipRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    let bob = create_user(&pool, "Bob", "bob_smith", "Pass#1234").await;

    let err = friendships.accept(bob.id, alice.id).await.unwrap_err();
    assert!(
        matches!(err, ApiError::BadRequest(msg) if msg == "No pending friend request to accept.")
    );

    // Accepting twice also fails the second time.
    friendships.send_request(alice.id, bob.id).await.unwrap();
    friendships.accept(bob.id, alice.id).await.unwrap();
    let err = friendships.accept(bob.id, alice.id).await.unwrap_err();
    assert!(
        matches!(err, ApiError::BadRequest(msg) if msg == "No pending friend request to accept.")
    );
}

#[tokio::test]
#[serial]
async fn favourites_quota_is_enforced() {
    let Some(pool) = setup().await else { return };
    let favourites = FavouritesRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    for isbn in ["9780000000001", "9780000000002", "9780000000003"] {
        favourites.add(alice.id, isbn).await.unwrap();
    }

    let err = favourites.add(alice.id, "9780000000004").await.unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(msg) if msg == "User can only have 3 favorite books"));

    let listed = favourites.list_by_user(alice.id).await.unwrap();
    assert_eq!(listed.len(), 3);
}

#[tokio::test]
#[serial]
async fn duplicate_favourite_is_conflict() {
    let Some(pool) = setup().await else { return };
    let favourites = FavouritesRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    favourites.add(alice.id, "9780000000001").await.unwrap();
    let err = favourites.add(alice.id, "9780000000001").await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(msg) if msg == api::error::ALREADY_EXISTS_MSG));
}

#[tokio::test]
#[serial]
async fn move_from_shelf_consumes_the_shelf_row() {
    let Some(pool) = setup().await else { return };
    let shelf = BookshelfRepository::new(pool.clone());
    let journal = JournalRepository::new(pool.clone());
    let transitions = ReadingTransitionService::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    shelf.add(alice.id, "9780000000001").await.unwrap();

    let entry = transitions
        .move_bookshelf_to_journal(alice.id, "9780000000001", Some(4.5), Some("great"))
        .await
        .unwrap();
    assert_eq!(entry.rating, Some(4.5));
    assert_eq!(entry.review.as_deref(), Some("great"));

    assert!(shelf.list_by_user(alice.id).await.unwrap().is_empty());
    assert_eq!(journal.list_by_user(alice.id).await.unwrap().len(), 1);
}

#[tokio::test]
#[serial]
async fn move_of_absent_isbn_leaves_journal_unchanged() {
    let Some(pool) = setup().await else { return };
    let journal = JournalRepository::new(pool.clone());
    let transitions = ReadingTransitionService::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    let err = transitions
        .move_bookshelf_to_journal(alice.id, "9780000000009", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(msg) if msg == "Book not found"));

    assert!(journal.list_by_user(alice.id).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn log_as_read_handles_both_branches() {
    let Some(pool) = setup().await else { return };
    let shelf = BookshelfRepository::new(pool.clone());
    let journal = JournalRepository::new(pool.clone());
    let transitions = ReadingTransitionService::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    // Shelved book: the shelf row is consumed.
    shelf.add(alice.id, "9780000000001").await.unwrap();
    transitions
        .log_as_read(alice.id, "9780000000001", Some(3.0), None)
        .await
        .unwrap();
    assert!(shelf.list_by_user(alice.id).await.unwrap().is_empty());

    // Never-shelved book: logged directly.
    transitions
        .log_as_read(alice.id, "9780000000002", None, None)
        .await
        .unwrap();

    assert_eq!(journal.list_by_user(alice.id).await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn currently_reading_replaces_rather_than_duplicates() {
    let Some(pool) = setup().await else { return };
    let current = CurrentlyReadingRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    current.set(alice.id, "9780000000001").await.unwrap();
    current.set(alice.id, "9780000000002").await.unwrap();

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM currentlyreading WHERE user_id = $1")
            .bind(alice.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);

    let slot = current.get(alice.id).await.unwrap();
    assert_eq!(slot.isbn, "9780000000002");
}

#[tokio::test]
#[serial]
async fn setting_current_slot_consumes_the_shelf_row() {
    let Some(pool) = setup().await else { return };
    let shelf = BookshelfRepository::new(pool.clone());
    let current = CurrentlyReadingRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    // Starting a shelved book takes it off the to-read list.
    shelf.add(alice.id, "9780000000001").await.unwrap();
    current.set(alice.id, "9780000000001").await.unwrap();
    assert!(shelf.list_by_user(alice.id).await.unwrap().is_empty());

    // Switching to another shelved book consumes that shelf row too and
    // still leaves exactly one slot.
    shelf.add(alice.id, "9780000000002").await.unwrap();
    current.set(alice.id, "9780000000002").await.unwrap();
    assert!(shelf.list_by_user(alice.id).await.unwrap().is_empty());

    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM currentlyreading WHERE user_id = $1")
            .bind(alice.id)
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(count, 1);

    let slot = current.get(alice.id).await.unwrap();
    assert_eq!(slot.isbn, "9780000000002");
}

#[tokio::test]
#[serial]
async fn finishing_a_mismatched_isbn_is_rejected() {
    let Some(pool) = setup().await else { return };
    let current = CurrentlyReadingRepository::new(pool.clone());
    let transitions = ReadingTransitionService::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    current.set(alice.id, "9780000000001").await.unwrap();

    let err = transitions
        .move_currently_reading_to_journal(alice.id, "9780000000002", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(msg) if msg == "Book not found"));

    // The unrelated slot was not cleared.
    let slot = current.get(alice.id).await.unwrap();
    assert_eq!(slot.isbn, "9780000000001");

    // A matching isbn succeeds and clears the slot.
    transitions
        .move_currently_reading_to_journal(alice.id, "9780000000001", Some(5.0), None)
        .await
        .unwrap();
    assert!(current.get(alice.id).await.is_err());
}

#[tokio::test]
#[serial]
async fn rating_outside_half_star_steps_is_rejected() {
    let Some(pool) = setup().await else { return };
    let journal = JournalRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    let err = journal
        .add(alice.id, "9780000000001", Some(3.2), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::BadRequest(_)));

    // The store constraint is the backstop for writes that bypass the
    // application check.
    let res = sqlx::query("INSERT INTO booksjournal (user_id, isbn, rating) VALUES ($1, $2, $3)")
        .bind(alice.id)
        .bind("9780000000001")
        .bind(3.3f32)
        .execute(&pool)
        .await;
    assert!(res.is_err());
}

#[tokio::test]
#[serial]
async fn deleting_a_user_cascades_to_owned_rows() {
    let Some(pool) = setup().await else { return };
    let users = UserRepository::new(pool.clone());
    let shelf = BookshelfRepository::new(pool.clone());
    let favourites = FavouritesRepository::new(pool.clone());
    let friendships = FriendshipRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    let bob = create_user(&pool, "Bob", "bob_smith", "Pass#1234").await;

    shelf.add(alice.id, "9780000000001").await.unwrap();
    favourites.add(alice.id, "9780000000002").await.unwrap();
    friendships.send_request(alice.id, bob.id).await.unwrap();

    users.delete(alice.id).await.unwrap();

    let shelf_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookshelf")
        .fetch_one(&pool)
        .await
        .unwrap();
    let fav_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM favourites")
        .fetch_one(&pool)
        .await
        .unwrap();
    let friendship_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM friendships")
        .fetch_one(&pool)
        .await
        .unwrap();

    assert_eq!(shelf_count, 0);
    assert_eq!(fav_count, 0);
    assert_eq!(friendship_count, 0);
}

#[tokio::test]
#[serial]
async fn journal_lists_most_recent_first() {
    let Some(pool) = setup().await else { return };
    let journal = JournalRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;

    sqlx::query(
        "INSERT INTO booksjournal (user_id, isbn, date_read) VALUES ($1, '9780000000001', '2024-01-01'), ($1, '9780000000002', '2024-06-01')",
    )
    .bind(alice.id)
    .execute(&pool)
    .await
    .unwrap();

    let entries = journal.list_by_user(alice.id).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].isbn, "9780000000002");
    assert_eq!(entries[1].isbn, "9780000000001");
}

#[tokio::test]
#[serial]
async fn profile_update_recheck_of_username_constraint() {
    let Some(pool) = setup().await else { return };
    let users = UserRepository::new(pool.clone());

    let alice = create_user(&pool, "Alice", "alice", "Pass#1234").await;
    create_user(&pool, "Bob", "bob_smith", "Pass#1234").await;

    let err = users
        .update_fields(
            alice.id,
            &api::models::UpdateUser {
                username: Some("bob_smith".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict(msg) if msg == "Username already exists!"));

    // A non-colliding partial update applies only the given fields.
    let updated = users
        .update_fields(
            alice.id,
            &api::models::UpdateUser {
                pronouns: Some("she/her".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.username, "alice");
    assert_eq!(updated.pronouns.as_deref(), Some("she/her"));
}
