//! API service routes
//!
//! Authentication is a per-request username/password pair carried in the
//! body; every mutating endpoint re-verifies it against the credential
//! store and requires the authenticated user to own the targeted resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{ApiError, ApiResult},
    models::{Credentials, JournalUpdate, NewBook, NewUser, UpdateUser, User},
    state::AppState,
    validation::is_numeric_id,
};

/// Profile update request
#[derive(Deserialize)]
pub struct UpdateUserRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "newData")]
    pub new_data: UpdateUser,
}

/// Password rotation request
#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub username: String,
    pub password: String,
    #[serde(rename = "newPassword")]
    pub new_password: String,
}

/// Credentialed book insert for shelf, journal, and favourites
#[derive(Deserialize)]
pub struct BookRequest {
    pub username: String,
    pub password: String,
    pub user_id: i32,
    #[serde(rename = "newBook")]
    pub new_book: NewBook,
}

/// Credentialed reading transition (move, read, finish)
#[derive(Deserialize)]
pub struct TransitionRequest {
    pub username: String,
    pub password: String,
    pub isbn: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review: Option<String>,
}

/// Credentialed journal patch, keyed by isbn
#[derive(Deserialize)]
pub struct JournalPatchRequest {
    pub username: String,
    pub password: String,
    pub isbn: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub review: Option<String>,
    #[serde(default)]
    pub date_read: Option<NaiveDate>,
}

/// Credentialed friend-graph action; `user_id` is the acting user
#[derive(Deserialize)]
pub struct FriendActionRequest {
    pub username: String,
    pub password: String,
    pub user_id: i32,
}

/// Credentialed favourite removal
#[derive(Deserialize)]
pub struct FavouriteDeleteRequest {
    pub username: String,
    pub password: String,
    pub user_id: i32,
    pub isbn: String,
}

/// Credentialed currently-reading update
#[derive(Deserialize)]
pub struct CurrentlyReadingRequest {
    pub username: String,
    pub password: String,
    pub isbn: String,
}

/// Query parameters for DELETE-by-isbn endpoints
#[derive(Deserialize)]
pub struct IsbnQuery {
    pub isbn: String,
}

/// Query parameters for user search
#[derive(Deserialize)]
pub struct SearchQuery {
    pub search_query: String,
}

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/login", post(login))
        .route("/api/signup", post(signup))
        .route("/api/user/:user", get(get_user))
        .route("/api/search/users", get(search_users))
        .route("/api/user/delete", post(delete_user))
        .route("/api/user", patch(patch_user))
        .route("/api/user/password", patch(patch_user_password))
        // The :user segment is a username on GET and a numeric id on the
        // mutating verbs, mirroring the id-or-username lookup split.
        .route(
            "/api/bookshelf/:user",
            get(get_bookshelf).delete(delete_from_bookshelf),
        )
        .route("/api/bookshelf", post(post_bookshelf))
        .route(
            "/api/journal/:user",
            get(get_journal).delete(delete_from_journal).patch(patch_journal),
        )
        .route("/api/journal", post(post_journal))
        .route("/api/bookshelf/:user/move", patch(move_book_to_journal))
        .route("/api/bookshelf/:user/read", post(log_book_as_read))
        .route(
            "/api/currentlyreading/:user_id",
            get(get_currently_reading)
                .put(put_currently_reading)
                .delete(delete_currently_reading),
        )
        .route("/api/currentlyreading/:user_id/finish", patch(finish_book))
        .route("/api/friends/request/:friend_id", post(friend_request))
        .route("/api/friends/accept/:friend_id", patch(accept_friend_request))
        .route("/api/friends/delete/:friend_id", post(delete_friend))
        .route("/api/friends/pending/:user_id", get(get_pending_friends))
        .route("/api/friends/:user_id", get(get_friends))
        .route("/api/:user_id/favourites", get(get_favourites))
        .route("/api/favourites", post(post_favourite))
        .route("/api/favourites/delete", post(delete_favourite))
        .with_state(state)
}

/// Verify credentials and require the caller to own `user_id`
async fn authorize(
    state: &AppState,
    username: &str,
    password: &str,
    user_id: i32,
) -> ApiResult<User> {
    let user = state
        .user_repository
        .verify_credentials(username, password)
        .await?;

    if user.id != user_id {
        return Err(ApiError::InvalidCredentials(
            "Invalid credentials for this user".to_string(),
        ));
    }

    Ok(user)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "reading-tracker-api"
    }))
}

/// User login: verify credentials and return the public profile
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .verify_credentials(&payload.username, &payload.password)
        .await?;

    Ok((
        StatusCode::OK,
        Json(crate::models::UserProfile::from(user)),
    ))
}

/// Create a new user
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> ApiResult<impl IntoResponse> {
    let profile = state.user_repository.create(&payload).await?;
    Ok((StatusCode::CREATED, Json(profile)))
}

/// Look up a user by id (all-digits segment) or username
pub async fn get_user(
    State(state): State<AppState>,
    Path(user): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let profile = if is_numeric_id(&user) {
        let id: i32 = user
            .parse()
            .map_err(|_| ApiError::NotFound("User not found".to_string()))?;
        state.user_repository.find_profile_by_id(id).await?
    } else {
        state.user_repository.find_profile_by_username(&user).await?
    };

    Ok(Json(profile))
}

/// Search users by username substring
pub async fn search_users(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<impl IntoResponse> {
    let users = state.user_repository.search(&query.search_query).await?;
    Ok(Json(users))
}

/// Credential-verified account deletion
pub async fn delete_user(
    State(state): State<AppState>,
    Json(payload): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .verify_credentials(&payload.username, &payload.password)
        .await?;

    state.user_repository.delete(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Credential-verified profile update
pub async fn patch_user(
    State(state): State<AppState>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .verify_credentials(&payload.username, &payload.password)
        .await?;

    let updated = state
        .user_repository
        .update_fields(user.id, &payload.new_data)
        .await?;

    Ok((StatusCode::CREATED, Json(updated)))
}

/// Credential-verified password rotation
pub async fn patch_user_password(
    State(state): State<AppState>,
    Json(payload): Json<UpdatePasswordRequest>,
) -> ApiResult<impl IntoResponse> {
    let user = state
        .user_repository
        .verify_credentials(&payload.username, &payload.password)
        .await?;

    let updated = state
        .user_repository
        .update_password(user.id, &payload.new_password)
        .await?;

    Ok((StatusCode::CREATED, Json(updated)))
}

/// List a user's bookshelf by username
pub async fn get_bookshelf(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .user_repository
        .find_profile_by_username(&username)
        .await?;
    let shelf = state.bookshelf_repository.list_by_user(profile.id).await?;
    Ok(Json(shelf))
}

/// Add a book to the caller's shelf
pub async fn post_bookshelf(
    State(state): State<AppState>,
    Json(payload): Json<BookRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    let entry = state
        .bookshelf_repository
        .add(payload.user_id, &payload.new_book.isbn)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Remove a book from the caller's shelf
pub async fn delete_from_bookshelf(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<IsbnQuery>,
    Json(payload): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    state.bookshelf_repository.remove(user_id, &query.isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a user's journal by username
pub async fn get_journal(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let profile = state
        .user_repository
        .find_profile_by_username(&username)
        .await?;
    let journal = state.journal_repository.list_by_user(profile.id).await?;
    Ok(Json(journal))
}

/// Add a journal entry directly
pub async fn post_journal(
    State(state): State<AppState>,
    Json(payload): Json<BookRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    let entry = state
        .journal_repository
        .add(
            payload.user_id,
            &payload.new_book.isbn,
            payload.new_book.rating,
            payload.new_book.review.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Remove a journal entry
pub async fn delete_from_journal(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Query(query): Query<IsbnQuery>,
    Json(payload): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    state.journal_repository.remove(user_id, &query.isbn).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Patch rating/review/date_read on a journal entry
pub async fn patch_journal(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<JournalPatchRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    let update = JournalUpdate {
        rating: payload.rating,
        review: payload.review,
        date_read: payload.date_read,
    };

    let entry = state
        .journal_repository
        .update_fields(user_id, &payload.isbn, &update)
        .await?;

    Ok(Json(entry))
}

/// Move a book from the shelf to the journal
pub async fn move_book_to_journal(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<TransitionRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    let entry = state
        .reading_transitions
        .move_bookshelf_to_journal(
            user_id,
            &payload.isbn,
            payload.rating,
            payload.review.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Log a book as read, consuming a shelf row when one exists
pub async fn log_book_as_read(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<TransitionRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    let entry = state
        .reading_transitions
        .log_as_read(
            user_id,
            &payload.isbn,
            payload.rating,
            payload.review.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Fetch the currently-reading slot
pub async fn get_currently_reading(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let slot = state.currently_reading_repository.get(user_id).await?;
    Ok(Json(slot))
}

/// Set the currently-reading slot, replacing any existing one
pub async fn put_currently_reading(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<CurrentlyReadingRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    let slot = state
        .currently_reading_repository
        .set(user_id, &payload.isbn)
        .await?;

    Ok((StatusCode::CREATED, Json(slot)))
}

/// Clear the currently-reading slot
pub async fn delete_currently_reading(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<Credentials>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    state.currently_reading_repository.remove(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Finish the currently-reading book, moving it to the journal
pub async fn finish_book(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
    Json(payload): Json<TransitionRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, user_id).await?;

    let entry = state
        .reading_transitions
        .move_currently_reading_to_journal(
            user_id,
            &payload.isbn,
            payload.rating,
            payload.review.as_deref(),
        )
        .await?;

    Ok(Json(entry))
}

/// Send a friend request
pub async fn friend_request(
    State(state): State<AppState>,
    Path(friend_id): Path<i32>,
    Json(payload): Json<FriendActionRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    let target = state.user_repository.find_profile_by_id(friend_id).await?;

    state
        .friendship_repository
        .send_request(payload.user_id, friend_id)
        .await?;

    Ok(Json(json!({
        "msg": format!("Friend request sent to {}!", target.username),
    })))
}

/// Accept a pending friend request
pub async fn accept_friend_request(
    State(state): State<AppState>,
    Path(friend_id): Path<i32>,
    Json(payload): Json<FriendActionRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    let counterpart = state.user_repository.find_profile_by_id(friend_id).await?;

    state
        .friendship_repository
        .accept(payload.user_id, friend_id)
        .await?;

    Ok(Json(json!({
        "msg": format!("You are now friends with {}!", counterpart.username),
    })))
}

/// Remove a friendship or withdraw a request
pub async fn delete_friend(
    State(state): State<AppState>,
    Path(friend_id): Path<i32>,
    Json(payload): Json<FriendActionRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    state
        .friendship_repository
        .remove(payload.user_id, friend_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// List accepted friends
pub async fn get_friends(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let friends = state.friendship_repository.list_friends(user_id).await?;
    Ok(Json(friends))
}

/// List incoming pending friend requests
pub async fn get_pending_friends(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let pending = state.friendship_repository.list_pending(user_id).await?;
    Ok(Json(pending))
}

/// List a user's favourites
pub async fn get_favourites(
    State(state): State<AppState>,
    Path(user_id): Path<i32>,
) -> ApiResult<impl IntoResponse> {
    let favourites = state.favourites_repository.list_by_user(user_id).await?;
    Ok(Json(favourites))
}

/// Add a favourite, subject to the three-book quota
pub async fn post_favourite(
    State(state): State<AppState>,
    Json(payload): Json<BookRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    let entry = state
        .favourites_repository
        .add(payload.user_id, &payload.new_book.isbn)
        .await?;

    Ok((StatusCode::CREATED, Json(entry)))
}

/// Remove a favourite
pub async fn delete_favourite(
    State(state): State<AppState>,
    Json(payload): Json<FavouriteDeleteRequest>,
) -> ApiResult<impl IntoResponse> {
    authorize(&state, &payload.username, &payload.password, payload.user_id).await?;

    state
        .favourites_repository
        .remove(payload.user_id, &payload.isbn)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
