//! User repository: the credential store

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use sqlx::PgPool;
use tracing::info;

use crate::error::{ApiError, ApiResult, is_unique_violation};
use crate::models::{NewUser, UpdateUser, User, UserProfile, UserSummary};
use crate::validation::{validate_email, validate_username};

/// User repository
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Hash a plaintext password with argon2
    fn hash_password(&self, plaintext: &str) -> ApiResult<String> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        let argon2 = Argon2::default();
        let digest = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!("Failed to hash password: {}", e);
                ApiError::InternalServerError
            })?
            .to_string();
        Ok(digest)
    }

    /// Create a new user from a signup payload
    pub async fn create(&self, new_user: &NewUser) -> ApiResult<UserProfile> {
        info!("Creating new user: {}", new_user.username);

        validate_username(&new_user.username).map_err(ApiError::BadRequest)?;
        validate_email(&new_user.email).map_err(ApiError::BadRequest)?;

        let digest = self.hash_password(&new_user.password)?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            INSERT INTO users (name, username, email, password)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, username, email, avatar, pronouns
            "#,
        )
        .bind(&new_user.name)
        .bind(&new_user.username)
        .bind(&new_user.email)
        .bind(&digest)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Username already exists!".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(profile)
    }

    /// Find the full user row by username
    pub async fn find_by_username(&self, username: &str) -> ApiResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, username, email, password, avatar, pronouns
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Find a public profile by id; 404 when absent
    pub async fn find_profile_by_id(&self, id: i32) -> ApiResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, name, username, email, avatar, pronouns
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Find a public profile by username; 404 when absent
    pub async fn find_profile_by_username(&self, username: &str) -> ApiResult<UserProfile> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, name, username, email, avatar, pronouns
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
    }

    /// Verify a username/password pair and return the full user row.
    ///
    /// Absent usernames surface as 401 "User not found" per the existing
    /// contract; a digest mismatch is 401 "Invalid password".
    pub async fn verify_credentials(&self, username: &str, password: &str) -> ApiResult<User> {
        let user = self
            .find_by_username(username)
            .await?
            .ok_or_else(|| ApiError::InvalidCredentials("User not found".to_string()))?;

        let parsed_hash = PasswordHash::new(&user.password).map_err(|e| {
            tracing::error!("Failed to parse password hash: {}", e);
            ApiError::InternalServerError
        })?;

        let argon2 = Argon2::default();
        if argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_err()
        {
            return Err(ApiError::InvalidCredentials("Invalid password".to_string()));
        }

        Ok(user)
    }

    /// Apply a partial profile update, re-checking the username constraint
    pub async fn update_fields(&self, user_id: i32, changes: &UpdateUser) -> ApiResult<UserProfile> {
        info!("Updating profile fields for user {}", user_id);

        if let Some(username) = &changes.username {
            validate_username(username).map_err(ApiError::BadRequest)?;
        }
        if let Some(email) = &changes.email {
            validate_email(email).map_err(ApiError::BadRequest)?;
        }

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET name = COALESCE($2, name),
                username = COALESCE($3, username),
                email = COALESCE($4, email),
                avatar = COALESCE($5, avatar),
                pronouns = COALESCE($6, pronouns)
            WHERE id = $1
            RETURNING id, name, username, email, avatar, pronouns
            "#,
        )
        .bind(user_id)
        .bind(&changes.name)
        .bind(&changes.username)
        .bind(&changes.email)
        .bind(&changes.avatar)
        .bind(&changes.pronouns)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                ApiError::Conflict("Username already exists!".to_string())
            } else {
                ApiError::Database(e)
            }
        })?;

        Ok(profile)
    }

    /// Hash and replace the stored password digest
    pub async fn update_password(&self, user_id: i32, new_password: &str) -> ApiResult<UserProfile> {
        info!("Rotating password for user {}", user_id);

        let digest = self.hash_password(new_password)?;

        let profile = sqlx::query_as::<_, UserProfile>(
            r#"
            UPDATE users
            SET password = $2
            WHERE id = $1
            RETURNING id, name, username, email, avatar, pronouns
            "#,
        )
        .bind(user_id)
        .bind(&digest)
        .fetch_one(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Delete a user; owned collections and friendships cascade at the store
    pub async fn delete(&self, user_id: i32) -> ApiResult<()> {
        info!("Deleting user {}", user_id);

        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Case-insensitive username substring search
    pub async fn search(&self, query: &str) -> ApiResult<Vec<UserSummary>> {
        let users = sqlx::query_as::<_, UserSummary>(
            r#"
            SELECT id, username, avatar
            FROM users
            WHERE username ILIKE $1
            ORDER BY username ASC
            "#,
        )
        .bind(format!("%{}%", query))
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
