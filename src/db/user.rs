//! User model and repository for gavel.
//!
//! The User aggregate is owned by the account system; boards only reference
//! users by id. This module carries the minimal surface needed to satisfy
//! foreign keys and the judge lookup.

use serde::Serialize;

use super::DbPool;
use crate::{GavelError, Result};

/// User entity referenced by memberships and join requests.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID.
    pub id: i64,
    /// Login username (unique).
    pub username: String,
    /// Account creation timestamp.
    pub created_at: String,
}

/// Data for creating a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Login username.
    pub username: String,
}

impl NewUser {
    /// Create a new user with the given username.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Repository for user lookups.
pub struct UserRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new UserRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new user in the database.
    pub async fn create(&self, new_user: &NewUser) -> Result<User> {
        if new_user.username.trim().is_empty() {
            return Err(GavelError::validation(["username"]));
        }

        let id: i64 =
            sqlx::query_scalar("INSERT INTO users (username) VALUES ($1) RETURNING id")
                .bind(&new_user.username)
                .fetch_one(self.pool)
                .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| GavelError::NotFound("user".to_string()))
    }

    /// Get a user by ID.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }

    /// Get a user by username.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let result = sqlx::query_as::<_, User>(
            "SELECT id, username, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(result)
    }
}
