//! Board member repository for gavel.
//!
//! This module provides CRUD operations for board memberships in the
//! database. Membership changes have no notification side effects; only
//! board mutations publish events.

use super::member::{BoardMember, MemberUpdate, NewMember};
use super::types::MemberRole;
use crate::db::{DbPool, SQL_NOW};
use crate::{GavelError, Result};

/// Repository for board member CRUD operations.
pub struct MemberRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> MemberRepository<'a> {
    /// Create a new MemberRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new membership in the database.
    ///
    /// Returns the created membership with the assigned ID. A duplicate
    /// (board, user) pair fails on the unique constraint.
    pub async fn create(&self, new_member: &NewMember) -> Result<BoardMember> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO board_members (board_id, user_id, role)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(new_member.board_id)
        .bind(new_member.user_id)
        .bind(new_member.role.as_i64())
        .fetch_one(self.pool)
        .await?;

        self.get_strict(id).await
    }

    /// Get a membership by ID.
    pub async fn get(&self, id: i64) -> Result<Option<BoardMember>> {
        let result: Option<MemberRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, role, created_at, updated_at
             FROM board_members WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        result.map(|row| row.into_member()).transpose()
    }

    /// Get a membership by ID, failing loudly when absent.
    pub async fn get_strict(&self, id: i64) -> Result<BoardMember> {
        self.get(id)
            .await?
            .ok_or_else(|| GavelError::NotFound("board member".to_string()))
    }

    /// List all memberships.
    pub async fn list(&self) -> Result<Vec<BoardMember>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, role, created_at, updated_at
             FROM board_members ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_member()).collect()
    }

    /// List memberships for a board.
    pub async fn list_for_board(&self, board_id: i64) -> Result<Vec<BoardMember>> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, role, created_at, updated_at
             FROM board_members WHERE board_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_member()).collect()
    }

    /// Update a membership by ID.
    ///
    /// Only fields that are set in the update will be modified.
    /// Returns the updated membership, or None if not found.
    pub async fn update(&self, id: i64, update: &MemberUpdate) -> Result<Option<BoardMember>> {
        if update.is_empty() {
            return self.get(id).await;
        }

        let sql = format!(
            "UPDATE board_members SET role = $1, updated_at = {} WHERE id = $2",
            SQL_NOW
        );
        let role = update.role.ok_or_else(|| GavelError::validation(["role"]))?;
        let result = sqlx::query(&sql)
            .bind(role.as_i64())
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get(id).await
    }

    /// Delete a membership by ID.
    ///
    /// Returns true if a membership was deleted, false if not found.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM board_members WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Internal struct for mapping database rows to BoardMember.
#[derive(sqlx::FromRow)]
pub(crate) struct MemberRow {
    pub(crate) id: i64,
    pub(crate) board_id: i64,
    pub(crate) user_id: i64,
    pub(crate) role: i64,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl MemberRow {
    /// Decode the row, rejecting unknown role values.
    pub(crate) fn into_member(self) -> Result<BoardMember> {
        Ok(BoardMember {
            id: self.id,
            board_id: self.board_id,
            user_id: self.user_id,
            role: MemberRole::from_i64(self.role)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}
