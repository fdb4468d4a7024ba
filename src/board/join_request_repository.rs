//! Join request repository for gavel.
//!
//! This module provides CRUD operations for pending join requests plus the
//! approval transition that converts a request into a membership.

use tracing::debug;

use super::join_request::{Approval, JoinRequest, NewJoinRequest};
use super::member::BoardMember;
use super::member_repository::MemberRepository;
use super::types::MemberRole;
use crate::db::DbPool;
use crate::{GavelError, Result};

/// Repository for join request operations.
pub struct JoinRequestRepository<'a> {
    pool: &'a DbPool,
}

impl<'a> JoinRequestRepository<'a> {
    /// Create a new JoinRequestRepository with the given database pool reference.
    pub fn new(pool: &'a DbPool) -> Self {
        Self { pool }
    }

    /// Create a new join request in the database.
    ///
    /// Returns the created request with the assigned ID. A second pending
    /// request for the same (board, user) pair fails on the unique
    /// constraint; callers should check `already_requested` first.
    pub async fn create(&self, new_request: &NewJoinRequest) -> Result<JoinRequest> {
        new_request.validate()?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO join_requests (board_id, user_id, motivation, preferred_role)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(new_request.board_id)
        .bind(new_request.user_id)
        .bind(&new_request.motivation)
        .bind(new_request.preferred_role.as_i64())
        .fetch_one(self.pool)
        .await?;

        self.get_strict(id).await
    }

    /// Get a join request by ID.
    pub async fn get(&self, id: i64) -> Result<Option<JoinRequest>> {
        let result: Option<JoinRequestRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, motivation, preferred_role, created_at
             FROM join_requests WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        result.map(|row| row.into_join_request()).transpose()
    }

    /// Get a join request by ID, failing loudly when absent.
    pub async fn get_strict(&self, id: i64) -> Result<JoinRequest> {
        self.get(id)
            .await?
            .ok_or_else(|| GavelError::NotFound("join request".to_string()))
    }

    /// List all pending join requests.
    pub async fn list(&self) -> Result<Vec<JoinRequest>> {
        let rows: Vec<JoinRequestRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, motivation, preferred_role, created_at
             FROM join_requests ORDER BY created_at ASC, id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_join_request()).collect()
    }

    /// List pending join requests for a board.
    pub async fn list_for_board(&self, board_id: i64) -> Result<Vec<JoinRequest>> {
        let rows: Vec<JoinRequestRow> = sqlx::query_as(
            "SELECT id, board_id, user_id, motivation, preferred_role, created_at
             FROM join_requests WHERE board_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(board_id)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(|row| row.into_join_request()).collect()
    }

    /// Check whether a user already has a pending request for a board.
    pub async fn already_requested(&self, user_id: i64, board_id: i64) -> Result<bool> {
        let exists: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM join_requests WHERE user_id = $1 AND board_id = $2)",
        )
        .bind(user_id)
        .bind(board_id)
        .fetch_one(self.pool)
        .await?;
        Ok(exists.0)
    }

    /// Delete a join request by ID (withdrawal).
    ///
    /// Returns true if a request was deleted, false if not found.
    /// No membership is created.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM join_requests WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Approve a join request, converting it into a membership.
    ///
    /// In one transaction: inserts a membership from the approval
    /// attributes, then deletes the join request matching
    /// (user_id, board_id) and asserts exactly one row was deleted.
    /// When no matching request exists the transaction is rolled back,
    /// no membership is created, and a consistency error is returned.
    ///
    /// Concurrent approvals racing on the same request are serialized by
    /// the database; only one can delete the row, the other fails the
    /// assertion and aborts.
    pub async fn approve(&self, approval: &Approval) -> Result<BoardMember> {
        let mut tx = self.pool.begin().await?;

        let member_id: i64 = sqlx::query_scalar(
            "INSERT INTO board_members (board_id, user_id, role)
             VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(approval.board_id)
        .bind(approval.user_id)
        .bind(approval.role.as_i64())
        .fetch_one(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM join_requests WHERE user_id = $1 AND board_id = $2")
            .bind(approval.user_id)
            .bind(approval.board_id)
            .execute(&mut *tx)
            .await?;

        // The unique constraint rules out more than one match; zero means
        // there was no pending request to consume.
        if deleted.rows_affected() != 1 {
            return Err(GavelError::Consistency(format!(
                "expected exactly one pending join request for user {} on board {}, deleted {}",
                approval.user_id,
                approval.board_id,
                deleted.rows_affected()
            )));
        }

        tx.commit().await?;

        debug!(
            board_id = approval.board_id,
            user_id = approval.user_id,
            "join request approved"
        );
        MemberRepository::new(self.pool).get_strict(member_id).await
    }
}

/// Internal struct for mapping database rows to JoinRequest.
#[derive(sqlx::FromRow)]
pub(crate) struct JoinRequestRow {
    pub(crate) id: i64,
    pub(crate) board_id: i64,
    pub(crate) user_id: i64,
    pub(crate) motivation: String,
    pub(crate) preferred_role: i64,
    pub(crate) created_at: String,
}

impl JoinRequestRow {
    /// Decode the row, rejecting unknown role values.
    pub(crate) fn into_join_request(self) -> Result<JoinRequest> {
        Ok(JoinRequest {
            id: self.id,
            board_id: self.board_id,
            user_id: self.user_id,
            motivation: self.motivation,
            preferred_role: MemberRole::from_i64(self.preferred_role)?,
            created_at: self.created_at,
        })
    }
}
