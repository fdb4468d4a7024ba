//! Join request model for gavel.
//!
//! A join request is a pending petition by a user to become a member of a
//! board. It is consumed on approval (replaced by a membership) or deleted
//! on withdrawal; both outcomes are terminal.

use serde::Serialize;

use super::types::MemberRole;
use crate::{GavelError, Result};

/// A pending request to join a board.
#[derive(Debug, Clone, Serialize)]
pub struct JoinRequest {
    /// Unique request ID.
    pub id: i64,
    /// Board the user wants to join.
    pub board_id: i64,
    /// User making the request.
    pub user_id: i64,
    /// Why the user wants to join.
    pub motivation: String,
    /// Role the user would like to hold.
    pub preferred_role: MemberRole,
    /// Request creation timestamp.
    pub created_at: String,
}

/// Data for creating a new join request.
#[derive(Debug, Clone)]
pub struct NewJoinRequest {
    /// Board to join.
    pub board_id: i64,
    /// Requesting user.
    pub user_id: i64,
    /// Why the user wants to join.
    pub motivation: String,
    /// Role the user would like to hold.
    pub preferred_role: MemberRole,
}

impl NewJoinRequest {
    /// Create a new join request.
    pub fn new(
        board_id: i64,
        user_id: i64,
        motivation: impl Into<String>,
        preferred_role: MemberRole,
    ) -> Self {
        Self {
            board_id,
            user_id,
            motivation: motivation.into(),
            preferred_role,
        }
    }

    /// Validate required fields.
    pub fn validate(&self) -> Result<()> {
        if self.motivation.trim().is_empty() {
            return Err(GavelError::validation(["motivation"]));
        }
        Ok(())
    }
}

/// Attributes for approving a join request.
///
/// Identifies the request by (user, board) and carries the role the new
/// membership is granted with, which may differ from the preferred role.
#[derive(Debug, Clone)]
pub struct Approval {
    /// Board the request targets.
    pub board_id: i64,
    /// User whose request is being approved.
    pub user_id: i64,
    /// Role granted to the new member.
    pub role: MemberRole,
}

impl Approval {
    /// Create a new approval.
    pub fn new(board_id: i64, user_id: i64, role: MemberRole) -> Self {
        Self {
            board_id,
            user_id,
            role,
        }
    }
}
